//! Геометрические примитивы в пиксельных координатах вьюпорта.

use serde::{Deserialize, Serialize};

/// Точка на экране (пиксели вьюпорта).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: ScreenPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Линейная интерполяция; `alpha` зажимается в [0, 1], нечисловое значение трактуется как 0.
    pub fn lerp(from: ScreenPoint, to: ScreenPoint, alpha: f64) -> ScreenPoint {
        let clamped = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            0.0
        };

        ScreenPoint {
            x: from.x + (to.x - from.x) * clamped,
            y: from.y + (to.y - from.y) * clamped,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Прямоугольник, выровненный по осям.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectD {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectD {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Вьюпорт с началом в (0, 0).
    pub fn viewport(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn right(self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    pub fn center(self) -> ScreenPoint {
        ScreenPoint {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn min_side(self) -> f64 {
        self.width.min(self.height)
    }

    /// Прямоугольник заданного размера вокруг центра; стороны не меньше 1 px.
    pub fn around(center: ScreenPoint, width: f64, height: f64) -> Self {
        let safe_width = width.max(1.0);
        let safe_height = height.max(1.0);
        Self {
            x: center.x - safe_width / 2.0,
            y: center.y - safe_height / 2.0,
            width: safe_width,
            height: safe_height,
        }
    }

    pub fn clamp_point(self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint {
            x: clamp_axis(point.x, self.x, self.right()),
            y: clamp_axis(point.y, self.y, self.bottom()),
        }
    }

    /// Сдвигает центр фокус-прямоугольника так, чтобы он целиком оставался внутри.
    ///
    /// Полуразмеры не меньше 0.5 px. Если фокус шире самого прямоугольника,
    /// центр прижимается к левой/верхней допустимой границе.
    pub fn clamp_center(self, center: ScreenPoint, focus_width: f64, focus_height: f64) -> ScreenPoint {
        let half_width = (focus_width / 2.0).max(0.5);
        let half_height = (focus_height / 2.0).max(0.5);

        ScreenPoint {
            x: clamp_axis(center.x, self.x + half_width, self.right() - half_width),
            y: clamp_axis(center.y, self.y + half_height, self.bottom() - half_height),
        }
    }
}

// f64::clamp паникует при min > max, поэтому зажимаем вручную.
fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
