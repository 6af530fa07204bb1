//! Схема событий указателя (журнал ввода сессии).

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::geometry::ScreenPoint;

/// Кнопка мыши. Метки из журнала сравниваются без учёта регистра.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Любая другая метка из журнала (X1, X2, ...).
    Other,
}

impl From<String> for MouseButton {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "left" => MouseButton::Left,
            "right" => MouseButton::Right,
            "middle" => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

/// Тип события указателя.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PointerEventKind {
    Move,
    Down,
    Up,
    Wheel,
    /// Смена формы курсора; позиции не несёт.
    #[serde(rename = "cursorShape")]
    CursorShape,
    /// Неизвестный тип из журнала.
    Other,
}

impl From<String> for PointerEventKind {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "move" => PointerEventKind::Move,
            "down" => PointerEventKind::Down,
            "up" => PointerEventKind::Up,
            "wheel" => PointerEventKind::Wheel,
            "cursorshape" => PointerEventKind::CursorShape,
            _ => PointerEventKind::Other,
        }
    }
}

/// Одно наблюдение указателя.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Секунды от начала сессии (монотонные).
    #[serde(rename = "t")]
    pub time: f64,
    #[serde(rename = "type")]
    pub kind: PointerEventKind,
    pub x: f64,
    pub y: f64,
    /// Пустая метка равносильна отсутствующей.
    #[serde(
        rename = "btn",
        default,
        deserialize_with = "deserialize_button",
        skip_serializing_if = "Option::is_none"
    )]
    pub button: Option<MouseButton>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dy: Option<f64>,
}

impl PointerEvent {
    pub fn new(time: f64, kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            time,
            kind,
            x,
            y,
            button: None,
            dx: None,
            dy: None,
        }
    }

    pub fn move_to(time: f64, x: f64, y: f64) -> Self {
        Self::new(time, PointerEventKind::Move, x, y)
    }

    pub fn down(time: f64, x: f64, y: f64) -> Self {
        Self::down_with(time, x, y, MouseButton::Left)
    }

    pub fn down_with(time: f64, x: f64, y: f64, button: MouseButton) -> Self {
        Self {
            button: Some(button),
            ..Self::new(time, PointerEventKind::Down, x, y)
        }
    }

    pub fn up(time: f64, x: f64, y: f64) -> Self {
        Self {
            button: Some(MouseButton::Left),
            ..Self::new(time, PointerEventKind::Up, x, y)
        }
    }

    pub fn wheel(time: f64, x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self {
            dx: Some(dx),
            dy: Some(dy),
            ..Self::new(time, PointerEventKind::Wheel, x, y)
        }
    }

    pub fn position(&self) -> ScreenPoint {
        ScreenPoint::new(self.x, self.y)
    }

    /// Событие, несущее позицию курсора: move/down/up с конечными t, x, y.
    pub fn is_position_event(&self) -> bool {
        matches!(
            self.kind,
            PointerEventKind::Move | PointerEventKind::Down | PointerEventKind::Up
        ) && self.time.is_finite()
            && self.x.is_finite()
            && self.y.is_finite()
    }

    /// Нажатие основной кнопки. Нажатие без метки кнопки считается левым.
    pub fn is_primary_click(&self) -> bool {
        self.kind == PointerEventKind::Down
            && matches!(self.button, None | Some(MouseButton::Left))
    }
}

/// Стабильная сортировка по времени (`f64::total_cmp`): положительные NaN
/// оказываются в конце, отрицательные в начале.
pub fn sort_by_time(events: &[PointerEvent]) -> Vec<PointerEvent> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));
    sorted
}

fn deserialize_button<'de, D>(deserializer: D) -> Result<Option<MouseButton>, D::Error>
where
    D: Deserializer<'de>,
{
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label
        .filter(|label| !label.trim().is_empty())
        .map(MouseButton::from))
}

/// Замкнутый интервал времени (секунды).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Меняет границы местами, если `start > end`.
    pub fn normalize(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }
}
