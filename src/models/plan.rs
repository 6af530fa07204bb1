//! Результат планирования: зум-сегменты, кадры камеры и курсора.

use serde::{Deserialize, Serialize};

use crate::models::geometry::ScreenPoint;

/// Интервал, на котором камера должна держать фокус.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomSegment {
    /// Начало (секунды от начала записи).
    pub start: f64,
    /// Конец (секунды), `end >= start`.
    pub end: f64,
    /// Центр фокуса, уже зажатый внутрь вьюпорта.
    pub center: ScreenPoint,
    /// Масштаб в пределах [minScale, maxScale].
    pub scale: f64,
    /// Сколько исходных событий породили сегмент.
    pub trigger_count: u32,
}

impl ZoomSegment {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Замкнутый интервал `[start, end]`.
    pub fn is_active_at(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Верхняя граница числа кадров в одном плане (около 9 часов при 30 fps).
pub const MAX_PLAN_FRAMES: usize = 1_000_000;

const MIN_GRID_DURATION_SECONDS: f64 = 0.1;

/// Сетка выходных кадров `0..=frame_count`, общая для камеры и курсора.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGrid {
    pub fps: u32,
    pub duration_seconds: f64,
    pub frame_count: usize,
}

impl FrameGrid {
    /// fps не меньше 1, длительность не меньше 0.1 с.
    /// Слишком длинная сетка обрезается до [`MAX_PLAN_FRAMES`].
    pub fn new(duration_seconds: f64, fps: u32) -> Self {
        let fps = fps.max(1);
        let duration_seconds = duration_seconds.max(MIN_GRID_DURATION_SECONDS);
        let raw_count = (duration_seconds * fps as f64).ceil();

        let frame_count = if raw_count.is_finite() && raw_count < MAX_PLAN_FRAMES as f64 {
            (raw_count as usize).max(1)
        } else {
            log::warn!(
                "frame grid for {duration_seconds}s at {fps} fps exceeds {MAX_PLAN_FRAMES} frames, truncating"
            );
            MAX_PLAN_FRAMES
        };

        Self {
            fps,
            duration_seconds,
            frame_count,
        }
    }

    pub fn dt(&self) -> f64 {
        1.0 / self.fps as f64
    }

    /// Время кадра, зажатое по длительности.
    pub fn time_at(&self, frame: usize) -> f64 {
        (frame as f64 * self.dt()).min(self.duration_seconds)
    }

    pub fn len(&self) -> usize {
        self.frame_count + 1
    }
}

/// Состояние виртуальной камеры в одном выходном кадре.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraTransform {
    pub time: f64,
    pub center: ScreenPoint,
    /// Не меньше 1.0.
    pub scale: f64,
    /// Зарезервировано, всегда 0.
    pub rotation: f64,
}

/// Состояние курсора в одном выходном кадре.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorSample {
    pub time: f64,
    /// Может выходить за границы вьюпорта; рендерер зажимает сам.
    pub position: ScreenPoint,
    pub hidden: bool,
}

/// Итоговый план для рендерера.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CinematicPlan {
    pub zoom_segments: Vec<ZoomSegment>,
    pub camera_frames: Vec<CameraTransform>,
    pub cursor_frames: Vec<CursorSample>,
    pub duration_seconds: f64,
    pub fps: u32,
}

/// Кадр превью: камера и курсор, сведённые по индексу кадра.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewFrame {
    pub frame_index: usize,
    pub time: f64,
    pub camera: CameraTransform,
    pub cursor: CursorSample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRenderPlan {
    pub frames: Vec<PreviewFrame>,
    pub zoom_segments: Vec<ZoomSegment>,
    pub duration_seconds: f64,
    pub fps: u32,
}
