pub mod algorithm;
pub mod models;

pub use algorithm::planner::{build_cinematic_plan, build_preview};
pub use models::events::{MouseButton, PointerEvent, PointerEventKind, TimeRange};
pub use models::plan::{CinematicPlan, PreviewRenderPlan};
pub use models::settings::{SessionSettings, SettingsError};
