pub mod auto_zoom;
pub mod camera_engine;
pub mod cursor_smoothing;
pub mod one_euro;
pub mod planner;
