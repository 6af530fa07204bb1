use crate::models::geometry::{RectD, ScreenPoint};
use crate::models::plan::{CameraTransform, FrameGrid, ZoomSegment};
use crate::models::settings::{MotionPreset, SpringSettings};

const HOME_SCALE: f64 = 1.0;

/// Damped spring for a single camera axis.
#[derive(Debug, Clone, Copy)]
pub struct Spring {
    pub position: f64,
    pub velocity: f64,
    pub tension: f64,
    pub friction: f64,
    pub mass: f64,
}

impl Spring {
    pub fn new(position: f64, settings: SpringSettings) -> Self {
        Self {
            position,
            velocity: 0.0,
            tension: settings.tension.max(0.0001),
            friction: settings.friction.max(0.0),
            mass: settings.mass.max(0.0001),
        }
    }

    /// Semi-implicit Euler step: velocity first, then position.
    pub fn tick(&mut self, target: f64, dt: f64) -> f64 {
        let acceleration =
            ((target - self.position) * self.tension - self.velocity * self.friction) / self.mass;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
        self.position
    }
}

#[derive(Debug, Clone, Copy)]
struct CameraSprings {
    x: Spring,
    y: Spring,
    scale: Spring,
}

impl CameraSprings {
    fn at_rest(center: ScreenPoint, settings: SpringSettings) -> Self {
        Self {
            x: Spring::new(center.x, settings),
            y: Spring::new(center.y, settings),
            scale: Spring::new(HOME_SCALE, settings),
        }
    }

    fn tick(&mut self, target: ScreenPoint, target_scale: f64, dt: f64) -> (ScreenPoint, f64) {
        let x = self.x.tick(target.x, dt);
        let y = self.y.tick(target.y, dt);
        let scale = self.scale.tick(target_scale, dt);
        (ScreenPoint::new(x, y), scale)
    }
}

/// Integrates the camera over the frame grid `0..=ceil(duration * fps)`.
///
/// Each frame chases the most recently started active segment, or the
/// viewport center at 1x when nothing is active.
pub fn solve_camera_transforms(
    duration_seconds: f64,
    fps: u32,
    viewport: RectD,
    segments: &[ZoomSegment],
    preset: MotionPreset,
) -> Vec<CameraTransform> {
    let grid = FrameGrid::new(duration_seconds, fps);
    let dt = grid.dt();

    let mut ordered = segments.to_vec();
    ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

    let home = viewport.center();
    let mut springs = CameraSprings::at_rest(home, SpringSettings::for_preset(preset));
    let mut active_lower_bound = 0usize;
    let mut frames = Vec::with_capacity(grid.len());

    for frame in 0..=grid.frame_count {
        let time = grid.time_at(frame);

        while active_lower_bound < ordered.len() && ordered[active_lower_bound].end < time {
            active_lower_bound += 1;
        }

        let (target, target_scale) = match find_latest_active(&ordered, active_lower_bound, time) {
            Some(segment) => (segment.center, segment.scale),
            None => (home, HOME_SCALE),
        };

        let (center, scale) = springs.tick(target, target_scale, dt);
        frames.push(CameraTransform {
            time,
            center,
            scale: scale.max(HOME_SCALE),
            rotation: 0.0,
        });
    }

    log::debug!(
        "solve_camera_transforms: frames={} segments={} preset={:?}",
        frames.len(),
        ordered.len(),
        preset
    );

    frames
}

fn find_latest_active(
    segments: &[ZoomSegment],
    lower_bound: usize,
    time: f64,
) -> Option<&ZoomSegment> {
    let mut latest = None;
    for segment in segments.iter().skip(lower_bound) {
        if segment.start > time {
            break;
        }
        if segment.is_active_at(time) {
            latest = Some(segment);
        }
    }
    latest
}
