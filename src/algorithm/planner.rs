use crate::algorithm::auto_zoom::build_auto_zoom_segments;
use crate::algorithm::camera_engine::solve_camera_transforms;
use crate::algorithm::cursor_smoothing::{build_cursor_samples, smooth_cursor_events};
use crate::models::events::{sort_by_time, PointerEvent, TimeRange};
use crate::models::geometry::RectD;
use crate::models::plan::{
    CameraTransform, CinematicPlan, CursorSample, PreviewFrame, PreviewRenderPlan,
};
use crate::models::settings::SessionSettings;

const MIN_DURATION_SECONDS: f64 = 0.1;
const TRAILING_PADDING_SECONDS: f64 = 0.25;

/// Runs the whole pipeline: smoothing, zoom detection, camera solve and
/// cursor resampling.
///
/// Zoom segments are detected on the raw events; the smoothed path only
/// feeds the cursor frames.
pub fn build_cinematic_plan(
    events: &[PointerEvent],
    settings: &SessionSettings,
    duration_seconds: Option<f64>,
    bypass_ranges: &[TimeRange],
) -> CinematicPlan {
    let ordered = sort_by_time(events);
    let duration = resolve_duration(&ordered, duration_seconds);
    let video = settings.video;

    let dropped = ordered
        .iter()
        .filter(|event| !event.time.is_finite() || !event.x.is_finite() || !event.y.is_finite())
        .count();
    if dropped > 0 {
        log::warn!("build_cinematic_plan: ignoring {dropped} events with non-finite fields");
    }
    if video.width <= 1 || video.height <= 1 {
        log::warn!(
            "build_cinematic_plan: degenerate viewport {}x{}, zoom disabled",
            video.width,
            video.height
        );
    }

    let viewport = RectD::viewport(video.width as f64, video.height as f64);
    let smoothed = smooth_cursor_events(&ordered, &settings.cursor, bypass_ranges);
    let zoom_segments =
        build_auto_zoom_segments(&ordered, video.width, video.height, &settings.camera);
    let camera_frames = solve_camera_transforms(
        duration,
        video.fps,
        viewport,
        &zoom_segments,
        settings.camera.preset,
    );
    let cursor_frames = build_cursor_samples(&smoothed, duration, video.fps, &settings.cursor);

    log::debug!(
        "build_cinematic_plan: events={} duration={:.3}s segments={} camera_frames={} cursor_frames={}",
        ordered.len(),
        duration,
        zoom_segments.len(),
        camera_frames.len(),
        cursor_frames.len()
    );

    CinematicPlan {
        zoom_segments,
        camera_frames,
        cursor_frames,
        duration_seconds: duration,
        fps: video.fps.max(1),
    }
}

/// Plans the session and pairs camera and cursor state per output frame.
pub fn build_preview(
    events: &[PointerEvent],
    settings: &SessionSettings,
    duration_seconds: Option<f64>,
    bypass_ranges: &[TimeRange],
) -> PreviewRenderPlan {
    let plan = build_cinematic_plan(events, settings, duration_seconds, bypass_ranges);
    let viewport = RectD::viewport(settings.video.width as f64, settings.video.height as f64);
    let frames = zip_preview_frames(&plan.camera_frames, &plan.cursor_frames, viewport);

    PreviewRenderPlan {
        frames,
        zoom_segments: plan.zoom_segments,
        duration_seconds: plan.duration_seconds,
        fps: plan.fps,
    }
}

/// Explicit positive duration wins; otherwise the last event plus padding.
pub fn resolve_duration(events: &[PointerEvent], duration_seconds: Option<f64>) -> f64 {
    if let Some(explicit) = duration_seconds.filter(|value| value.is_finite() && *value > 0.0) {
        return explicit;
    }

    events
        .iter()
        .map(|event| event.time)
        .filter(|time| time.is_finite())
        .reduce(f64::max)
        .map_or(MIN_DURATION_SECONDS, |last| {
            (last + TRAILING_PADDING_SECONDS).max(MIN_DURATION_SECONDS)
        })
}

fn zip_preview_frames(
    camera_frames: &[CameraTransform],
    cursor_frames: &[CursorSample],
    viewport: RectD,
) -> Vec<PreviewFrame> {
    let fallback = cursor_frames.last().copied().unwrap_or(CursorSample {
        time: 0.0,
        position: viewport.center(),
        hidden: false,
    });

    camera_frames
        .iter()
        .enumerate()
        .map(|(frame_index, camera)| {
            let cursor = match cursor_frames.get(frame_index) {
                Some(sample) => *sample,
                None => CursorSample {
                    time: camera.time,
                    ..fallback
                },
            };
            PreviewFrame {
                frame_index,
                time: camera.time,
                camera: *camera,
                cursor,
            }
        })
        .collect()
}
