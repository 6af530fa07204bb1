use crate::algorithm::one_euro::OneEuroFilter;
use crate::models::events::{sort_by_time, PointerEvent, TimeRange};
use crate::models::geometry::ScreenPoint;
use crate::models::plan::{CursorSample, FrameGrid};
use crate::models::settings::CursorPolishSettings;

const MOVEMENT_EPSILON_PX: f64 = 0.01;
const MIN_SEGMENT_SECONDS: f64 = 0.0001;

/// Applies shake removal and adaptive smoothing to the cursor path.
///
/// Output is time-ordered and has one entry per input event. Events that do
/// not carry a usable position are passed through untouched; position events
/// keep their metadata and only get new coordinates.
pub fn smooth_cursor_events(
    events: &[PointerEvent],
    settings: &CursorPolishSettings,
    bypass_ranges: &[TimeRange],
) -> Vec<PointerEvent> {
    let ordered = sort_by_time(events);
    if ordered.is_empty() || (!settings.smooth_enabled && !settings.remove_shakes) {
        return ordered;
    }

    let bypass: Vec<TimeRange> = bypass_ranges.iter().map(|range| range.normalize()).collect();
    let mut filter_x = new_axis_filter(settings);
    let mut filter_y = new_axis_filter(settings);

    // (raw input, emitted output) of the previous position event.
    let mut previous: Option<(ScreenPoint, ScreenPoint)> = None;
    let mut output = Vec::with_capacity(ordered.len());
    let mut bypassed = 0usize;

    for event in ordered {
        if !event.is_position_event() {
            output.push(event);
            continue;
        }

        let raw = event.position();
        let skip_smoothing = is_bypassed(event.time, &bypass);
        if skip_smoothing {
            bypassed += 1;
        }

        let mut smooth = raw;
        if settings.smooth_enabled && !skip_smoothing {
            smooth = ScreenPoint::new(
                filter_x.filter(raw.x, event.time),
                filter_y.filter(raw.y, event.time),
            );
        } else {
            filter_x.reset(raw.x, event.time);
            filter_y.reset(raw.y, event.time);
        }

        if settings.remove_shakes {
            if let Some((prior_input, prior_output)) = previous {
                if prior_input.distance_to(raw) <= settings.shake_threshold_pixels {
                    smooth = prior_output;
                }
            }
        }

        previous = Some((raw, smooth));
        output.push(PointerEvent {
            x: smooth.x,
            y: smooth.y,
            ..event
        });
    }

    log::debug!(
        "smooth_cursor_events: events={} bypassed={bypassed} smooth={} remove_shakes={}",
        output.len(),
        settings.smooth_enabled,
        settings.remove_shakes
    );

    output
}

/// Resamples the cursor path onto the output frame grid.
///
/// Emits frames `0..=ceil(duration * fps)`; the last frame time is clamped to
/// the duration. Returns nothing when no event carries a position.
pub fn build_cursor_samples(
    events: &[PointerEvent],
    duration_seconds: f64,
    fps: u32,
    settings: &CursorPolishSettings,
) -> Vec<CursorSample> {
    let moves = collect_position_events(events);
    let Some(first) = moves.first() else {
        return Vec::new();
    };

    let grid = FrameGrid::new(duration_seconds, fps);
    let mut samples: Vec<CursorSample> = Vec::with_capacity(grid.len());
    let mut previous_movement = first.time;
    let mut segment_index = 0usize;

    for frame in 0..=grid.frame_count {
        let time = grid.time_at(frame);
        let position = sample_at_time(&moves, time, &mut segment_index);

        if let Some(prior) = samples.last() {
            if prior.position.distance_to(position) > MOVEMENT_EPSILON_PX {
                previous_movement = time;
            }
        }

        samples.push(CursorSample {
            time,
            position,
            hidden: settings.hide_idle && time - previous_movement >= settings.idle_seconds,
        });
    }

    samples
}

fn new_axis_filter(settings: &CursorPolishSettings) -> OneEuroFilter {
    OneEuroFilter::new(
        settings.one_euro_min_cutoff,
        settings.one_euro_beta,
        settings.one_euro_derivative_cutoff,
    )
}

fn is_bypassed(time: f64, ranges: &[TimeRange]) -> bool {
    ranges.iter().any(|range| range.contains(time))
}

fn collect_position_events(events: &[PointerEvent]) -> Vec<PointerEvent> {
    let mut moves = events
        .iter()
        .filter(|event| event.is_position_event())
        .copied()
        .collect::<Vec<_>>();

    moves.sort_by(|a, b| a.time.total_cmp(&b.time));
    moves
}

/// Linear interpolation between the bracketing events; flat outside the path.
/// `segment_index` only moves forward, so callers must query increasing times.
fn sample_at_time(moves: &[PointerEvent], time: f64, segment_index: &mut usize) -> ScreenPoint {
    let first = moves[0];
    if time <= first.time {
        return first.position();
    }

    let last = moves[moves.len() - 1];
    if time > last.time {
        return last.position();
    }

    while *segment_index + 1 < moves.len() && moves[*segment_index + 1].time < time {
        *segment_index += 1;
    }
    let left = moves[*segment_index];
    let right = moves[(*segment_index + 1).min(moves.len() - 1)];

    let span = (right.time - left.time).max(MIN_SEGMENT_SECONDS);
    ScreenPoint::lerp(left.position(), right.position(), (time - left.time) / span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::PointerEventKind;
    use crate::models::plan::MAX_PLAN_FRAMES;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.0001
    }

    fn total_travel(events: &[PointerEvent]) -> f64 {
        events
            .windows(2)
            .map(|pair| pair[0].position().distance_to(pair[1].position()))
            .sum()
    }

    #[test]
    fn remove_shakes_reduces_micro_jitter_travel() {
        let settings = CursorPolishSettings {
            smooth_enabled: true,
            remove_shakes: true,
            shake_threshold_pixels: 2.5,
            ..CursorPolishSettings::default()
        };
        let events = vec![
            PointerEvent::move_to(0.00, 100.0, 100.0),
            PointerEvent::move_to(0.02, 101.0, 99.4),
            PointerEvent::move_to(0.04, 99.6, 100.7),
            PointerEvent::move_to(0.06, 100.8, 99.8),
            PointerEvent::move_to(0.08, 101.2, 100.1),
            PointerEvent::move_to(0.10, 135.0, 120.0),
        ];

        let smoothed = smooth_cursor_events(&events, &settings, &[]);

        assert_eq!(smoothed.len(), events.len());
        assert!(total_travel(&smoothed) < total_travel(&events));
        let last = smoothed.last().expect("last smoothed event");
        assert!(last.x >= 100.0 && last.x <= 135.0, "last x = {}", last.x);
    }

    #[test]
    fn resting_cursor_is_returned_verbatim_with_shake_removal() {
        let settings = CursorPolishSettings::default();
        let events: Vec<PointerEvent> = (0..20)
            .map(|step| PointerEvent::move_to(step as f64 * 0.05, 640.25, 360.75))
            .collect();

        let smoothed = smooth_cursor_events(&events, &settings, &[]);
        assert_eq!(smoothed, events);
    }

    #[test]
    fn disabled_polish_only_sorts() {
        let settings = CursorPolishSettings {
            smooth_enabled: false,
            remove_shakes: false,
            ..CursorPolishSettings::default()
        };
        let events = vec![
            PointerEvent::move_to(0.5, 10.0, 10.0),
            PointerEvent::move_to(0.1, 50.0, 50.0),
        ];

        let smoothed = smooth_cursor_events(&events, &settings, &[]);
        assert_eq!(smoothed[0], events[1]);
        assert_eq!(smoothed[1], events[0]);
    }

    #[test]
    fn non_position_events_pass_through_unchanged() {
        let settings = CursorPolishSettings::default();
        let wheel = PointerEvent::wheel(0.05, 999.0, 999.0, 0.0, -120.0);
        let broken = PointerEvent::move_to(0.06, f64::NAN, 5.0);
        let events = vec![
            PointerEvent::move_to(0.0, 0.0, 0.0),
            wheel,
            broken,
            PointerEvent::move_to(0.1, 100.0, 0.0),
        ];

        let smoothed = smooth_cursor_events(&events, &settings, &[]);
        assert_eq!(smoothed.len(), 4);
        assert_eq!(smoothed[1], wheel);
        assert_eq!(smoothed[2].kind, PointerEventKind::Move);
        assert!(smoothed[2].x.is_nan());
    }

    #[test]
    fn smoothing_keeps_click_metadata() {
        let settings = CursorPolishSettings::default();
        let events = vec![
            PointerEvent::move_to(0.0, 0.0, 0.0),
            PointerEvent::down(0.1, 200.0, 100.0),
        ];

        let smoothed = smooth_cursor_events(&events, &settings, &[]);
        assert_eq!(smoothed[1].kind, PointerEventKind::Down);
        assert_eq!(smoothed[1].button, events[1].button);
        assert!(smoothed[1].x < 200.0);
    }

    #[test]
    fn bypass_range_emits_raw_positions_and_reseeds_filter() {
        let settings = CursorPolishSettings {
            remove_shakes: false,
            ..CursorPolishSettings::default()
        };
        let events = vec![
            PointerEvent::move_to(0.0, 0.0, 0.0),
            PointerEvent::move_to(0.1, 300.0, 0.0),
            PointerEvent::move_to(0.2, 600.0, 0.0),
            PointerEvent::move_to(0.3, 600.0, 0.0),
        ];

        // Reversed bounds are normalized.
        let bypass = [TimeRange::new(0.2, 0.1)];
        let smoothed = smooth_cursor_events(&events, &settings, &bypass);

        assert_eq!(smoothed[1].x, 300.0);
        assert_eq!(smoothed[2].x, 600.0);
        // Filter resumes from the bypassed raw sample instead of lagging behind.
        assert!(approx_eq(smoothed[3].x, 600.0));
    }

    #[test]
    fn smoothing_is_deterministic() {
        let settings = CursorPolishSettings::default();
        let events: Vec<PointerEvent> = (0..200)
            .map(|step| {
                let t = step as f64 / 120.0;
                PointerEvent::move_to(t, 400.0 + (t * 7.0).sin() * 90.0, 300.0 + t * 40.0)
            })
            .collect();

        let first = smooth_cursor_events(&events, &settings, &[]);
        let second = smooth_cursor_events(&events, &settings, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn samples_cover_full_frame_grid() {
        let settings = CursorPolishSettings::default();
        let events = vec![
            PointerEvent::move_to(0.0, 0.0, 0.0),
            PointerEvent::move_to(1.0, 100.0, 50.0),
        ];

        let samples = build_cursor_samples(&events, 1.0, 30, &settings);
        assert_eq!(samples.len(), 31);
        assert!(approx_eq(samples[15].position.x, 50.0));
        assert!(approx_eq(samples[15].position.y, 25.0));
        assert!(approx_eq(samples[30].time, 1.0));
    }

    #[test]
    fn sampling_is_deterministic() {
        let settings = CursorPolishSettings::default();
        let events: Vec<PointerEvent> = (0..90)
            .map(|step| {
                let t = step as f64 / 30.0;
                PointerEvent::move_to(t, 640.0 + (t * 5.0).cos() * 120.0, 360.0 + t * 25.0)
            })
            .collect();
        let smoothed = smooth_cursor_events(&events, &settings, &[]);

        let first = build_cursor_samples(&smoothed, 3.5, 60, &settings);
        let second = build_cursor_samples(&smoothed, 3.5, 60, &settings);
        assert_eq!(first, second);
    }

    #[test]
    fn huge_duration_is_truncated_to_frame_cap() {
        let settings = CursorPolishSettings::default();
        let events = vec![PointerEvent::move_to(0.0, 1.0, 1.0)];

        let samples = build_cursor_samples(&events, f64::MAX, 30, &settings);
        assert_eq!(samples.len(), MAX_PLAN_FRAMES + 1);
    }

    #[test]
    fn last_sample_time_is_clamped_to_duration() {
        let settings = CursorPolishSettings::default();
        let events = vec![PointerEvent::move_to(0.0, 10.0, 10.0)];

        let samples = build_cursor_samples(&events, 1.01, 10, &settings);
        assert_eq!(samples.len(), 12);
        let last = samples.last().expect("last sample");
        assert!(approx_eq(last.time, 1.01));
    }

    #[test]
    fn samples_extrapolate_flat_outside_path() {
        let settings = CursorPolishSettings {
            hide_idle: false,
            ..CursorPolishSettings::default()
        };
        let events = vec![
            PointerEvent::move_to(0.5, 10.0, 20.0),
            PointerEvent::move_to(1.0, 30.0, 40.0),
        ];

        let samples = build_cursor_samples(&events, 2.0, 10, &settings);
        assert_eq!(samples[0].position, ScreenPoint::new(10.0, 20.0));
        assert_eq!(samples[20].position, ScreenPoint::new(30.0, 40.0));
        assert!(samples.iter().all(|sample| !sample.hidden));
    }

    #[test]
    fn idle_cursor_is_hidden_after_threshold() {
        let settings = CursorPolishSettings {
            hide_idle: true,
            idle_seconds: 1.0,
            ..CursorPolishSettings::default()
        };
        let events = vec![
            PointerEvent::move_to(0.0, 0.0, 0.0),
            PointerEvent::move_to(0.5, 100.0, 0.0),
        ];

        let samples = build_cursor_samples(&events, 3.0, 10, &settings);
        let visible_until = samples
            .iter()
            .filter(|sample| !sample.hidden)
            .map(|sample| sample.time)
            .fold(0.0, f64::max);

        assert!(visible_until >= 1.4 && visible_until < 1.5 + 1e-9);
        assert!(samples.last().is_some_and(|sample| sample.hidden));
    }

    #[test]
    fn samples_ignore_wheel_and_non_finite_events() {
        let settings = CursorPolishSettings::default();
        assert!(build_cursor_samples(&[], 1.0, 30, &settings).is_empty());
        assert!(build_cursor_samples(
            &[PointerEvent::wheel(0.1, 1.0, 1.0, 0.0, 1.0)],
            1.0,
            30,
            &settings
        )
        .is_empty());

        let events = vec![
            PointerEvent::move_to(0.0, 0.0, 0.0),
            PointerEvent::move_to(0.5, f64::INFINITY, 0.0),
            PointerEvent::move_to(1.0, 10.0, 0.0),
        ];
        let samples = build_cursor_samples(&events, 1.0, 10, &settings);
        assert!(samples.iter().all(|sample| sample.position.is_finite()));
    }

    #[test]
    fn zero_fps_and_duration_are_floored() {
        let settings = CursorPolishSettings::default();
        let events = vec![PointerEvent::move_to(0.0, 1.0, 1.0)];
        let samples = build_cursor_samples(&events, 0.0, 0, &settings);
        // fps floors to 1 and duration to 0.1 s: frames 0 and 1.
        assert_eq!(samples.len(), 2);
        assert!(approx_eq(samples[1].time, 0.1));
    }
}
