use crate::models::events::{sort_by_time, PointerEvent};
use crate::models::geometry::{RectD, ScreenPoint};
use crate::models::plan::ZoomSegment;
use crate::models::settings::CameraFollowSettings;

const CLICK_SCALE_DAMPING: f64 = 0.82;
const HOVER_SCALE_FACTOR: f64 = 0.72;
const MIN_FOCUS_SIDE_PX: f64 = 8.0;
const SUPPRESSION_LEAD_SECONDS: f64 = 0.15;
const SUPPRESSION_TAIL_SECONDS: f64 = 0.24;

/// Viewport-relative thresholds derived from the camera settings.
#[derive(Debug, Clone, Copy)]
struct ScreenMetrics {
    viewport: RectD,
}

impl ScreenMetrics {
    fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: RectD::viewport(width as f64, height as f64),
        }
    }

    fn min_side(self) -> f64 {
        self.viewport.min_side()
    }

    fn focus_size_px(self, settings: &CameraFollowSettings) -> (f64, f64) {
        (
            (self.viewport.width * settings.focus_area_ratio).max(MIN_FOCUS_SIDE_PX),
            (self.viewport.height * settings.focus_area_ratio).max(MIN_FOCUS_SIDE_PX),
        )
    }

    fn stay_radius_px(self) -> f64 {
        (self.min_side() * 0.28).max(64.0)
    }

    fn exit_radius_px(self) -> f64 {
        self.stay_radius_px() * 1.28
    }

    fn dwell_travel_px(self) -> f64 {
        (self.min_side() * 0.028).max(26.0)
    }

    fn click_suppression_radius_px(self) -> f64 {
        (self.min_side() * 0.18).max(84.0)
    }

    fn bridge_distance_px(self) -> f64 {
        (self.min_side() * 0.25).max(48.0)
    }

    fn clamp_focus_center(self, point: ScreenPoint, settings: &CameraFollowSettings) -> ScreenPoint {
        let (focus_width, focus_height) = self.focus_size_px(settings);
        self.viewport.clamp_center(point, focus_width, focus_height)
    }
}

#[derive(Debug, Clone, Copy)]
struct HoldTiming {
    extension_tail_seconds: f64,
    max_extension_seconds: f64,
}

impl HoldTiming {
    fn new(settings: &CameraFollowSettings) -> Self {
        Self {
            extension_tail_seconds: (settings.pre_roll_seconds + 0.04).max(0.14),
            max_extension_seconds: (settings.hold_seconds * 10.0).max(1.8),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DwellTiming {
    min_duration_seconds: f64,
    max_window_seconds: f64,
    lead_seconds: f64,
    tail_seconds: f64,
}

impl DwellTiming {
    fn new(settings: &CameraFollowSettings) -> Self {
        let min_duration_seconds = (settings.hold_seconds * 0.9).max(0.55);
        Self {
            min_duration_seconds,
            max_window_seconds: (min_duration_seconds * 2.3).max(1.9),
            lead_seconds: (settings.pre_roll_seconds * 0.5).min(0.08),
            tail_seconds: (settings.pre_roll_seconds + 0.10).max(0.22),
        }
    }
}

/// Zoom scale for a primary click, kept below the literal inverse focus ratio.
pub fn click_zoom_scale(settings: &CameraFollowSettings) -> f64 {
    clamp_scale(
        (1.0 / settings.focus_area_ratio) * CLICK_SCALE_DAMPING,
        settings.min_scale,
        settings.max_scale,
    )
}

/// Softer scale used for dwell segments.
pub fn hover_zoom_scale(settings: &CameraFollowSettings, click_scale: f64) -> f64 {
    let floor = (settings.min_scale + 0.08).max(1.08);
    let ceiling = floor.max(click_scale - 0.22);
    let softened = (click_scale * HOVER_SCALE_FACTOR).max(floor).min(ceiling);
    clamp_scale(softened, settings.min_scale, settings.max_scale)
}

/// Builds the zoom segments for a pointer stream.
///
/// Clicks produce pre-rolled hold segments that stretch while the pointer
/// keeps working near the click. Dwell windows without a nearby click produce
/// gentler hover segments. Close neighbours are bridged so the camera does
/// not zoom out and back in between them.
pub fn build_auto_zoom_segments(
    events: &[PointerEvent],
    viewport_width: u32,
    viewport_height: u32,
    settings: &CameraFollowSettings,
) -> Vec<ZoomSegment> {
    if events.is_empty() || viewport_width <= 1 || viewport_height <= 1 {
        return Vec::new();
    }

    let metrics = ScreenMetrics::new(viewport_width, viewport_height);
    let samples = collect_pointer_samples(events);
    let clicks = samples
        .iter()
        .filter(|event| event.is_primary_click())
        .copied()
        .collect::<Vec<_>>();

    let click_scale = click_zoom_scale(settings);
    let click_segments = build_click_segments(&clicks, metrics, settings, click_scale);
    let extended = extend_holds_by_local_activity(&click_segments, &samples, metrics, settings);
    let hovers = build_hover_segments(&samples, &clicks, metrics, settings, click_scale);

    let mut combined = extended;
    combined.extend(hovers.iter().copied());
    sort_segments(&mut combined);
    let segments = bridge_nearby_gaps(combined, metrics, settings);

    log::debug!(
        "build_auto_zoom_segments: events={} clicks={} hovers={} segments={}",
        events.len(),
        clicks.len(),
        hovers.len(),
        segments.len()
    );

    segments
}

fn collect_pointer_samples(events: &[PointerEvent]) -> Vec<PointerEvent> {
    sort_by_time(events)
        .into_iter()
        .filter(PointerEvent::is_position_event)
        .collect()
}

fn build_click_segments(
    clicks: &[PointerEvent],
    metrics: ScreenMetrics,
    settings: &CameraFollowSettings,
    scale: f64,
) -> Vec<ZoomSegment> {
    let mut segments = clicks
        .iter()
        .map(|click| {
            let start = (click.time - settings.pre_roll_seconds).max(0.0);
            ZoomSegment {
                start,
                end: (click.time + settings.hold_seconds).max(start),
                center: metrics.clamp_focus_center(click.position(), settings),
                scale,
                trigger_count: 1,
            }
        })
        .collect::<Vec<_>>();

    sort_segments(&mut segments);
    segments
}

/// Stretches each click hold while the pointer keeps working near the click.
///
/// The extension only happens once the pointer is seen inside the stay radius
/// after the nominal hold; it ends a short tail after the last inside sample
/// and never runs into the next click segment.
fn extend_holds_by_local_activity(
    segments: &[ZoomSegment],
    samples: &[PointerEvent],
    metrics: ScreenMetrics,
    settings: &CameraFollowSettings,
) -> Vec<ZoomSegment> {
    if segments.is_empty() || samples.is_empty() {
        return segments.to_vec();
    }

    let stay_radius = metrics.stay_radius_px();
    let exit_radius = metrics.exit_radius_px();
    let timing = HoldTiming::new(settings);

    let mut search_start = 0usize;
    let mut extended = Vec::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        let click_time = (segment.start + settings.pre_roll_seconds)
            .max(segment.start)
            .min(segment.end);
        let next_start = segments
            .get(index + 1)
            .map_or(f64::INFINITY, |next| next.start);
        let scan_until = next_start.min(click_time + timing.max_extension_seconds);

        while search_start < samples.len() && samples[search_start].time < click_time {
            search_start += 1;
        }

        let mut inside_after_hold = false;
        let mut last_inside = click_time;
        let mut extended_end = segment.end;

        for sample in &samples[search_start..] {
            if sample.time > scan_until {
                break;
            }

            let distance = segment.center.distance_to(sample.position());
            if distance <= stay_radius {
                last_inside = sample.time;
                if sample.time >= segment.end {
                    inside_after_hold = true;
                }
                continue;
            }

            if sample.time >= segment.end && inside_after_hold && distance >= exit_radius {
                break;
            }
        }

        if inside_after_hold {
            extended_end =
                extended_end.max(scan_until.min(last_inside + timing.extension_tail_seconds));
        }

        extended.push(ZoomSegment {
            end: segment.end.max(next_start.min(extended_end)),
            ..*segment
        });
    }

    extended
}

fn build_hover_segments(
    samples: &[PointerEvent],
    clicks: &[PointerEvent],
    metrics: ScreenMetrics,
    settings: &CameraFollowSettings,
    click_scale: f64,
) -> Vec<ZoomSegment> {
    if samples.len() < 2 {
        return Vec::new();
    }

    let hover_scale = hover_zoom_scale(settings, click_scale);
    if hover_scale >= click_scale {
        // A hover zoom must stay gentler than a click zoom.
        return Vec::new();
    }

    let timing = DwellTiming::new(settings);
    let max_travel = metrics.dwell_travel_px();
    let suppression_radius = metrics.click_suppression_radius_px();

    let mut hovers = Vec::new();
    let mut start_index = 0usize;

    while start_index < samples.len() - 1 {
        let first = samples[start_index];
        let (mut min_x, mut max_x) = (first.x, first.x);
        let (mut min_y, mut max_y) = (first.y, first.y);
        let mut last_dwell_index: Option<usize> = None;

        for (scan_index, sample) in samples.iter().enumerate().skip(start_index + 1) {
            let elapsed = sample.time - first.time;
            if elapsed > timing.max_window_seconds {
                break;
            }

            // The sample that breaks the travel limit stays out of the box.
            let (next_min_x, next_max_x) = (min_x.min(sample.x), max_x.max(sample.x));
            let (next_min_y, next_max_y) = (min_y.min(sample.y), max_y.max(sample.y));
            if (next_max_x - next_min_x).max(next_max_y - next_min_y) > max_travel {
                break;
            }
            (min_x, max_x) = (next_min_x, next_max_x);
            (min_y, max_y) = (next_min_y, next_max_y);

            if elapsed >= timing.min_duration_seconds {
                last_dwell_index = Some(scan_index);
            }
        }

        let Some(last_dwell_index) = last_dwell_index else {
            start_index += 1;
            continue;
        };

        let center = metrics.clamp_focus_center(
            ScreenPoint::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0),
            settings,
        );
        let start = (first.time - timing.lead_seconds).max(0.0);
        let end = (samples[last_dwell_index].time + timing.tail_seconds).max(start);

        if !has_nearby_click(clicks, center, start, end, suppression_radius) {
            hovers.push(ZoomSegment {
                start,
                end,
                center,
                scale: hover_scale,
                trigger_count: 1,
            });
        }

        start_index = last_dwell_index.max(start_index + 1);
    }

    hovers
}

fn has_nearby_click(
    clicks: &[PointerEvent],
    center: ScreenPoint,
    start: f64,
    end: f64,
    radius: f64,
) -> bool {
    let lower = (start - SUPPRESSION_LEAD_SECONDS).max(0.0);
    let upper = end + SUPPRESSION_TAIL_SECONDS;

    clicks.iter().any(|click| {
        click.time >= lower
            && click.time <= upper
            && center.distance_to(click.position()) <= radius
    })
}

/// Closes short gaps between nearby segments by stretching the earlier one.
fn bridge_nearby_gaps(
    mut segments: Vec<ZoomSegment>,
    metrics: ScreenMetrics,
    settings: &CameraFollowSettings,
) -> Vec<ZoomSegment> {
    let max_gap = (settings.pre_roll_seconds + 0.05).max(0.12);
    let max_distance = metrics.bridge_distance_px();

    for index in 1..segments.len() {
        let next = segments[index];
        let current = &mut segments[index - 1];

        let gap = next.start - current.end;
        if gap <= 0.0 || gap > max_gap {
            continue;
        }
        if current.center.distance_to(next.center) > max_distance {
            continue;
        }

        current.end = next.start;
    }

    segments
}

fn sort_segments(segments: &mut [ZoomSegment]) {
    segments.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));
}

// Bounds are reordered if inverted and never drop below 1x.
fn clamp_scale(value: f64, min_scale: f64, max_scale: f64) -> f64 {
    let low = min_scale.min(max_scale).max(1.0);
    let high = min_scale.max(max_scale).max(low);
    if value.is_nan() {
        return high;
    }
    value.max(low).min(high)
}
