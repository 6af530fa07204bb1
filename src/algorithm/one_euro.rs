//! Adaptive low-pass filter (One Euro) for a single cursor axis.
//!
//! The cutoff frequency grows with the filtered speed of the signal: slow
//! motion is smoothed hard, fast motion passes through with little lag.

use std::f64::consts::PI;

const MIN_DT_SECONDS: f64 = 0.0001;
const MIN_CUTOFF_HZ: f64 = 0.0001;

#[derive(Debug, Clone, Copy, Default)]
struct LowPass {
    value: Option<f64>,
}

impl LowPass {
    fn seeded(value: f64) -> Self {
        Self { value: Some(value) }
    }

    fn filter(&mut self, value: f64, alpha: f64) -> f64 {
        let next = match self.value {
            Some(previous) => alpha * value + (1.0 - alpha) * previous,
            None => value,
        };
        self.value = Some(next);
        next
    }
}

#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    min_cutoff: f64,
    beta: f64,
    derivative_cutoff: f64,
    value_filter: LowPass,
    derivative_filter: LowPass,
    last_time: f64,
    last_raw: f64,
    initialized: bool,
}

impl OneEuroFilter {
    pub fn new(min_cutoff: f64, beta: f64, derivative_cutoff: f64) -> Self {
        Self {
            min_cutoff: min_cutoff.max(MIN_CUTOFF_HZ),
            beta: beta.max(0.0),
            derivative_cutoff: derivative_cutoff.max(MIN_CUTOFF_HZ),
            value_filter: LowPass::default(),
            derivative_filter: LowPass::default(),
            last_time: 0.0,
            last_raw: 0.0,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn filter(&mut self, value: f64, time: f64) -> f64 {
        if !self.is_initialized() {
            self.reset(value, time);
            return value;
        }

        // Non-monotonic timestamps collapse to the minimum step.
        let dt = (time - self.last_time).max(MIN_DT_SECONDS);
        self.last_time = time;

        let derivative = (value - self.last_raw) / dt;
        self.last_raw = value;

        let derivative_alpha = smoothing_alpha(dt, self.derivative_cutoff);
        let filtered_derivative = self.derivative_filter.filter(derivative, derivative_alpha);

        let cutoff = self.min_cutoff + self.beta * filtered_derivative.abs();
        let value_alpha = smoothing_alpha(dt, cutoff);

        self.value_filter.filter(value, value_alpha)
    }

    /// Re-seeds the filter so the next sample continues from `value` without lag.
    pub fn reset(&mut self, value: f64, time: f64) {
        self.value_filter = LowPass::seeded(value);
        self.derivative_filter = LowPass::seeded(0.0);
        self.last_raw = value;
        self.last_time = time;
        self.initialized = true;
    }
}

fn smoothing_alpha(dt: f64, cutoff: f64) -> f64 {
    let tau = 1.0 / (2.0 * PI * cutoff);
    1.0 / (1.0 + tau / dt)
}
