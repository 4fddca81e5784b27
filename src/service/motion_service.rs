use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const MAGNITUDE_THRESHOLD: f64 = 1.2;
pub const MIN_VERTICAL_CHANGE: f64 = 0.8;
pub const MIN_STEP_INTERVAL_MS: i64 = 400;
pub const ACCEL_HISTORY_LEN: usize = 20;
pub const STEP_HISTORY_LEN: usize = 10;
pub const RHYTHM_WINDOW: usize = 5;
pub const RHYTHM_MIN_PEAKS: usize = 2;
pub const PATTERN_FREE_STEPS: u64 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp_ms: i64,
}

/// Threshold-based step detector over raw accelerometer samples. A step needs
/// a large enough delta magnitude, real vertical movement, a 400ms gap since
/// the previous step, and (past the first two steps) a rhythmic run of recent
/// peaks so hand-waving does not count as walking.
#[derive(Debug, Default)]
pub struct StepDetector {
    last: Option<(f64, f64, f64)>,
    step_count: u64,
    magnitudes: VecDeque<f64>,
    step_times: VecDeque<i64>,
}

impl StepDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Feeds one sample; returns true when it completed a step.
    pub fn process(&mut self, sample: AccelSample) -> bool {
        let Some((lx, ly, lz)) = self.last else {
            self.last = Some((sample.x, sample.y, sample.z));
            return false;
        };

        let dx = (sample.x - lx).abs();
        let dy = (sample.y - ly).abs();
        let dz = (sample.z - lz).abs();
        let magnitude = (dx * dx + dy * dy + dz * dz).sqrt();

        self.magnitudes.push_back(magnitude);
        if self.magnitudes.len() > ACCEL_HISTORY_LEN {
            self.magnitudes.pop_front();
        }
        self.last = Some((sample.x, sample.y, sample.z));

        let significant = magnitude > MAGNITUDE_THRESHOLD;
        let vertical = dz > MIN_VERTICAL_CHANGE;
        let rhythmic = if self.step_count >= PATTERN_FREE_STEPS
            && self.magnitudes.len() >= RHYTHM_WINDOW
        {
            self.magnitudes
                .iter()
                .rev()
                .take(RHYTHM_WINDOW)
                .filter(|m| **m > MAGNITUDE_THRESHOLD)
                .count()
                >= RHYTHM_MIN_PEAKS
        } else {
            true
        };

        if !(significant && vertical && rhythmic) {
            return false;
        }

        let since_last = self
            .step_times
            .back()
            .map(|t| sample.timestamp_ms - t)
            .unwrap_or(i64::MAX);
        if since_last <= MIN_STEP_INTERVAL_MS {
            return false;
        }

        self.step_count += 1;
        self.step_times.push_back(sample.timestamp_ms);
        if self.step_times.len() > STEP_HISTORY_LEN {
            self.step_times.pop_front();
        }
        true
    }
}

/// Replays a recorded sample batch through a fresh detector.
pub fn count_steps(samples: &[AccelSample]) -> u64 {
    let mut detector = StepDetector::new();
    for sample in samples {
        detector.process(*sample);
    }
    detector.step_count()
}
