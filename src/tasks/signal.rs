//! Pure signal arithmetic used by the task bodies.

/// Alarm state broadcast by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    Nominal = 0,
    Alarm = 1,
}

impl ErrorCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_alarm(self) -> bool {
        self == Self::Alarm
    }
}

/// Arithmetic mean of a sample window. An empty window averages to 0.
pub fn average(window: &[u16]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: u32 = window.iter().map(|&s| u32::from(s)).sum();
    f64::from(sum) / window.len() as f64
}

/// Alarm iff `avg` is strictly above half the sensor's full scale.
pub fn classify(avg: f64, max_range: u16) -> ErrorCode {
    if avg > f64::from(max_range) / 2.0 {
        ErrorCode::Alarm
    } else {
        ErrorCode::Nominal
    }
}

/// Synthetic CPU load: `iterations` no-op steps the optimiser cannot remove.
pub fn busy_work(iterations: u32) {
    for i in 0..iterations {
        core::hint::black_box(i);
    }
}
