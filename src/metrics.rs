use serde::Serialize;

/// Characters per word for speed calculations.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Derived view of a typing session at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub wpm: u32,
    pub accuracy: f64,
    pub elapsed_secs: u64,
    pub error_count: u32,
    pub correct_chars: usize,
    pub total_chars: usize,
}

impl MetricsSnapshot {
    /// The snapshot shown before anything has been typed.
    pub fn zero() -> Self {
        Self {
            wpm: 0,
            accuracy: 100.0,
            elapsed_secs: 0,
            error_count: 0,
            correct_chars: 0,
            total_chars: 0,
        }
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self::zero()
    }
}

/// Number of positions where `input` matches `target`.
pub fn correct_chars(input: &str, target: &str) -> usize {
    input
        .chars()
        .zip(target.chars())
        .filter(|(typed, expected)| typed == expected)
        .count()
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute a snapshot from the raw session values.
///
/// `total_chars` is always the target length while the accuracy denominator is
/// the current input length; the two are reported side by side unchanged.
pub fn compute_metrics(
    input: &str,
    target: &str,
    error_count: u32,
    elapsed_ms: u64,
) -> MetricsSnapshot {
    let correct = correct_chars(input, target);
    let typed = input.chars().count();

    let accuracy = if typed == 0 {
        100.0
    } else {
        round1(100.0 * correct as f64 / typed as f64)
    };

    let minutes = elapsed_ms as f64 / 60_000.0;
    let wpm = if minutes <= 0.0 {
        0
    } else {
        (correct as f64 / CHARS_PER_WORD / minutes).round() as u32
    };

    MetricsSnapshot {
        wpm,
        accuracy,
        elapsed_secs: (elapsed_ms as f64 / 1000.0).round() as u64,
        error_count,
        correct_chars: correct,
        total_chars: target.chars().count(),
    }
}
