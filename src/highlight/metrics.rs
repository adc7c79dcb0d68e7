// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Performance metrics for highlight passes.

use std::time::Duration;

/// Totals accumulated over the highlight passes of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightMetrics {
    /// Number of completed passes
    pub passes: usize,
    /// Total time spent recomputing
    pub total_time: Duration,
    /// Slowest single pass
    pub max_pass_time: Duration,
    /// Duration of the most recent pass
    pub last_pass_time: Duration,
    /// Spans produced by the most recent pass
    pub last_span_count: usize,
    /// Bytes scanned per rule by the most recent pass
    pub last_window_len: usize,
    /// Rules skipped because their pattern did not compile, summed over passes
    pub invalid_rules_skipped: usize,
    /// Passes whose preview hit the match cap
    pub truncated_previews: usize,
}

impl HighlightMetrics {
    /// Records one finished pass.
    pub fn record_pass(&mut self, duration: Duration, summary: &PassSummary) {
        self.passes += 1;
        self.total_time += duration;
        self.last_pass_time = duration;
        self.max_pass_time = self.max_pass_time.max(duration);
        self.last_span_count = summary.spans;
        self.last_window_len = summary.window_len;
        self.invalid_rules_skipped += summary.invalid_rules;
        if summary.preview_truncated {
            self.truncated_previews += 1;
        }
    }

    /// Mean pass duration, zero before the first pass.
    pub fn average_pass_time(&self) -> Duration {
        if self.passes == 0 {
            Duration::ZERO
        } else {
            self.total_time / self.passes as u32
        }
    }

    pub fn reset(&mut self) {
        *self = Default::default();
    }
}

/// What a single pass did, as reported by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub rules_scanned: usize,
    pub invalid_rules: usize,
    pub spans: usize,
    pub window_len: usize,
    pub preview_truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_pass() {
        let mut metrics = HighlightMetrics::default();
        assert_eq!(metrics.average_pass_time(), Duration::ZERO);

        let summary = PassSummary {
            rules_scanned: 2,
            invalid_rules: 1,
            spans: 7,
            window_len: 100,
            preview_truncated: true,
        };
        metrics.record_pass(Duration::from_millis(10), &summary);
        metrics.record_pass(Duration::from_millis(30), &PassSummary::default());

        assert_eq!(metrics.passes, 2);
        assert_eq!(metrics.max_pass_time, Duration::from_millis(30));
        assert_eq!(metrics.last_pass_time, Duration::from_millis(30));
        assert_eq!(metrics.average_pass_time(), Duration::from_millis(20));
        assert_eq!(metrics.invalid_rules_skipped, 1);
        assert_eq!(metrics.truncated_previews, 1);
        assert_eq!(metrics.last_span_count, 0);

        metrics.reset();
        assert_eq!(metrics, HighlightMetrics::default());
    }
}
