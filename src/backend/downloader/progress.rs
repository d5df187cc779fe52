//! Download progress tracking.

/// Tracks bytes written against an optional total and reports whole-percent
/// steps. Each percentage is reported once and never goes backwards.
pub struct ProgressTracker<F: FnMut(u8)> {
    total: u64,
    written: u64,
    last_percent: Option<u8>,
    report: F,
}

impl<F: FnMut(u8)> ProgressTracker<F> {
    /// A missing or zero total means the size is unknown; a single 0 is
    /// reported on the first chunk in that case.
    pub fn new(total: Option<u64>, report: F) -> Self {
        Self {
            total: total.unwrap_or(0),
            written: 0,
            last_percent: None,
            report,
        }
    }

    /// Record a chunk. With a known total this reports
    /// `floor(written / total * 100)` after the chunk is counted.
    pub fn advance(&mut self, bytes: u64) {
        self.written += bytes;
        let percent = if self.total > 0 {
            ((self.written as f64 / self.total as f64) * 100.0)
                .floor()
                .min(100.0) as u8
        } else {
            0
        };
        if self.last_percent.is_none_or(|last| percent > last) {
            self.last_percent = Some(percent);
            (self.report)(percent);
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}
