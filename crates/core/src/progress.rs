//! Combined upload progress arithmetic.
//!
//! A publish attempt drives two concurrent blob uploads whose progress
//! streams resolve independently and in any interleaving. The published
//! value is the average of both fractions, and it must never regress
//! even if an underlying stream momentarily reports a stale value.

/// Aggregates two 0–100 progress streams into one monotonic fraction.
#[derive(Debug, Default)]
pub struct CombinedProgress {
    video_pct: u8,
    screenshot_pct: u8,
    published: f32,
}

impl CombinedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a video progress sample (0–100) and return the combined
    /// fraction.
    pub fn set_video(&mut self, pct: u8) -> f32 {
        self.video_pct = self.video_pct.max(pct.min(100));
        self.recompute()
    }

    /// Record a screenshot progress sample (0–100) and return the
    /// combined fraction.
    pub fn set_screenshot(&mut self, pct: u8) -> f32 {
        self.screenshot_pct = self.screenshot_pct.max(pct.min(100));
        self.recompute()
    }

    /// Current combined fraction in `0.0..=1.0`.
    ///
    /// Computed as `(videoPct + screenshotPct) / 200`.
    pub fn fraction(&self) -> f32 {
        self.published
    }

    fn recompute(&mut self) -> f32 {
        let combined = (self.video_pct as f32 + self.screenshot_pct as f32) / 200.0;
        // Monotonic: a stale sample from one stream must not regress
        // the published value.
        self.published = self.published.max(combined);
        self.published
    }
}
