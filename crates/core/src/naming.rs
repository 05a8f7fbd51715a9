//! Per-attempt asset naming.
//!
//! One random identifier is generated per publish attempt and shared by
//! exactly three artifacts: the video blob, the screenshot blob, and the
//! catalog record that links them. The identifier is never regenerated
//! mid-session; a retry is a new attempt with a new identifier.

use uuid::Uuid;

/// Blob store prefix for video assets.
pub const CLIPS_PREFIX: &str = "clips";

/// Blob store prefix for screenshot assets.
pub const SCREENSHOTS_PREFIX: &str = "screenshots";

/// The join key between one video blob, one screenshot blob, and one
/// catalog record. Derived once at publish time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Generate a fresh attempt identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Video asset file name (`{id}.mp4`).
    pub fn video_file_name(&self) -> String {
        format!("{}.mp4", self.0)
    }

    /// Screenshot asset file name (`{id}.png`).
    pub fn screenshot_file_name(&self) -> String {
        format!("{}.png", self.0)
    }

    /// Blob store path for the video asset (`clips/{id}.mp4`).
    pub fn video_path(&self) -> String {
        format!("{CLIPS_PREFIX}/{}", self.video_file_name())
    }

    /// Blob store path for the screenshot asset (`screenshots/{id}.png`).
    pub fn screenshot_path(&self) -> String {
        format!("{SCREENSHOTS_PREFIX}/{}", self.screenshot_file_name())
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_paths_share_one_identifier() {
        let id = AttemptId::generate();
        let video = id.video_path();
        let shot = id.screenshot_path();

        let video_stem = video
            .strip_prefix("clips/")
            .and_then(|f| f.strip_suffix(".mp4"))
            .unwrap();
        let shot_stem = shot
            .strip_prefix("screenshots/")
            .and_then(|f| f.strip_suffix(".png"))
            .unwrap();

        assert_eq!(video_stem, shot_stem);
    }

    #[test]
    fn file_names_carry_expected_extensions() {
        let id = AttemptId::generate();
        assert!(id.video_file_name().ends_with(".mp4"));
        assert!(id.screenshot_file_name().ends_with(".png"));
    }

    #[test]
    fn attempts_are_distinct() {
        assert_ne!(AttemptId::generate(), AttemptId::generate());
    }
}
