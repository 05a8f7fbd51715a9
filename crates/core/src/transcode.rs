//! Frame extraction via the external `ffmpeg` binary.
//!
//! [`FfmpegExtractor`] implements the [`FrameExtractor`] contract: it is
//! initialized lazily (concurrent first callers all wait on one probe of
//! the binary) and extracts one still image per requested timestamp into
//! a private scratch directory, reading every output back into memory
//! before returning. Any failure aborts the whole batch — partial output
//! is never returned.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;

/// Fixed screenshot candidate policy: one frame at each of these offsets
/// from the start of the clip. Not user-configurable.
pub const SCREENSHOT_TIMESTAMPS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(3),
];

/// Scale filter applied to every extracted frame: fixed width, height
/// derived from the source aspect ratio.
pub const SCREENSHOT_SCALE_FILTER: &str = "scale=510:-1";

/// Error type for frame-extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("expected output frame missing: {0}")]
    OutputMissing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces still images from a source video at requested timestamps.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Prepare the extractor for use. Idempotent; concurrent callers
    /// all resolve once one initialization completes.
    async fn ensure_ready(&self) -> Result<(), TranscodeError>;

    /// Extract one PNG frame per timestamp, in request order.
    ///
    /// Timestamps outside the clip duration surface as an execution
    /// error; out-of-range validation is not performed here. On any
    /// failure the whole batch fails with no partial results.
    async fn extract_frames(
        &self,
        video: &[u8],
        timestamps: &[Duration],
    ) -> Result<Vec<Vec<u8>>, TranscodeError>;
}

/// [`FrameExtractor`] backed by the system `ffmpeg` binary.
pub struct FfmpegExtractor {
    ready: OnceCell<()>,
}

impl FfmpegExtractor {
    pub fn new() -> Self {
        Self {
            ready: OnceCell::new(),
        }
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameExtractor for FfmpegExtractor {
    async fn ensure_ready(&self) -> Result<(), TranscodeError> {
        self.ready
            .get_or_try_init(|| async {
                let output = tokio::process::Command::new("ffmpeg")
                    .arg("-version")
                    .output()
                    .await
                    .map_err(TranscodeError::NotFound)?;

                if !output.status.success() {
                    return Err(TranscodeError::ExecutionFailed {
                        exit_code: output.status.code(),
                        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    });
                }

                tracing::debug!("ffmpeg binary probed successfully");
                Ok(())
            })
            .await
            .copied()
    }

    async fn extract_frames(
        &self,
        video: &[u8],
        timestamps: &[Duration],
    ) -> Result<Vec<Vec<u8>>, TranscodeError> {
        self.ensure_ready().await?;

        let scratch = scratch_dir();
        tokio::fs::create_dir_all(&scratch).await?;

        let result = extract_in_scratch(&scratch, video, timestamps).await;

        // Outputs are already materialized into memory; scratch cleanup
        // is best-effort.
        if let Err(err) = tokio::fs::remove_dir_all(&scratch).await {
            tracing::warn!(path = %scratch.display(), error = %err, "Failed to remove scratch dir");
        }

        result
    }
}

/// Private per-call scratch namespace under the system temp dir.
fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("clipvault-scratch-{}", uuid::Uuid::new_v4()))
}

async fn extract_in_scratch(
    scratch: &Path,
    video: &[u8],
    timestamps: &[Duration],
) -> Result<Vec<Vec<u8>>, TranscodeError> {
    let input = scratch.join("input.mp4");
    tokio::fs::write(&input, video).await?;

    let mut frames = Vec::with_capacity(timestamps.len());

    for (index, timestamp) in timestamps.iter().enumerate() {
        let output = scratch.join(format!("output_{index:02}.png"));

        let cmd_output = tokio::process::Command::new("ffmpeg")
            .args(frame_args(&input, *timestamp, &output))
            .output()
            .await
            .map_err(TranscodeError::NotFound)?;

        if !cmd_output.status.success() {
            return Err(TranscodeError::ExecutionFailed {
                exit_code: cmd_output.status.code(),
                stderr: String::from_utf8_lossy(&cmd_output.stderr).to_string(),
            });
        }

        let bytes = tokio::fs::read(&output).await.map_err(|_| {
            TranscodeError::OutputMissing(output.to_string_lossy().to_string())
        })?;
        frames.push(bytes);
    }

    Ok(frames)
}

/// Build the argument list for extracting one frame.
pub fn frame_args(input: &Path, timestamp: Duration, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-ss".to_string(),
        format_timestamp(timestamp),
        "-frames:v".to_string(),
        "1".to_string(),
        "-filter:v".to_string(),
        SCREENSHOT_SCALE_FILTER.to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Format a timestamp as `hh:mm:ss.mmm` for `-ss`.
pub fn format_timestamp(timestamp: Duration) -> String {
    let total_secs = timestamp.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp.subsec_millis();
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Read the pixel dimensions of an encoded image from its header.
pub fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_second_timestamps() {
        assert_eq!(format_timestamp(Duration::from_secs(1)), "00:00:01.000");
        assert_eq!(format_timestamp(Duration::from_secs(61)), "00:01:01.000");
        assert_eq!(format_timestamp(Duration::from_secs(3661)), "01:01:01.000");
    }

    #[test]
    fn formats_subsecond_timestamps() {
        assert_eq!(
            format_timestamp(Duration::from_millis(1500)),
            "00:00:01.500"
        );
    }

    #[test]
    fn frame_args_carry_policy_options() {
        let args = frame_args(
            Path::new("/tmp/in.mp4"),
            Duration::from_secs(2),
            Path::new("/tmp/out.png"),
        );

        assert_eq!(args.first().map(String::as_str), Some("-y"));
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "00:00:02.000");
        let frames = args.iter().position(|a| a == "-frames:v").unwrap();
        assert_eq!(args[frames + 1], "1");
        let filter = args.iter().position(|a| a == "-filter:v").unwrap();
        assert_eq!(args[filter + 1], SCREENSHOT_SCALE_FILTER);
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.png"));
    }

    #[test]
    fn policy_is_three_ascending_timestamps() {
        assert_eq!(SCREENSHOT_TIMESTAMPS.len(), 3);
        assert!(SCREENSHOT_TIMESTAMPS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn reads_dimensions_from_png_header() {
        let mut buf = Cursor::new(Vec::new());
        image::RgbaImage::new(510, 287)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();

        assert_eq!(image_dimensions(buf.get_ref()), Some((510, 287)));
        assert_eq!(image_dimensions(b"not an image"), None);
    }
}
