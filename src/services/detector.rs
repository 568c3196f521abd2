use anyhow::{Context, Result, anyhow};
use image::GenericImageView;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Trait for smile/face detection routines.
///
/// Implementations receive the path of a staged image and return a
/// human-readable outcome. Any failure is reported to the client as a
/// processing error.
#[async_trait::async_trait]
pub trait SmileDetector: Send + Sync {
    async fn detect(&self, path: &Path) -> Result<String>;

    /// Check if the detector is available/healthy
    async fn health_check(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// Decodes the image and reports what was received.
///
/// Stands in for a model when none is wired in; it still rejects content
/// that is not a decodable PNG/JPEG.
pub struct ImageProbeDetector;

#[async_trait::async_trait]
impl SmileDetector for ImageProbeDetector {
    async fn detect(&self, path: &Path) -> Result<String> {
        let path = path.to_path_buf();

        let (width, height) = tokio::task::spawn_blocking(move || {
            // Format comes from the content; the staged extension may not match it
            let img = image::io::Reader::open(&path)
                .context("Failed to open image")?
                .with_guessed_format()
                .context("Failed to read image header")?
                .decode()
                .context("Failed to decode image")?;
            Ok::<_, anyhow::Error>(img.dimensions())
        })
        .await
        .map_err(|e| anyhow!("Detection task failed: {}", e))??;

        Ok(format!(
            "Image received ({}x{} pixels). No face model is configured.",
            width, height
        ))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "probe"
    }
}

/// Runs an external program with the staged path as its only argument and
/// uses its trimmed stdout as the message.
pub struct CommandDetector {
    program: PathBuf,
}

impl CommandDetector {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait::async_trait]
impl SmileDetector for CommandDetector {
    async fn detect(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .arg(path)
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.program.display()))?;

        if !output.status.success() {
            return Err(anyhow!(
                "Detector exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let message = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if message.is_empty() {
            return Err(anyhow!("Detector produced no output"));
        }

        Ok(message)
    }

    async fn health_check(&self) -> bool {
        tokio::fs::metadata(&self.program)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// No-op detector for development/testing
pub struct NoOpDetector;

pub const NOOP_MESSAGE: &str = "Detection skipped (development mode)";

#[async_trait::async_trait]
impl SmileDetector for NoOpDetector {
    async fn detect(&self, _path: &Path) -> Result<String> {
        tracing::warn!("NoOpDetector: Skipping detection (development mode)");
        Ok(NOOP_MESSAGE.to_string())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Factory function to create the detector selected by config
pub fn create_detector(detector_type: &str, command: Option<&str>) -> Box<dyn SmileDetector> {
    match detector_type.to_lowercase().as_str() {
        "probe" => Box::new(ImageProbeDetector),
        "command" => match command {
            Some(program) => Box::new(CommandDetector::new(program)),
            None => {
                tracing::warn!("DETECTOR=command without DETECTOR_COMMAND, using ImageProbeDetector");
                Box::new(ImageProbeDetector)
            }
        },
        "noop" | "none" | "disabled" => Box::new(NoOpDetector),
        _ => {
            tracing::warn!(
                "Unknown detector type '{}', using ImageProbeDetector",
                detector_type
            );
            Box::new(ImageProbeDetector)
        }
    }
}
