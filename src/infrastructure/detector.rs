use crate::config::AppConfig;
use crate::services::detector::{SmileDetector, create_detector};
use std::sync::Arc;
use tracing::info;

pub async fn setup_detector(config: &AppConfig) -> Arc<dyn SmileDetector> {
    let detector = create_detector(&config.detector_type, config.detector_command.as_deref());

    if detector.health_check().await {
        info!("🔍 Detector '{}' ready", detector.name());
    } else {
        tracing::warn!(
            "⚠️  Detector '{}' unavailable! Uploads will fail with a processing error.",
            detector.name()
        );
    }

    detector.into()
}
