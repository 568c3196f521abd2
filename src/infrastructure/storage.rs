use crate::config::AppConfig;
use crate::services::storage::LocalStorageService;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &AppConfig) -> Result<Arc<LocalStorageService>> {
    let storage = LocalStorageService::new(&config.upload_dir);

    storage.ensure_root().await.with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;

    info!("📁 Local Storage: {}", storage.root().display());
    Ok(Arc::new(storage))
}
