pub mod file;
pub mod memory;

pub use file::FilePresentationStore;
pub use memory::InMemoryPresentationStore;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::SlidewrightConfig;
use crate::error::{SlidewrightError, SlidewrightResult};
use crate::models::{ChatMessage, Presentation, PresentationUpdate, Slide};

/// Key under which the whole presentation history is stored.
pub const STORAGE_KEY: &str = "presentation_history";

#[async_trait]
pub trait PresentationStore: Send + Sync {
    /// Create a new presentation and put it at the front of the history.
    async fn save(
        &self,
        name: &str,
        messages: Vec<ChatMessage>,
        slides: Vec<Slide>,
    ) -> SlidewrightResult<Presentation>;

    async fn update(
        &self,
        id: &str,
        update: PresentationUpdate,
    ) -> SlidewrightResult<Option<Presentation>>;

    async fn delete(&self, id: &str) -> SlidewrightResult<bool>;

    async fn get(&self, id: &str) -> SlidewrightResult<Option<Presentation>>;

    /// All presentations, newest first.
    async fn list(&self) -> SlidewrightResult<Vec<Presentation>>;

    /// Like `get`, but a missing id is an error.
    async fn require(&self, id: &str) -> SlidewrightResult<Presentation> {
        self.get(id)
            .await?
            .ok_or_else(|| SlidewrightError::PresentationNotFound(id.to_string()))
    }
}

/// Build the store selected by `storage.backend`.
pub async fn open_store(config: &SlidewrightConfig) -> SlidewrightResult<Arc<dyn PresentationStore>> {
    match config.storage.backend.as_str() {
        "memory" => {
            info!("Using in-memory presentation store");
            Ok(Arc::new(InMemoryPresentationStore::new()))
        }
        "file" => {
            let path = config.storage_path().ok_or_else(|| {
                SlidewrightError::Config("Could not determine data directory".to_string())
            })?;
            info!("Using presentation store at {}", path.display());
            Ok(Arc::new(FilePresentationStore::open(path).await?))
        }
        other => Err(SlidewrightError::InvalidConfigValue {
            key: "storage.backend".to_string(),
            message: format!("Unknown backend '{}'", other),
        }),
    }
}

pub(crate) fn apply_update(
    presentations: &mut [Presentation],
    id: &str,
    update: PresentationUpdate,
) -> Option<Presentation> {
    let presentation = presentations.iter_mut().find(|p| p.id == id)?;
    presentation.apply(update);
    Some(presentation.clone())
}

pub(crate) fn remove_by_id(presentations: &mut Vec<Presentation>, id: &str) -> bool {
    let before = presentations.len();
    presentations.retain(|p| p.id != id);
    presentations.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let mut config = SlidewrightConfig::default();
        config.storage.backend = "memory".to_string();
        let store = open_store(&config).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SlidewrightConfig::default();
        config.storage.path = Some(dir.path().join("history.json"));
        let store = open_store(&config).await.unwrap();
        store.save("deck", vec![], vec![]).await.unwrap();
        assert!(dir.path().join("history.json").exists());
    }

    #[tokio::test]
    async fn test_open_unknown_backend() {
        let mut config = SlidewrightConfig::default();
        config.storage.backend = "redis".to_string();
        assert!(open_store(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_require_missing() {
        let store = InMemoryPresentationStore::new();
        let err = store.require("nope").await.unwrap_err();
        assert_eq!(err.error_code(), "E3001");
    }
}
