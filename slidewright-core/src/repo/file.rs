use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{SlidewrightError, SlidewrightResult};
use crate::models::{ChatMessage, Presentation, PresentationUpdate, Slide};

use super::{apply_update, remove_by_id, PresentationStore};

/// Presentation history kept as one JSON array on disk.
///
/// Every mutation rewrites the whole file through a temp file and a rename,
/// so readers never observe a half-written history.
pub struct FilePresentationStore {
    path: PathBuf,
    presentations: RwLock<Vec<Presentation>>,
}

impl FilePresentationStore {
    pub async fn open(path: impl Into<PathBuf>) -> SlidewrightResult<Self> {
        let path = path.into();
        let presentations = load_history(&path).await?;
        info!(
            "Loaded {} presentations from {}",
            presentations.len(),
            path.display()
        );

        Ok(Self {
            path,
            presentations: RwLock::new(presentations),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, presentations: &[Presentation]) -> SlidewrightResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SlidewrightError::StorageFailed(e.to_string()))?;
            }
        }

        let json = serde_json::to_vec_pretty(presentations)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| SlidewrightError::StorageFailed(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SlidewrightError::StorageFailed(e.to_string()))?;

        debug!(
            "Persisted {} presentations to {}",
            presentations.len(),
            self.path.display()
        );
        Ok(())
    }
}

async fn load_history(path: &Path) -> SlidewrightResult<Vec<Presentation>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(SlidewrightError::StorageFailed(e.to_string())),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    match serde_json::from_slice::<Vec<Presentation>>(&bytes) {
        Ok(presentations) => Ok(presentations),
        Err(e) => {
            let err = SlidewrightError::StorageCorrupted(e.to_string());
            err.log();

            let backup = backup_path(path);
            match tokio::fs::copy(path, &backup).await {
                Ok(_) => warn!("Backed up unreadable history to {}", backup.display()),
                Err(copy_err) => warn!("Could not back up unreadable history: {}", copy_err),
            }

            Ok(Vec::new())
        }
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

#[async_trait]
impl PresentationStore for FilePresentationStore {
    async fn save(
        &self,
        name: &str,
        messages: Vec<ChatMessage>,
        slides: Vec<Slide>,
    ) -> SlidewrightResult<Presentation> {
        let presentation = Presentation::new(name, messages, slides);
        let mut presentations = self.presentations.write().await;

        let mut next = presentations.clone();
        next.insert(0, presentation.clone());
        self.persist(&next).await?;
        *presentations = next;

        info!(id = %presentation.id, "Saved presentation '{}'", presentation.name);
        Ok(presentation)
    }

    async fn update(
        &self,
        id: &str,
        update: PresentationUpdate,
    ) -> SlidewrightResult<Option<Presentation>> {
        let mut presentations = self.presentations.write().await;

        let mut next = presentations.clone();
        let updated = match apply_update(&mut next, id, update) {
            Some(p) => p,
            None => return Ok(None),
        };
        self.persist(&next).await?;
        *presentations = next;

        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> SlidewrightResult<bool> {
        let mut presentations = self.presentations.write().await;

        let mut next = presentations.clone();
        if !remove_by_id(&mut next, id) {
            return Ok(false);
        }
        self.persist(&next).await?;
        *presentations = next;

        info!(id = %id, "Deleted presentation");
        Ok(true)
    }

    async fn get(&self, id: &str) -> SlidewrightResult<Option<Presentation>> {
        let presentations = self.presentations.read().await;
        Ok(presentations.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self) -> SlidewrightResult<Vec<Presentation>> {
        Ok(self.presentations.read().await.clone())
    }
}
