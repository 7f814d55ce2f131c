use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SlidewrightResult;
use crate::models::{ChatMessage, Presentation, PresentationUpdate, Slide};

use super::{apply_update, remove_by_id, PresentationStore};

#[derive(Default)]
pub struct InMemoryPresentationStore {
    presentations: RwLock<Vec<Presentation>>,
}

impl InMemoryPresentationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presentations(presentations: Vec<Presentation>) -> Self {
        Self {
            presentations: RwLock::new(presentations),
        }
    }
}

#[async_trait]
impl PresentationStore for InMemoryPresentationStore {
    async fn save(
        &self,
        name: &str,
        messages: Vec<ChatMessage>,
        slides: Vec<Slide>,
    ) -> SlidewrightResult<Presentation> {
        let presentation = Presentation::new(name, messages, slides);
        self.presentations
            .write()
            .await
            .insert(0, presentation.clone());
        Ok(presentation)
    }

    async fn update(
        &self,
        id: &str,
        update: PresentationUpdate,
    ) -> SlidewrightResult<Option<Presentation>> {
        let mut presentations = self.presentations.write().await;
        Ok(apply_update(&mut presentations, id, update))
    }

    async fn delete(&self, id: &str) -> SlidewrightResult<bool> {
        let mut presentations = self.presentations.write().await;
        Ok(remove_by_id(&mut presentations, id))
    }

    async fn get(&self, id: &str) -> SlidewrightResult<Option<Presentation>> {
        let presentations = self.presentations.read().await;
        Ok(presentations.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self) -> SlidewrightResult<Vec<Presentation>> {
        Ok(self.presentations.read().await.clone())
    }
}
