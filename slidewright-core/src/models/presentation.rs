use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChatMessage, Slide};

/// A named deck together with the conversation that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub slides: Vec<Slide>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Presentation {
    pub fn new(name: impl Into<String>, messages: Vec<ChatMessage>, slides: Vec<Slide>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            messages,
            slides,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update; `id` and `created_at` are never touched.
    pub fn apply(&mut self, update: PresentationUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(messages) = update.messages {
            self.messages = messages;
        }
        if let Some(slides) = update.slides {
            self.slides = slides;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub slides: Option<Vec<Slide>>,
}

impl PresentationUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.messages.is_none() && self.slides.is_none()
    }
}
