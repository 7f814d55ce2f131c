use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SlidewrightResult;

/// One call to a generative model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub model: String,
    pub prompt: String,
    /// Ask for image parts alongside text.
    pub want_image: bool,
}

impl ContentRequest {
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            want_image: false,
        }
    }

    pub fn image(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            want_image: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

/// The parts of the first candidate a model returned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedContent {
    pub parts: Vec<ContentPart>,
}

impl GeneratedContent {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::text(text)],
        }
    }

    /// All text parts concatenated.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<String>()
    }

    /// The first inline image part as a `data:` URI.
    pub fn first_image(&self) -> Option<String> {
        self.parts
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| d.mime_type.starts_with("image/"))
            .map(|d| format!("data:{};base64,{}", d.mime_type, d.data))
    }
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn generate_content(&self, request: &ContentRequest)
        -> SlidewrightResult<GeneratedContent>;
}
