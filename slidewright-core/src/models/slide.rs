use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideLayout {
    #[default]
    TitleContent,
    TitleOnly,
    ContentOnly,
}

impl SlideLayout {
    pub fn has_title(&self) -> bool {
        !matches!(self, SlideLayout::ContentOnly)
    }

    pub fn has_body(&self) -> bool {
        !matches!(self, SlideLayout::TitleOnly)
    }
}

impl std::fmt::Display for SlideLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlideLayout::TitleContent => write!(f, "title-content"),
            SlideLayout::TitleOnly => write!(f, "title-only"),
            SlideLayout::ContentOnly => write!(f, "content-only"),
        }
    }
}

impl std::str::FromStr for SlideLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title-content" => Ok(SlideLayout::TitleContent),
            "title-only" => Ok(SlideLayout::TitleOnly),
            "content-only" => Ok(SlideLayout::ContentOnly),
            other => Err(format!("unknown slide layout: {}", other)),
        }
    }
}

/// One page of a deck.
///
/// Slides produced by a model are untrusted, so every field deserializes
/// leniently and unknown keys survive in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,

    #[serde(default, deserialize_with = "lenient_layout")]
    pub layout: SlideLayout,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_text"
    )]
    pub image_url: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_text"
    )]
    pub image_prompt: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Slide {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_layout(mut self, layout: SlideLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_image_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.image_prompt = Some(prompt.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// The image prompt, if one is set and non-empty.
    pub fn wants_image(&self) -> Option<&str> {
        self.image_prompt.as_deref().filter(|p| !p.is_empty())
    }

    pub fn has_image(&self) -> bool {
        self.image_url
            .as_deref()
            .is_some_and(|u| u.starts_with("data:image/"))
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn lenient_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_layout<'de, D>(deserializer: D) -> Result<SlideLayout, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse().unwrap_or_default(),
        _ => SlideLayout::default(),
    })
}
