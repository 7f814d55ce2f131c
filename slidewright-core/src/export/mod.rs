//! Export adapters.
//!
//! Each adapter turns an [`ExportDocument`] into an [`ExportArtifact`]: the
//! bytes plus the filename and content type a download should carry.

pub mod chat;
pub mod json;
pub mod pptx;

pub use chat::export_chat;
pub use json::{export_json, JsonExport};
pub use pptx::{export_pptx, PptxWriter};

use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;
use crate::error::{SlidewrightError, SlidewrightResult};
use crate::models::{ChatMessage, Presentation, Slide};

pub const DEFAULT_PRESENTATION_NAME: &str = "Untitled Presentation";
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pptx,
    Json,
    Chat,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Pptx => write!(f, "pptx"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Chat => write!(f, "chat"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = SlidewrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pptx" | "ppt" => Ok(ExportFormat::Pptx),
            "json" => Ok(ExportFormat::Json),
            "chat" | "txt" | "text" => Ok(ExportFormat::Chat),
            other => Err(SlidewrightError::InvalidRequest(format!(
                "Unknown export format '{}'. Expected pptx, json or chat",
                other
            ))),
        }
    }
}

/// What gets exported: a name, the conversation and the deck.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportDocument {
    pub name: String,
    pub messages: Vec<ChatMessage>,
    pub slides: Vec<Slide>,
}

impl ExportDocument {
    pub fn new(name: Option<String>, messages: Vec<ChatMessage>, slides: Vec<Slide>) -> Self {
        Self {
            name: name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PRESENTATION_NAME.to_string()),
            messages,
            slides,
        }
    }
}

impl From<&Presentation> for ExportDocument {
    fn from(p: &Presentation) -> Self {
        Self::new(Some(p.name.clone()), p.messages.clone(), p.slides.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub json_indent: usize,
    pub footer_text: String,
    pub datetime_format: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for ExportSettings {
    fn from(config: &ExportConfig) -> Self {
        Self {
            json_indent: config.json_indent.min(8),
            footer_text: config.footer_text.clone(),
            datetime_format: config.datetime_format.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

pub fn export(
    document: &ExportDocument,
    format: ExportFormat,
    settings: &ExportSettings,
) -> SlidewrightResult<ExportArtifact> {
    match format {
        ExportFormat::Pptx => export_pptx(&document.slides, settings),
        ExportFormat::Json => export_json(document, settings),
        ExportFormat::Chat => Ok(export_chat(document, settings)),
    }
}

/// Make a presentation name safe for a `Content-Disposition` filename.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "presentation".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("PPTX".parse::<ExportFormat>().unwrap(), ExportFormat::Pptx);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Chat);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Chat.to_string(), "chat");
    }

    #[test]
    fn test_document_default_name() {
        assert_eq!(
            ExportDocument::new(None, vec![], vec![]).name,
            DEFAULT_PRESENTATION_NAME
        );
        assert_eq!(
            ExportDocument::new(Some("  ".to_string()), vec![], vec![]).name,
            DEFAULT_PRESENTATION_NAME
        );
        assert_eq!(
            ExportDocument::new(Some("Q3".to_string()), vec![], vec![]).name,
            "Q3"
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Q3 Review"), "Q3 Review");
        assert_eq!(sanitize_filename("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize_filename("say \"hi\""), "say _hi_");
        assert_eq!(sanitize_filename("Café"), "Caf_");
        assert_eq!(sanitize_filename("line\nbreak"), "line_break");
        assert_eq!(sanitize_filename("   "), "presentation");
    }

    #[test]
    fn test_content_disposition() {
        let artifact = ExportArtifact {
            filename: "deck.json".to_string(),
            content_type: JSON_CONTENT_TYPE,
            bytes: vec![],
        };
        assert_eq!(
            artifact.content_disposition(),
            "attachment; filename=\"deck.json\""
        );
    }

    #[test]
    fn test_dispatch() {
        let doc = ExportDocument::new(
            Some("deck".to_string()),
            vec![ChatMessage::user("hi")],
            vec![Slide::new("a", "b")],
        );
        let settings = ExportSettings::default();

        let pptx = export(&doc, ExportFormat::Pptx, &settings).unwrap();
        assert_eq!(pptx.filename, "presentation.pptx");
        assert_eq!(&pptx.bytes[..2], b"PK");

        let json = export(&doc, ExportFormat::Json, &settings).unwrap();
        assert_eq!(json.filename, "deck.json");

        let chat = export(&doc, ExportFormat::Chat, &settings).unwrap();
        assert_eq!(chat.filename, "deck-chat.txt");
    }
}
