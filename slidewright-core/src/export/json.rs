use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SlidewrightResult;
use crate::models::{ChatMessage, Slide};

use super::{sanitize_filename, ExportArtifact, ExportDocument, ExportSettings, JSON_CONTENT_TYPE};

/// Shape of an exported presentation file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExport {
    pub name: String,
    pub messages: Vec<ChatMessage>,
    pub slides: Vec<Slide>,
    pub exported_at: String,
}

pub fn export_json(
    document: &ExportDocument,
    settings: &ExportSettings,
) -> SlidewrightResult<ExportArtifact> {
    let export = JsonExport {
        name: document.name.clone(),
        messages: document.messages.clone(),
        slides: document.slides.clone(),
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    Ok(ExportArtifact {
        filename: format!("{}.json", sanitize_filename(&document.name)),
        content_type: JSON_CONTENT_TYPE,
        bytes: to_pretty_json(&export, settings.json_indent)?,
    })
}

fn to_pretty_json<T: Serialize>(data: &T, indent_size: usize) -> SlidewrightResult<Vec<u8>> {
    let indent = " ".repeat(indent_size).into_bytes();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut writer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    data.serialize(&mut serializer)?;
    Ok(writer)
}
