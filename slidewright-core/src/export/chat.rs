use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::ChatMessage;

use super::{sanitize_filename, ExportArtifact, ExportDocument, ExportSettings, TEXT_CONTENT_TYPE};

const MESSAGE_SEPARATOR: &str = "\n---\n\n";

/// Render the conversation as a readable transcript, oldest message first.
pub fn export_chat(document: &ExportDocument, settings: &ExportSettings) -> ExportArtifact {
    let generated = format_timestamp(&Utc::now(), &settings.datetime_format);
    let text = render_transcript(&document.name, &generated, &document.messages, settings);

    ExportArtifact {
        filename: format!("{}-chat.txt", sanitize_filename(&document.name)),
        content_type: TEXT_CONTENT_TYPE,
        bytes: text.into_bytes(),
    }
}

pub fn render_transcript(
    name: &str,
    generated: &str,
    messages: &[ChatMessage],
    settings: &ExportSettings,
) -> String {
    let mut ordered: Vec<&ChatMessage> = messages.iter().collect();
    ordered.sort_by_key(|m| m.timestamp);

    let body = ordered
        .iter()
        .map(|m| {
            format!(
                "[{}] {}:\n{}\n",
                format_timestamp(&m.timestamp, &settings.datetime_format),
                m.role.speaker(),
                m.content
            )
        })
        .collect::<Vec<_>>()
        .join(MESSAGE_SEPARATOR);

    format!("Chat History - {}\nGenerated: {}\n\n{}", name, generated, body)
}

/// Format with a user-supplied pattern, falling back to RFC 3339 when the
/// pattern is not valid strftime.
pub fn format_timestamp(timestamp: &DateTime<Utc>, pattern: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", timestamp.format(pattern)) {
        Ok(()) => out,
        Err(_) => timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}
