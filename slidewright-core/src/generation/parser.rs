//! Extraction of a slide list from a model's free-form reply.
//!
//! Models wrap their JSON in code fences, prose, or both. The parser strips
//! fences, takes the outermost `{ ... }` span, and accepts whatever slide
//! entries it finds there.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{SlidewrightError, SlidewrightResult};
use crate::models::Slide;

const RAW_PREVIEW_CHARS: usize = 200;

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSlideResponse {
    pub slides: Vec<Slide>,
    pub message: Option<String>,
    /// Top-level keys other than `slides` and `message`.
    pub extra: Map<String, Value>,
}

pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
}

/// The inclusive span from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

pub fn parse_slide_response(raw: &str) -> SlidewrightResult<ParsedSlideResponse> {
    debug!(
        preview = %raw.chars().take(RAW_PREVIEW_CHARS).collect::<String>(),
        len = raw.len(),
        "Parsing model reply"
    );

    let cleaned = strip_code_fences(raw);
    let candidate = extract_json_object(&cleaned).ok_or(SlidewrightError::NoJsonFound)?;

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| SlidewrightError::InvalidJson(e.to_string()))?;

    let mut root = match value {
        Value::Object(map) => map,
        _ => return Err(SlidewrightError::MissingSlidesField),
    };

    let entries = match root.remove("slides") {
        Some(Value::Array(entries)) => entries,
        _ => return Err(SlidewrightError::MissingSlidesField),
    };

    let slides = entries
        .into_iter()
        .map(slide_from_value)
        .collect::<SlidewrightResult<Vec<_>>>()?;

    let message = match root.remove("message") {
        Some(Value::String(m)) => Some(m),
        Some(other) => {
            root.insert("message".to_string(), other);
            None
        }
        None => None,
    };

    Ok(ParsedSlideResponse {
        slides,
        message,
        extra: root,
    })
}

fn slide_from_value(value: Value) -> SlidewrightResult<Slide> {
    let mut slide = match value {
        Value::Object(_) => serde_json::from_value::<Slide>(value)
            .map_err(|e| SlidewrightError::InvalidJson(e.to_string()))?,
        Value::String(text) => Slide::new("", text),
        Value::Null => Slide::default(),
        other => Slide::new("", other.to_string()),
    };

    if slide.image_url.is_some() && !slide.has_image() {
        slide.image_url = None;
    }

    Ok(slide)
}

/// Reject slides missing a title or body their layout calls for.
pub fn validate_slide_fields(slides: &[Slide]) -> SlidewrightResult<()> {
    for (index, slide) in slides.iter().enumerate() {
        if slide.layout.has_title() && slide.title.trim().is_empty() {
            return Err(SlidewrightError::MissingSlideField {
                index,
                field: "title".to_string(),
            });
        }
        if slide.layout.has_body() && slide.content.trim().is_empty() {
            return Err(SlidewrightError::MissingSlideField {
                index,
                field: "content".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlideLayout;

    #[test]
    fn test_plain_json() {
        let raw = r#"{"slides":[{"title":"A","content":"B","layout":"title-content"}]}"#;
        let parsed = parse_slide_response(raw).unwrap();
        assert_eq!(parsed.slides.len(), 1);
        assert_eq!(parsed.slides[0].title, "A");
        assert_eq!(parsed.slides[0].content, "B");
        assert!(parsed.message.is_none());
    }

    #[test]
    fn test_fenced_json_with_prose() {
        let raw = "Sure! Here is your deck:\n```json\n{\"slides\":[{\"title\":\"X\",\"content\":\"Y\",\"layout\":\"title-only\"}],\"message\":\"Enjoy\"}\n```\nLet me know.";
        let parsed = parse_slide_response(raw).unwrap();
        assert_eq!(parsed.slides[0].layout, SlideLayout::TitleOnly);
        assert_eq!(parsed.message.as_deref(), Some("Enjoy"));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}\n");
        assert_eq!(strip_code_fences("```json{}```"), "{}");
        assert_eq!(strip_code_fences("```\n{}```\n"), "{}");
    }

    #[test]
    fn test_no_json_found() {
        assert!(matches!(
            parse_slide_response("I cannot help with that."),
            Err(SlidewrightError::NoJsonFound)
        ));
        assert!(matches!(
            parse_slide_response("only an opening {"),
            Err(SlidewrightError::NoJsonFound)
        ));
        assert!(matches!(
            parse_slide_response("} reversed {"),
            Err(SlidewrightError::NoJsonFound)
        ));
    }

    #[test]
    fn test_invalid_json_carries_reason() {
        match parse_slide_response("{slides: [}") {
            Err(SlidewrightError::InvalidJson(msg)) => assert!(msg.contains("key must be a string")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_slides() {
        for raw in [
            r#"{"message":"hi"}"#,
            r#"{"slides":null}"#,
            r#"{"slides":"three"}"#,
            r#"{"slides":{"title":"x"}}"#,
        ] {
            assert!(
                matches!(
                    parse_slide_response(raw),
                    Err(SlidewrightError::MissingSlidesField)
                ),
                "expected MissingSlidesField for {}",
                raw
            );
        }
    }

    #[test]
    fn test_empty_slides_is_ok() {
        let parsed = parse_slide_response(r#"{"slides":[]}"#).unwrap();
        assert!(parsed.slides.is_empty());
    }

    #[test]
    fn test_extra_top_level_keys_kept() {
        let parsed =
            parse_slide_response(r#"{"slides":[],"theme":"dark","message":7}"#).unwrap();
        assert_eq!(parsed.extra["theme"], "dark");
        assert_eq!(parsed.extra["message"], 7);
        assert!(parsed.message.is_none());
    }

    #[test]
    fn test_non_object_entries() {
        let parsed = parse_slide_response(r#"{"slides":["just text", null, 12]}"#).unwrap();
        assert_eq!(parsed.slides.len(), 3);
        assert_eq!(parsed.slides[0].content, "just text");
        assert_eq!(parsed.slides[1], Slide::default());
        assert_eq!(parsed.slides[2].content, "12");
    }

    #[test]
    fn test_non_data_image_url_dropped() {
        let parsed = parse_slide_response(
            r#"{"slides":[
                {"title":"a","imageUrl":"https://example.com/a.png"},
                {"title":"b","imageUrl":"data:image/png;base64,AAAA"}
            ]}"#,
        )
        .unwrap();
        assert!(parsed.slides[0].image_url.is_none());
        assert_eq!(
            parsed.slides[1].image_url.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn test_validate_slide_fields() {
        let ok = vec![
            Slide::new("Title", "Body"),
            Slide::new("Only title", "").with_layout(SlideLayout::TitleOnly),
            Slide::new("", "Only body").with_layout(SlideLayout::ContentOnly),
        ];
        assert!(validate_slide_fields(&ok).is_ok());

        let bad = vec![Slide::new("Title", "Body"), Slide::new(" ", "Body")];
        match validate_slide_fields(&bad) {
            Err(SlidewrightError::MissingSlideField { index, field }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "title");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
