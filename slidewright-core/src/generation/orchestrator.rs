use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::config::SlidewrightConfig;
use crate::error::{SlidewrightError, SlidewrightResult};
use crate::models::Slide;

use super::images::ImageAugmenter;
use super::parser::{parse_slide_response, validate_slide_fields};
use super::traits::{ContentGenerator, ContentRequest};

pub const DEFAULT_SLIDE_COUNT: u32 = 5;
pub const MAX_SLIDE_COUNT: u32 = 20;
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Slides generated successfully!";
/// Shown to the user in place of a reply when a generation cycle fails.
pub const FALLBACK_ERROR_MESSAGE: &str =
    "Sorry, there was an error generating the slides. Please try again.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSlidesRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub previous_slides: Option<Vec<Slide>>,
    /// Kept loose: clients send numbers, numeric strings or nothing.
    #[serde(default)]
    pub slide_count: Value,
}

impl GenerateSlidesRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_slide_count(mut self, count: u32) -> Self {
        self.slide_count = Value::from(count);
        self
    }

    pub fn with_previous_slides(mut self, slides: Vec<Slide>) -> Self {
        self.previous_slides = Some(slides);
        self
    }

    fn has_previous_slides(&self) -> bool {
        self.previous_slides.as_ref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateSlidesResponse {
    pub slides: Vec<Slide>,
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads a slide count the way a lenient form field would: leading integer
/// digits win, anything unusable falls back to the default.
pub fn normalize_slide_count(value: &Value) -> u32 {
    let parsed: Option<i64> = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    };

    match parsed {
        Some(n) if n > 0 => n.min(MAX_SLIDE_COUNT as i64) as u32,
        _ => DEFAULT_SLIDE_COUNT,
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // saturate absurdly long digit runs instead of failing
    let n = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * n)
}

pub fn build_instruction(slide_count: u32, has_previous_slides: bool) -> String {
    let continuation = if has_previous_slides {
        "Previous slides exist. Consider the context and update/expand appropriately."
    } else {
        ""
    };

    format!(
        r#"You are an expert presentation designer. Generate PowerPoint slide content based on user requests.
    
Return ONLY a valid JSON object with this exact structure (no markdown, no code blocks, just pure JSON):
{{
  "slides": [
    {{
      "title": "Slide Title",
      "content": "Slide content/bullet points",
      "layout": "title-content",
      "imagePrompt": "A detailed description for an AI-generated image (optional)"
    }}
  ],
  "message": "Brief confirmation message"
}}

Create exactly {} slides that are professional, well-structured, and visually appealing.
For each slide, include an imagePrompt if a visual would enhance the content.
{}"#,
        slide_count, continuation
    )
}

/// Runs one prompt-to-slides cycle: model call, parse, then image fan-out.
pub struct SlideGenerator {
    generator: Arc<dyn ContentGenerator>,
    text_model: String,
    augmenter: Option<ImageAugmenter>,
    require_slide_fields: bool,
    timeout: Duration,
}

impl SlideGenerator {
    pub fn new(generator: Arc<dyn ContentGenerator>, text_model: impl Into<String>) -> Self {
        Self {
            generator,
            text_model: text_model.into(),
            augmenter: None,
            require_slide_fields: false,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(generator: Arc<dyn ContentGenerator>, config: &SlidewrightConfig) -> Self {
        let timeout = config.request_timeout();
        let augmenter = config.generation.generate_images.then(|| {
            ImageAugmenter::new(generator.clone(), config.generation.image_model.clone())
                .with_timeout(timeout)
        });

        Self {
            generator,
            text_model: config.generation.text_model.clone(),
            augmenter,
            require_slide_fields: config.generation.require_slide_fields,
            timeout,
        }
    }

    pub fn with_images(mut self, image_model: impl Into<String>) -> Self {
        self.augmenter =
            Some(ImageAugmenter::new(self.generator.clone(), image_model).with_timeout(self.timeout));
        self
    }

    pub fn with_strict_fields(mut self, strict: bool) -> Self {
        self.require_slide_fields = strict;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.augmenter = self.augmenter.map(|a| a.with_timeout(timeout));
        self
    }

    pub fn provider_name(&self) -> &str {
        self.generator.provider_name()
    }

    #[instrument(skip(self, request), fields(provider = %self.generator.provider_name()))]
    pub async fn generate(
        &self,
        request: &GenerateSlidesRequest,
    ) -> SlidewrightResult<GenerateSlidesResponse> {
        self.run(request)
            .await
            .map_err(SlidewrightError::generation_failed)
    }

    async fn run(&self, request: &GenerateSlidesRequest) -> SlidewrightResult<GenerateSlidesResponse> {
        let slide_count = normalize_slide_count(&request.slide_count);
        info!(slide_count, "Generating slides");

        let prompt = format!(
            "{}\n\nUser request: {}",
            build_instruction(slide_count, request.has_previous_slides()),
            request.prompt
        );

        let content = tokio::time::timeout(
            self.timeout,
            self.generator
                .generate_content(&ContentRequest::text(self.text_model.clone(), prompt)),
        )
        .await
        .map_err(|_| SlidewrightError::RequestTimeout(self.timeout.as_secs()))??;

        let parsed = parse_slide_response(&content.text())?;

        if self.require_slide_fields {
            validate_slide_fields(&parsed.slides)?;
        }

        let slides = match &self.augmenter {
            Some(augmenter) => augmenter.augment(parsed.slides).await,
            None => parsed.slides,
        };

        info!("Generated {} slides", slides.len());

        // a non-string `message` would collide with the one we always send
        let mut extra = parsed.extra;
        extra.remove("message");

        Ok(GenerateSlidesResponse {
            slides,
            message: parsed
                .message
                .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
            extra,
        })
    }
}
