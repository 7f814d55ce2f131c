use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::{SlidewrightError, SlidewrightResult};
use crate::models::Slide;

use super::traits::{ContentGenerator, ContentRequest};

pub const IMAGE_PROMPT_PREFIX: &str = "Generate an image for this slide: ";

/// Fills in `image_url` for every slide that asks for an image.
///
/// Calls run concurrently and each one is independent: a failed or empty
/// reply leaves the slide as the parser produced it and is only logged.
pub struct ImageAugmenter {
    generator: Arc<dyn ContentGenerator>,
    model: String,
    timeout: Duration,
}

impl ImageAugmenter {
    pub fn new(generator: Arc<dyn ContentGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn augment(&self, slides: Vec<Slide>) -> Vec<Slide> {
        let requested = slides.iter().filter(|s| s.wants_image().is_some()).count();
        if requested == 0 {
            return slides;
        }

        info!("Generating images for {} of {} slides", requested, slides.len());

        let tasks = slides
            .into_iter()
            .enumerate()
            .map(|(index, slide)| self.augment_slide(index, slide));
        let slides = join_all(tasks).await;

        let generated = slides.iter().filter(|s| s.image_url.is_some()).count();
        info!("Image generation finished: {}/{} succeeded", generated, requested);

        slides
    }

    async fn augment_slide(&self, index: usize, mut slide: Slide) -> Slide {
        let prompt = match slide.wants_image() {
            Some(prompt) => prompt.to_string(),
            None => return slide,
        };

        match self.generate_image(index, &prompt).await {
            Ok(Some(uri)) => slide.image_url = Some(uri),
            Ok(None) => debug!(slide = index, "Model returned no image part"),
            Err(e) => {
                warn!(
                    slide = index,
                    error_code = %e.error_code(),
                    "Image generation failed: {}",
                    e
                );
            }
        }

        slide
    }

    async fn generate_image(&self, index: usize, prompt: &str) -> SlidewrightResult<Option<String>> {
        let request = ContentRequest::image(
            self.model.clone(),
            format!("{}{}", IMAGE_PROMPT_PREFIX, prompt),
        );

        let content = tokio::time::timeout(self.timeout, self.generator.generate_content(&request))
            .await
            .map_err(|_| SlidewrightError::RequestTimeout(self.timeout.as_secs()))?
            .map_err(|e| SlidewrightError::ImageGenerationFailed {
                slide: index,
                message: e.detail(),
            })?;

        Ok(content.first_image())
    }
}
