pub mod gemini;
pub mod images;
pub mod orchestrator;
pub mod parser;
pub mod traits;

pub use gemini::GeminiClient;
pub use images::{ImageAugmenter, IMAGE_PROMPT_PREFIX};
pub use orchestrator::{
    build_instruction, normalize_slide_count, GenerateSlidesRequest, GenerateSlidesResponse,
    SlideGenerator, DEFAULT_SLIDE_COUNT, DEFAULT_SUCCESS_MESSAGE, FALLBACK_ERROR_MESSAGE,
    MAX_SLIDE_COUNT,
};
pub use parser::{
    extract_json_object, parse_slide_response, strip_code_fences, validate_slide_fields,
    ParsedSlideResponse,
};
pub use traits::{ContentGenerator, ContentPart, ContentRequest, GeneratedContent, InlineData};
