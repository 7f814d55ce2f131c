#![allow(
    clippy::needless_borrows_for_generic_args,
    clippy::manual_range_contains,
    clippy::derivable_impls,
    clippy::type_complexity
)]

//! Prompt-to-slide-deck generation.
//!
//! A prompt goes to a generative model, the reply is parsed into [`Slide`]s,
//! slides that ask for one get an image, and the resulting decks can be
//! stored as [`Presentation`]s and exported as PPTX, JSON or a chat
//! transcript.

pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod http;
pub mod models;
pub mod repo;

pub use config::{
    get_config_dir, get_data_dir, ConfigLoadError, ExportConfig, GenerationConfig, LoggingConfig,
    ServerConfig, SlidewrightConfig, StorageConfig,
};
pub use error::{CliErrorDisplay, SlidewrightError, SlidewrightResult};
pub use export::{
    export, export_chat, export_json, export_pptx, sanitize_filename, ExportArtifact,
    ExportDocument, ExportFormat, ExportSettings, JsonExport, PptxWriter,
    DEFAULT_PRESENTATION_NAME,
};
pub use generation::{
    normalize_slide_count, parse_slide_response, validate_slide_fields, ContentGenerator,
    ContentPart, ContentRequest, GeminiClient, GenerateSlidesRequest, GenerateSlidesResponse,
    GeneratedContent, ImageAugmenter, InlineData, ParsedSlideResponse, SlideGenerator,
    DEFAULT_SUCCESS_MESSAGE, FALLBACK_ERROR_MESSAGE,
};
pub use http::{router, serve, serve_with_listener, AppState};
pub use models::{ChatMessage, MessageRole, Presentation, PresentationUpdate, Slide, SlideLayout};
pub use repo::{
    open_store, FilePresentationStore, InMemoryPresentationStore, PresentationStore, STORAGE_KEY,
};
