//! Error types for the Slidewright core library.
//!
//! Every fallible operation in the crate returns [`SlidewrightResult`]. Parser
//! failures are collapsed into [`SlidewrightError::GenerationFailed`] at the
//! orchestrator boundary; image failures are logged and never surfaced.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Generation | Model output parsing and slide generation errors |
//! | E2001-E2099 | Provider API | Model provider transport, auth and timeout errors |
//! | E3001-E3099 | Storage | Presentation store lookups and persistence errors |
//! | E4001-E4099 | Export | PPTX, JSON and transcript export errors |
//! | E5001-E5099 | Config | Environment, config file, and validation errors |
//! | E9001-E9099 | General | Internal, IO, serialization, and request errors |

use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// The main error type for the Slidewright core library.
#[derive(Debug, Error)]
pub enum SlidewrightError {
    // ========================================================================
    // Generation Errors (E1001-E1099)
    // ========================================================================
    /// The model reply contains no `{ ... }` object at all
    #[error("[E1001] No JSON object found in response")]
    NoJsonFound,

    /// The bracketed candidate is not valid JSON
    #[error("[E1002] Invalid JSON response from AI: {0}")]
    InvalidJson(String),

    /// The parsed object has no `slides` list
    #[error("[E1003] Response missing 'slides' array")]
    MissingSlidesField,

    /// A slide lacks a required field (strict mode only)
    #[error("[E1004] Slide {index} is missing required field '{field}'")]
    MissingSlideField { index: usize, field: String },

    /// One prompt-to-slides cycle failed
    #[error("[E1005] Failed to generate slides: {message}")]
    GenerationFailed {
        message: String,
        #[source]
        cause: Box<SlidewrightError>,
    },

    /// Image generation for a single slide failed
    #[error("[E1006] Image generation failed for slide {slide}: {message}")]
    ImageGenerationFailed { slide: usize, message: String },

    // ========================================================================
    // Provider API Errors (E2001-E2099)
    // ========================================================================
    /// API request failed
    #[error("[E2001] API request failed: {0}")]
    ApiRequestFailed(String),

    /// API response parse error
    #[error("[E2002] Failed to parse API response: {0}")]
    ApiParseError(String),

    /// API rate limit exceeded
    #[error("[E2003] API rate limit exceeded for {service}")]
    ApiRateLimitExceeded { service: String },

    /// API authentication failed
    #[error("[E2004] API authentication failed for {service}: {message}")]
    ApiAuthenticationFailed { service: String, message: String },

    /// A model call did not finish in time
    #[error("[E2005] Model request timed out after {0} seconds")]
    RequestTimeout(u64),

    // ========================================================================
    // Storage Errors (E3001-E3099)
    // ========================================================================
    /// Presentation not found
    #[error("[E3001] Presentation not found: {0}")]
    PresentationNotFound(String),

    /// Writing the presentation history failed
    #[error("[E3002] Failed to persist presentations: {0}")]
    StorageFailed(String),

    /// The presentation history on disk could not be decoded
    #[error("[E3003] Presentation history is corrupted: {0}")]
    StorageCorrupted(String),

    // ========================================================================
    // Export Errors (E4001-E4099)
    // ========================================================================
    /// Export failed
    #[error("[E4001] Export failed: {0}")]
    ExportFailed(String),

    /// A slide image is not a usable data URI
    #[error("[E4002] Invalid data URI: {0}")]
    InvalidDataUri(String),

    // ========================================================================
    // Configuration Errors (E5001-E5099)
    // ========================================================================
    /// Required environment variable is missing
    #[error("[E5001] Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// Configuration file parse error
    #[error("[E5002] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E5003] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// Configuration error (generic)
    #[error("[E5004] Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("[E9002] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("[E9003] Serialization error: {0}")]
    SerializationError(String),

    /// Request body could not be decoded
    #[error("[E9004] Invalid request: {0}")]
    InvalidRequest(String),
}

impl SlidewrightError {
    /// Wrap any failure of a generation cycle.
    pub fn generation_failed(cause: SlidewrightError) -> Self {
        SlidewrightError::GenerationFailed {
            message: cause.detail(),
            cause: Box::new(cause),
        }
    }

    /// The message without the `[Exxxx]` prefix.
    pub fn detail(&self) -> String {
        let full = self.to_string();
        match full.split_once("] ") {
            Some((code, rest)) if code.starts_with("[E") => rest.to_string(),
            _ => full,
        }
    }

    /// The innermost error of a `GenerationFailed` chain, or `self`.
    pub fn root_cause(&self) -> &SlidewrightError {
        match self {
            SlidewrightError::GenerationFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for Slidewright operations.
pub type SlidewrightResult<T> = Result<T, SlidewrightError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for SlidewrightError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SlidewrightError::ApiRequestFailed(format!("request timed out: {}", err))
        } else if err.is_status() {
            let service = err
                .url()
                .and_then(|u| u.host_str().map(|h| h.to_string()))
                .unwrap_or_else(|| "unknown".to_string());
            match err.status().map(|s| s.as_u16()) {
                Some(429) => SlidewrightError::ApiRateLimitExceeded { service },
                Some(401) | Some(403) => SlidewrightError::ApiAuthenticationFailed {
                    service,
                    message: err.to_string(),
                },
                _ => SlidewrightError::ApiRequestFailed(err.to_string()),
            }
        } else if err.is_decode() {
            SlidewrightError::ApiParseError(err.to_string())
        } else {
            SlidewrightError::ApiRequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SlidewrightError {
    fn from(err: serde_json::Error) -> Self {
        SlidewrightError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for SlidewrightError {
    fn from(err: std::io::Error) -> Self {
        SlidewrightError::IoError(err.to_string())
    }
}

impl From<zip::result::ZipError> for SlidewrightError {
    fn from(err: zip::result::ZipError) -> Self {
        SlidewrightError::ExportFailed(err.to_string())
    }
}

impl From<config::ConfigError> for SlidewrightError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => SlidewrightError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => SlidewrightError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => SlidewrightError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => SlidewrightError::ConfigParseError(err.to_string()),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl SlidewrightError {
    /// Returns true if this error comes from parsing model output.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            SlidewrightError::NoJsonFound
                | SlidewrightError::InvalidJson(_)
                | SlidewrightError::MissingSlidesField
                | SlidewrightError::MissingSlideField { .. }
        )
    }

    /// Returns true if this error is related to the model provider API.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            SlidewrightError::ApiRequestFailed(_)
                | SlidewrightError::ApiParseError(_)
                | SlidewrightError::ApiRateLimitExceeded { .. }
                | SlidewrightError::ApiAuthenticationFailed { .. }
                | SlidewrightError::RequestTimeout(_)
        )
    }

    /// Returns true if this error is related to configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SlidewrightError::MissingEnvVar(_)
                | SlidewrightError::ConfigParseError(_)
                | SlidewrightError::InvalidConfigValue { .. }
                | SlidewrightError::Config(_)
        )
    }

    /// Returns true if resubmitting the same request might succeed.
    ///
    /// Nothing in the crate retries on its own; this only feeds user hints.
    pub fn is_transient(&self) -> bool {
        match self {
            SlidewrightError::GenerationFailed { cause, .. } => cause.is_transient(),
            SlidewrightError::ApiRateLimitExceeded { .. }
            | SlidewrightError::RequestTimeout(_)
            | SlidewrightError::ImageGenerationFailed { .. } => true,
            // model output varies between calls
            other => other.is_parse_error(),
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            SlidewrightError::NoJsonFound => "E1001",
            SlidewrightError::InvalidJson(_) => "E1002",
            SlidewrightError::MissingSlidesField => "E1003",
            SlidewrightError::MissingSlideField { .. } => "E1004",
            SlidewrightError::GenerationFailed { .. } => "E1005",
            SlidewrightError::ImageGenerationFailed { .. } => "E1006",
            SlidewrightError::ApiRequestFailed(_) => "E2001",
            SlidewrightError::ApiParseError(_) => "E2002",
            SlidewrightError::ApiRateLimitExceeded { .. } => "E2003",
            SlidewrightError::ApiAuthenticationFailed { .. } => "E2004",
            SlidewrightError::RequestTimeout(_) => "E2005",
            SlidewrightError::PresentationNotFound(_) => "E3001",
            SlidewrightError::StorageFailed(_) => "E3002",
            SlidewrightError::StorageCorrupted(_) => "E3003",
            SlidewrightError::ExportFailed(_) => "E4001",
            SlidewrightError::InvalidDataUri(_) => "E4002",
            SlidewrightError::MissingEnvVar(_) => "E5001",
            SlidewrightError::ConfigParseError(_) => "E5002",
            SlidewrightError::InvalidConfigValue { .. } => "E5003",
            SlidewrightError::Config(_) => "E5004",
            SlidewrightError::Internal(_) => "E9001",
            SlidewrightError::IoError(_) => "E9002",
            SlidewrightError::SerializationError(_) => "E9003",
            SlidewrightError::InvalidRequest(_) => "E9004",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            SlidewrightError::GenerationFailed { cause, .. } => cause.user_suggestion(),
            SlidewrightError::MissingEnvVar(_) => {
                Some("Set GOOGLE_API_KEY in your environment or a .env file")
            }
            SlidewrightError::ApiAuthenticationFailed { .. } => {
                Some("Check your API key in the configuration")
            }
            SlidewrightError::ApiRateLimitExceeded { .. } => {
                Some("Wait for the rate limit to reset before submitting again")
            }
            SlidewrightError::RequestTimeout(_) => {
                Some("Increase generation.request_timeout_secs or try a smaller deck")
            }
            SlidewrightError::NoJsonFound
            | SlidewrightError::InvalidJson(_)
            | SlidewrightError::MissingSlidesField => {
                Some("The model returned an unexpected reply. Submit the prompt again")
            }
            SlidewrightError::PresentationNotFound(_) => {
                Some("Run 'slidewright presentations list' to see saved presentations")
            }
            SlidewrightError::StorageCorrupted(_) => {
                Some("A backup of the unreadable file was written next to it")
            }
            _ => None,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_transient() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Transient error occurred: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for CLI display with its suggestion.
pub struct CliErrorDisplay<'a> {
    error: &'a SlidewrightError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a SlidewrightError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                writeln!(f)?;
                writeln!(f, "  Suggestion: {}", suggestion)?;
            }
        }

        Ok(())
    }
}
