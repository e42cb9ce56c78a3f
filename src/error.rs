use thiserror::Error;

/// Why a call to the AI service produced no usable result.
///
/// The conversation controller does not distinguish between these; every
/// variant resolves to the same fallback content. The variants exist for logs.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no API key configured; set GEMINI_API_KEY or run `sparkle config --set-api-key`")]
    MissingApiKey,

    #[error("request to the AI service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI service response is missing {0}")]
    Malformed(&'static str),

    #[error("image payload is not inline base64 data")]
    InvalidImage,
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
