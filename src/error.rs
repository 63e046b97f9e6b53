//! Error type shared by every stage of the translation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a translation.
///
/// Missing langlinks or registry mappings are not errors; they end up in the
/// [`TranslationReport`](crate::TranslationReport) instead.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Transport failure or non-success HTTP status.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with something that is not the expected JSON shape.
    #[error("malformed api response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API answered with an `error` object.
    #[error("api error {code}: {info}")]
    Api { code: String, info: String },

    #[error("invalid language code: {0:?}")]
    InvalidLanguage(String),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

impl TranslateError {
    /// Stable category name, safe to show to end users.
    pub fn kind(&self) -> &'static str {
        match self {
            TranslateError::Http(_) => "HttpError",
            TranslateError::Decode(_) => "DecodeError",
            TranslateError::Api { .. } => "ApiError",
            TranslateError::InvalidLanguage(_) => "InvalidLanguage",
            TranslateError::ConfigIo { .. } | TranslateError::ConfigParse(_) => "ConfigError",
        }
    }
}
