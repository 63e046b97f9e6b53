use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::TranslateError;
use crate::language::LanguageCode;

pub const DEFAULT_WIKIPEDIA_API: &str = "https://{lang}.wikipedia.org/w/api.php";
pub const DEFAULT_MAPPING_API: &str = "http://mappings.dbpedia.org/api.php";
pub const DEFAULT_USER_AGENT: &str = concat!("template-translator/", env!("CARGO_PKG_VERSION"));

/// Endpoints and client settings, optionally loaded from YAML.
///
/// ```yaml
/// wikipedia_api: "https://{lang}.wikipedia.org/w/api.php"
/// mapping_api: "http://mappings.dbpedia.org/api.php"
/// user_agent: "my-bot/1.0 (ops@example.org)"
/// timeout_secs: 20
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorConfig {
    /// Encyclopedia query API; `{lang}` is replaced by the language code.
    pub wikipedia_api: String,
    /// Mapping registry query API.
    pub mapping_api: String,
    pub user_agent: String,
    /// Whole-request timeout. `None` keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            wikipedia_api: DEFAULT_WIKIPEDIA_API.to_string(),
            mapping_api: DEFAULT_MAPPING_API.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

impl TranslatorConfig {
    pub fn load(path: &Path) -> Result<Self, TranslateError> {
        let contents = fs::read_to_string(path).map_err(|source| TranslateError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, TranslateError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Query endpoint of the encyclopedia edition for `lang`.
    pub fn wikipedia_endpoint(&self, lang: &LanguageCode) -> String {
        self.wikipedia_api.replace("{lang}", lang.as_str())
    }
}
