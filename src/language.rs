use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::TranslateError;

lazy_static! {
    // Wiki subdomain codes: "en", "simple", "be-x-old", "zh-min-nan"
    static ref LANGUAGE_CODE: Regex = Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*$").unwrap();
}

/// Validated wiki language code. It ends up inside endpoint hostnames and
/// registry page titles, so arbitrary text is never accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: &str) -> Result<Self, TranslateError> {
        let code = code.trim();
        if LANGUAGE_CODE.is_match(code) {
            Ok(LanguageCode(code.to_string()))
        } else {
            Err(TranslateError::InvalidLanguage(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for LanguageCode {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageCode::new(s)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_wiki_subdomains() {
        for code in ["en", "it", "simple", "be-x-old", "zh-min-nan", "bat-smg"] {
            assert_eq!(LanguageCode::new(code).unwrap().as_str(), code);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(LanguageCode::new(" fr\n").unwrap().as_str(), "fr");
    }

    #[test]
    fn rejects_hostile_codes() {
        for code in ["", "EN", "en.evil.com/", "en/../x", "-en", "en-", "1en", "en us"] {
            assert!(LanguageCode::new(code).is_err(), "{code:?} accepted");
        }
    }
}
