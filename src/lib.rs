//! Translate wikitext template and parameter names between language editions.
//!
//! Template equivalences come from the encyclopedia's langlinks; parameter
//! equivalences come from a mapping registry that ties each template parameter
//! to an ontology field. Parameters that share an ontology field across the
//! two languages are renamed; everything else is reported.
//!
//! ```no_run
//! use template_translator::{HttpQueryApi, LanguageCode, Translator, TranslatorConfig};
//!
//! # fn main() -> Result<(), template_translator::TranslateError> {
//! let config = TranslatorConfig::default();
//! let translator = Translator::new(HttpQueryApi::new(&config)?, config);
//! let outcome = translator.translate(
//!     "{{Infobox person|name=Ada}}",
//!     &LanguageCode::new("en")?,
//!     &LanguageCode::new("it")?,
//!     false,
//! )?;
//! println!("{}", outcome.report.wikitext);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod intersect;
pub mod langlinks;
pub mod language;
pub mod logging;
pub mod mappings;
pub mod markup;
pub mod mediawiki;
pub mod text;
pub mod translator;
pub mod wikitext;

pub use config::TranslatorConfig;
pub use error::TranslateError;
pub use language::LanguageCode;
pub use mediawiki::{HttpQueryApi, QueryApi};
pub use translator::{IgnoreReason, TranslateOutcome, TranslationReport, Translator, MARKER};
