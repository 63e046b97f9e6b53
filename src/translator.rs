//! Translation engine: ties the lookups together and rewrites the document.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::config::TranslatorConfig;
use crate::error::TranslateError;
use crate::intersect::{intersect, TranslationTable};
use crate::langlinks::{get_langlinks, strip_namespaces, LanglinkTable};
use crate::language::LanguageCode;
use crate::mappings::{fetch_template_mappings, TemplateMappings};
use crate::markup::{Markup, ParamNode, TemplateNode};
use crate::mediawiki::QueryApi;
use crate::text::respell;
use crate::wikitext::Document;

/// Private-use code point bracketing every name that could not be translated.
pub const MARKER: char = '\u{e0ff}';

const TEMPLATE_NAMESPACE: &str = "Template";

/// Why a template or parameter kept its original name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IgnoreReason {
    /// No registry mapping for the template (or, for a parameter, no
    /// unambiguous counterpart in the target mapping).
    #[serde(rename = "mapping not found")]
    MappingNotFound,
    /// Registry mapping exists but the template has no langlink.
    #[serde(rename = "langlink not found")]
    LanglinkNotFound,
    /// Langlinked target template has no registry mapping.
    #[serde(rename = "target mapping not found")]
    TargetMappingNotFound,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::MappingNotFound => "mapping not found",
            IgnoreReason::LanglinkNotFound => "langlink not found",
            IgnoreReason::TargetMappingNotFound => "target mapping not found",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translated text plus everything that was left untranslated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationReport {
    pub wikitext: String,
    pub ignored_templates: BTreeMap<String, IgnoreReason>,
    /// Keyed by source template name, then parameter name.
    pub ignored_parameters: BTreeMap<String, BTreeMap<String, IgnoreReason>>,
}

impl TranslationReport {
    pub fn is_complete(&self) -> bool {
        self.ignored_templates.is_empty() && self.ignored_parameters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOutcome {
    pub report: TranslationReport,
    /// False when markers were not requested or the input already contained
    /// [`MARKER`].
    pub marker_used: bool,
    pub marker: char,
}

impl TranslateOutcome {
    /// Text split on the marker. With markers in use, odd-indexed segments are
    /// the untranslated names; otherwise the whole text is one segment.
    pub fn segments(&self) -> Vec<&str> {
        if self.marker_used {
            self.report.wikitext.split(self.marker).collect()
        } else {
            vec![self.report.wikitext.as_str()]
        }
    }
}

/// Everything looked up for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTables {
    pub langlinks: LanglinkTable,
    pub source: TemplateMappings,
    pub target: TemplateMappings,
    pub translation: TranslationTable,
}

impl MappingTables {
    pub fn new(langlinks: LanglinkTable, source: TemplateMappings, target: TemplateMappings) -> Self {
        let translation = intersect(&source, &target, &langlinks);
        MappingTables {
            langlinks,
            source,
            target,
            translation,
        }
    }

    fn template_reason(&self, name: &str) -> IgnoreReason {
        if !self.source.contains_key(name) {
            IgnoreReason::MappingNotFound
        } else if !self.langlinks.contains_key(name) {
            IgnoreReason::LanglinkNotFound
        } else {
            IgnoreReason::TargetMappingNotFound
        }
    }
}

pub struct Translator<A> {
    api: A,
    config: TranslatorConfig,
}

impl<A: QueryApi> Translator<A> {
    pub fn new(api: A, config: TranslatorConfig) -> Self {
        Translator { api, config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate template and parameter names in `wikitext` from `from` to `to`.
    ///
    /// Costs at most two API requests regardless of document size. Transport
    /// and response-shape failures are returned as-is; unknown templates and
    /// parameters only show up in the report.
    pub fn translate(
        &self,
        wikitext: &str,
        from: &LanguageCode,
        to: &LanguageCode,
        allow_marker: bool,
    ) -> Result<TranslateOutcome, TranslateError> {
        let span = info_span!("translate", %from, %to);
        let _enter = span.enter();

        let marker_used = allow_marker && !wikitext.contains(MARKER);
        let mut document = Document::parse(wikitext);
        let tables = self.lookup(&document, from, to)?;
        let report = rewrite(&mut document, &tables, marker_used.then_some(MARKER));

        info!(
            ignored_templates = report.ignored_templates.len(),
            ignored_parameters = report.ignored_parameters.values().map(BTreeMap::len).sum::<usize>(),
            marker_used,
            "translation finished"
        );
        Ok(TranslateOutcome {
            report,
            marker_used,
            marker: MARKER,
        })
    }

    /// Resolve langlinks, then registry mappings for both languages.
    pub fn lookup<M: Markup>(
        &self,
        document: &M,
        from: &LanguageCode,
        to: &LanguageCode,
    ) -> Result<MappingTables, TranslateError> {
        let names = template_names(document);
        let titles: Vec<String> = names
            .iter()
            .map(|name| format!("{TEMPLATE_NAMESPACE}:{name}"))
            .collect();
        debug!(templates = titles.len(), "templates collected");

        let endpoint = self.config.wikipedia_endpoint(from);
        let raw_links = get_langlinks(&self.api, &endpoint, &titles, to)?;
        let langlinks = strip_namespaces(&raw_links);
        debug!(langlinks = langlinks.len(), "langlinks resolved");

        // Document names too, so "langlink not found" stays distinguishable
        // from "mapping not found".
        let mut source_names = names;
        source_names.extend(langlinks.keys().cloned());
        let target_names: BTreeSet<String> = langlinks.values().cloned().collect();
        let (source, target) = fetch_template_mappings(
            &self.api,
            &self.config.mapping_api,
            from,
            to,
            &source_names,
            &target_names,
        )?;

        Ok(MappingTables::new(langlinks, source, target))
    }
}

/// Distinct non-empty trimmed template names.
pub fn template_names<M: Markup>(document: &M) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    document.visit_templates(&mut |template| {
        let name = template.name().trim();
        if !name.is_empty() {
            names.insert(name.to_string());
        }
    });
    names
}

/// Rename every translatable template and parameter in place and report the
/// rest. With a marker, untranslated names are wrapped in it.
pub fn rewrite<M: Markup>(document: &mut M, tables: &MappingTables, marker: Option<char>) -> TranslationReport {
    let marker = marker.map(String::from).unwrap_or_default();
    let mut ignored_templates = BTreeMap::new();
    let mut ignored_parameters: BTreeMap<String, BTreeMap<String, IgnoreReason>> = BTreeMap::new();

    document.visit_templates_mut(&mut |template| {
        let name = template.name().trim().to_string();
        let mapped = tables.translation.get(&name);
        let linked = tables.langlinks.get(&name);

        let (Some(fields), Some(linked)) = (mapped, linked) else {
            if let Some(marked) = mark(template.name(), &marker) {
                template.set_name(marked);
            }
            ignored_templates.insert(name.clone(), tables.template_reason(&name));
            return;
        };

        let renamed = respell(template.name(), Some(linked.as_str()), "");
        template.set_name(renamed);
        // Walk backwards: a positional parameter may only gain a key when no
        // positional parameter after it stays positional, or those would shift.
        let mut positional_after = false;
        for param in template.params_mut().iter_mut().rev() {
            let param_name = param.name().trim().to_string();
            match fields.get(&param_name) {
                Some(target_param) => {
                    let renamed = respell(param.name(), Some(target_param.as_str()), "");
                    param.set_name(renamed);
                    if param.is_positional() && !positional_after {
                        param.show_key();
                    }
                }
                None => {
                    // positional names are invisible, nothing to wrap
                    if !param.is_positional() {
                        if let Some(marked) = mark(param.name(), &marker) {
                            param.set_name(marked);
                        }
                    }
                    ignored_parameters
                        .entry(name.clone())
                        .or_default()
                        .insert(param_name, IgnoreReason::MappingNotFound);
                }
            }
            positional_after |= param.is_positional();
        }
    });

    TranslationReport {
        wikitext: document.to_string(),
        ignored_templates,
        ignored_parameters,
    }
}

fn mark(raw: &str, marker: &str) -> Option<String> {
    (!marker.is_empty()).then(|| respell(raw, None, marker))
}
