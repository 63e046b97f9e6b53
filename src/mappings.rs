//! Per-template field mappings from the mapping registry.
//!
//! Registry pages are titled `Mapping <lang>:<template>` and hold a single
//! `TemplateMapping` whose `mappings` field lists `PropertyMapping` entries:
//!
//! ```text
//! {{TemplateMapping
//! | mapToClass = Person
//! | mappings =
//!     {{PropertyMapping | templateProperty = name | ontologyProperty = foaf:name }}
//!     {{PropertyMapping | templateProperty = birth_date | ontologyProperty = birthDate }}
//! }}
//! ```

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::TranslateError;
use crate::language::LanguageCode;
use crate::mediawiki::{get_page_contents, QueryApi};
use crate::wikitext::{Document, Template};

const CONTAINER: &str = "TemplateMapping";
const CONTAINER_FIELD: &str = "mappings";
const ENTRY: &str = "PropertyMapping";
const TEMPLATE_PROPERTY: &str = "templateProperty";
const ONTOLOGY_PROPERTY: &str = "ontologyProperty";

/// Template parameter name -> ontology field.
pub type FieldMapping = BTreeMap<String, String>;

/// Template name -> its field mapping, for one language.
pub type TemplateMappings = BTreeMap<String, FieldMapping>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

/// Fetch registry mappings for `source_names` in `from` and `target_names` in
/// `to` with a single request.
///
/// Returns `(source, target)`. Templates without a registry page get no entry.
pub fn fetch_template_mappings<A: QueryApi + ?Sized>(
    api: &A,
    endpoint: &str,
    from: &LanguageCode,
    to: &LanguageCode,
    source_names: &BTreeSet<String>,
    target_names: &BTreeSet<String>,
) -> Result<(TemplateMappings, TemplateMappings), TranslateError> {
    // Same title can serve both sides when from == to.
    let mut wanted: BTreeMap<String, Vec<(Side, &str)>> = BTreeMap::new();
    let requests = [(Side::Source, from, source_names), (Side::Target, to, target_names)];
    for (side, lang, names) in requests {
        for name in names {
            wanted
                .entry(registry_title(lang, name))
                .or_default()
                .push((side, name.as_str()));
        }
    }

    let titles: Vec<String> = wanted.keys().cloned().collect();
    let pages = get_page_contents(api, endpoint, &titles)?;

    let mut source = TemplateMappings::new();
    let mut target = TemplateMappings::new();
    for (title, content) in &pages {
        let Some(owners) = wanted.get(title) else {
            continue;
        };
        let fields = parse_mapping_page(content);
        for (side, name) in owners {
            let table = match side {
                Side::Source => &mut source,
                Side::Target => &mut target,
            };
            table.insert(name.to_string(), fields.clone());
        }
    }
    debug!(
        requested = titles.len(),
        source = source.len(),
        target = target.len(),
        "registry mappings fetched"
    );
    Ok((source, target))
}

pub fn registry_title(lang: &LanguageCode, template: &str) -> String {
    format!("Mapping {lang}:{template}")
}

/// Extract `templateProperty -> ontologyProperty` pairs from a registry page.
///
/// A page with more than one `TemplateMapping` is ambiguous and yields
/// nothing.
pub fn parse_mapping_page(wikitext: &str) -> FieldMapping {
    let document = Document::parse(wikitext);
    let containers: Vec<&Template> = document
        .templates()
        .into_iter()
        .filter(|template| template.is_named(CONTAINER))
        .collect();

    let [container] = containers.as_slice() else {
        return FieldMapping::new();
    };
    let Some(entries) = container.get(CONTAINER_FIELD) else {
        return FieldMapping::new();
    };

    entries
        .templates()
        .into_iter()
        .filter(|entry| entry.is_named(ENTRY))
        .filter_map(parse_property_mapping)
        .collect()
}

/// A `PropertyMapping` counts only when it has exactly its two fields.
fn parse_property_mapping(entry: &Template) -> Option<(String, String)> {
    if entry.params().len() != 2 {
        return None;
    }
    let template_property = entry.get(TEMPLATE_PROPERTY)?;
    let ontology_property = entry.get(ONTOLOGY_PROPERTY)?;
    Some((
        template_property.value_text().trim().to_string(),
        ontology_property.value_text().trim().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediawiki::testing::CannedApi;
    use serde_json::json;

    const PERSON: &str = "{{TemplateMapping
| mapToClass = Person
| mappings =
    {{PropertyMapping | templateProperty = name | ontologyProperty = foaf:name }}
    {{ propertyMapping | templateProperty = birth_date | ontologyProperty = birthDate }}
    {{DateIntervalMapping | templateProperty = years | startDateOntologyProperty = activeYearsStartDate | endDateOntologyProperty = activeYearsEndDate }}
    {{PropertyMapping | templateProperty = spouse | ontologyProperty = spouse | unit = x }}
}}";

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::new(code).unwrap()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // ─────────────────────────────────────────────────────────────
    // parse_mapping_page
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn extracts_two_field_property_mappings() {
        let fields = parse_mapping_page(PERSON);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["name"], "foaf:name");
        assert_eq!(fields["birth_date"], "birthDate");
    }

    #[test]
    fn container_first_letter_is_case_insensitive() {
        let page = "{{ templateMapping | mappings = {{PropertyMapping|templateProperty=a|ontologyProperty=b}} }}";
        assert_eq!(parse_mapping_page(page)["a"], "b");
    }

    #[test]
    fn duplicate_container_discards_page() {
        let page = format!("{PERSON}\n{PERSON}");
        assert!(parse_mapping_page(&page).is_empty());
    }

    #[test]
    fn nested_container_counts_as_duplicate() {
        let page = "{{TemplateMapping|mappings={{PropertyMapping|templateProperty=a|ontologyProperty=b}}\
                    {{ConditionalMapping|cases={{TemplateMapping}}}}}}";
        assert!(parse_mapping_page(page).is_empty());
    }

    #[test]
    fn entries_found_inside_conditional_mappings() {
        let page = "{{TemplateMapping|mappings=\
                    {{ConditionalMapping|cases={{Condition|mapping={{PropertyMapping|templateProperty=x|ontologyProperty=y}}}}}}}}";
        assert_eq!(parse_mapping_page(page)["x"], "y");
    }

    #[test]
    fn missing_mappings_field() {
        assert!(parse_mapping_page("{{TemplateMapping|mapToClass=Place}}").is_empty());
        assert!(parse_mapping_page("no registry markup here").is_empty());
    }

    #[test]
    fn entries_outside_container_ignored() {
        let page = "{{PropertyMapping|templateProperty=a|ontologyProperty=b}}{{TemplateMapping|mapToClass=X}}";
        assert!(parse_mapping_page(page).is_empty());
    }

    // ─────────────────────────────────────────────────────────────
    // fetch_template_mappings
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn fetches_both_languages_in_one_request() {
        let api = CannedApi::new().respond(
            "revisions",
            json!({"query": {"pages": {
                "1": {"title": "Mapping en:Infobox A", "revisions": [{"*": PERSON}]},
                "2": {"title": "Mapping it:Infobox B", "revisions": [{"*":
                    "{{TemplateMapping|mappings={{PropertyMapping|templateProperty=nome|ontologyProperty=foaf:name}}}}"}]}
            }}}),
        );
        let (source, target) = fetch_template_mappings(
            &api,
            "http://mappings.dbpedia.org/api.php",
            &lang("en"),
            &lang("it"),
            &set(&["Infobox A", "Infobox Z"]),
            &set(&["Infobox B"]),
        )
        .unwrap();

        assert_eq!(api.calls.borrow().len(), 1);
        assert_eq!(
            api.param(0, "titles").unwrap(),
            "Mapping en:Infobox A|Mapping en:Infobox Z|Mapping it:Infobox B"
        );
        assert_eq!(source["Infobox A"]["name"], "foaf:name");
        assert!(!source.contains_key("Infobox Z"));
        assert_eq!(target["Infobox B"]["nome"], "foaf:name");
    }

    #[test]
    fn same_language_feeds_both_sides() {
        let api = CannedApi::new().respond(
            "revisions",
            json!({"query": {"pages": {"1": {"title": "Mapping en:Infobox A", "revisions": [{"*": PERSON}]}}}}),
        );
        let (source, target) =
            fetch_template_mappings(&api, "e", &lang("en"), &lang("en"), &set(&["Infobox A"]), &set(&["Infobox A"]))
                .unwrap();
        assert_eq!(source, target);
        assert_eq!(source["Infobox A"].len(), 2);
    }

    #[test]
    fn registry_page_without_container_gives_empty_mapping() {
        let api = CannedApi::new().respond(
            "revisions",
            json!({"query": {"pages": {"1": {"title": "Mapping en:X", "revisions": [{"*": "#REDIRECT [[Mapping en:Y]]"}]}}}}),
        );
        let (source, _) = fetch_template_mappings(&api, "e", &lang("en"), &lang("it"), &set(&["X"]), &set(&[])).unwrap();
        assert!(source["X"].is_empty());
    }
}
