//! Cross-language template equivalences from the encyclopedia.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::TranslateError;
use crate::language::LanguageCode;
use crate::mediawiki::{propagate_aliases, QueryApi};

/// Template name in the source language -> template name in the target
/// language, both without namespace prefix.
pub type LanglinkTable = BTreeMap<String, String>;

/// Resolve the target-language counterpart of every title in one request.
///
/// Only pages with exactly one langlink into `to` are kept; ambiguous or absent
/// links are left out. Results are also recorded under the title each page was
/// requested by when the API normalized it or followed a redirect.
pub fn get_langlinks<A: QueryApi + ?Sized>(
    api: &A,
    endpoint: &str,
    titles: &[String],
    to: &LanguageCode,
) -> Result<BTreeMap<String, String>, TranslateError> {
    if titles.is_empty() {
        return Ok(BTreeMap::new());
    }
    let joined = titles.join("|");
    let response = api.query(
        endpoint,
        &[
            ("action", "query"),
            ("titles", &joined),
            ("prop", "langlinks"),
            ("redirects", "1"),
            ("lllang", to.as_str()),
        ],
    )?;

    let Some(query) = response.query else {
        return Ok(BTreeMap::new());
    };
    let Some(found) = query.pages.as_ref() else {
        return Ok(BTreeMap::new());
    };

    let mut pages = BTreeMap::new();
    for page in found.values() {
        let mut links = page.langlinks.iter().filter(|link| link.lang == to.as_str());
        if let (Some(link), None) = (links.next(), links.next()) {
            pages.insert(page.title.clone(), link.title.clone());
        }
    }
    propagate_aliases(&mut pages, &query);
    debug!(requested = titles.len(), resolved = pages.len(), lang = %to, "langlinks fetched");
    Ok(pages)
}

/// Keep only namespaced pairs and drop the namespace from both sides.
///
/// A pair survives when both titles contain `:` somewhere after their first
/// character; the key and value are what follows the first `:`.
pub fn strip_namespaces(titles: &BTreeMap<String, String>) -> LanglinkTable {
    titles
        .iter()
        .filter(|(from, to)| has_namespace(from) && has_namespace(to))
        .filter_map(|(from, to)| Some((after_namespace(from)?, after_namespace(to)?)))
        .collect()
}

fn has_namespace(title: &str) -> bool {
    let mut chars = title.chars();
    chars.next();
    chars.as_str().contains(':')
}

fn after_namespace(title: &str) -> Option<String> {
    title.split_once(':').map(|(_, rest)| rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediawiki::testing::CannedApi;
    use serde_json::json;

    fn it() -> LanguageCode {
        LanguageCode::new("it").unwrap()
    }

    fn titles(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // ─────────────────────────────────────────────────────────────
    // get_langlinks
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn keeps_only_unambiguous_links() {
        let api = CannedApi::new().respond(
            "langlinks",
            json!({"query": {"pages": {
                "1": {"title": "Template:Infobox A", "langlinks": [{"lang": "it", "*": "Template:Infobox B"}]},
                "2": {"title": "Template:Twice", "langlinks": [
                    {"lang": "it", "*": "Template:Uno"}, {"lang": "it", "*": "Template:Due"}]},
                "3": {"title": "Template:Other", "langlinks": [{"lang": "de", "*": "Vorlage:X"}]},
                "4": {"title": "Template:None"}
            }}}),
        );
        let links = get_langlinks(
            &api,
            "https://en.wikipedia.org/w/api.php",
            &titles(&["Template:Infobox A", "Template:Twice", "Template:Other", "Template:None"]),
            &it(),
        )
        .unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links["Template:Infobox A"], "Template:Infobox B");
    }

    #[test]
    fn request_is_one_batch() {
        let api = CannedApi::new();
        get_langlinks(&api, "https://en.wikipedia.org/w/api.php", &titles(&["Template:A", "Template:B"]), &it()).unwrap();
        let calls = api.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://en.wikipedia.org/w/api.php");
        drop(calls);
        assert_eq!(api.param(0, "titles").unwrap(), "Template:A|Template:B");
        assert_eq!(api.param(0, "lllang").unwrap(), "it");
        assert_eq!(api.param(0, "redirects").unwrap(), "1");
    }

    #[test]
    fn propagates_normalized_and_redirected_titles() {
        let api = CannedApi::new().respond(
            "langlinks",
            json!({"query": {
                "normalized": [{"from": "Template:infobox old", "to": "Template:Infobox old"}],
                "redirects": [{"from": "Template:Infobox old", "to": "Template:Infobox new"}],
                "pages": {"9": {"title": "Template:Infobox new",
                                "langlinks": [{"lang": "it", "*": "Template:Infobox nuovo"}]}}
            }}),
        );
        let links = get_langlinks(&api, "e", &titles(&["Template:infobox old"]), &it()).unwrap();
        assert_eq!(links["Template:infobox old"], "Template:Infobox nuovo");
        assert_eq!(links["Template:Infobox new"], "Template:Infobox nuovo");
    }

    #[test]
    fn no_titles_no_request() {
        let api = CannedApi::new();
        assert!(get_langlinks(&api, "e", &[], &it()).unwrap().is_empty());
        assert!(api.calls.borrow().is_empty());
    }

    // ─────────────────────────────────────────────────────────────
    // strip_namespaces
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn strips_prefix_on_both_sides() {
        let raw = BTreeMap::from([("Template:Infobox A".to_string(), "Template:Infobox B".to_string())]);
        let table = strip_namespaces(&raw);
        assert_eq!(table["Infobox A"], "Infobox B");
    }

    #[test]
    fn drops_pairs_without_namespace() {
        let raw = BTreeMap::from([
            ("Template:A".to_string(), "A".to_string()),
            ("B".to_string(), "Template:B".to_string()),
            (":C".to_string(), "Template:C".to_string()),
        ]);
        assert!(strip_namespaces(&raw).is_empty());
    }

    #[test]
    fn splits_at_first_colon_only() {
        let raw = BTreeMap::from([
            ("Template:Lang:xx".to_string(), "Modèle:Langue:xx".to_string()),
            (":Template:Y".to_string(), "Template:Y".to_string()),
        ]);
        let table = strip_namespaces(&raw);
        assert_eq!(table["Lang:xx"], "Langue:xx");
        assert_eq!(table["Template:Y"], "Y");
    }
}
