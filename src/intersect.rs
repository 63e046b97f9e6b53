//! Derive the per-template parameter translation table.

use std::collections::BTreeMap;

use crate::langlinks::LanglinkTable;
use crate::mappings::TemplateMappings;

/// Source template name -> (source parameter -> target parameter).
pub type TranslationTable = BTreeMap<String, BTreeMap<String, String>>;

/// Invert a map, keeping only values that belong to exactly one key.
///
/// Values shared by several keys are dropped entirely rather than resolved to
/// one of them.
pub fn flip_unique<K, V>(map: &BTreeMap<K, V>) -> BTreeMap<V, K>
where
    K: Clone + Ord,
    V: Clone + Ord,
{
    let mut owners: BTreeMap<&V, Vec<&K>> = BTreeMap::new();
    for (key, value) in map {
        owners.entry(value).or_default().push(key);
    }
    owners
        .into_iter()
        .filter_map(|(value, keys)| match keys.as_slice() {
            [key] => Some((value.clone(), (*key).clone())),
            _ => None,
        })
        .collect()
}

/// Combine both languages' field mappings through the langlink table.
///
/// A template appears only when it has a source mapping, a langlink, and a
/// non-empty target mapping for the linked template. A parameter maps when its ontology
/// field is claimed by exactly one target parameter.
pub fn intersect(
    source: &TemplateMappings,
    target: &TemplateMappings,
    langlinks: &LanglinkTable,
) -> TranslationTable {
    let mut table = TranslationTable::new();
    for (template, source_fields) in source {
        let Some(target_fields) = langlinks
            .get(template)
            .and_then(|linked| target.get(linked))
            .filter(|fields| !fields.is_empty())
        else {
            continue;
        };
        let by_ontology = flip_unique(target_fields);
        let fields = source_fields
            .iter()
            .filter_map(|(param, ontology)| {
                by_ontology
                    .get(ontology)
                    .map(|target_param| (param.clone(), target_param.clone()))
            })
            .collect();
        table.insert(template.clone(), fields);
    }
    table
}
