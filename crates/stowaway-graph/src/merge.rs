use std::hash::Hash;

use indexmap::IndexMap;

/// Combine maps given highest precedence first.
///
/// The result is the same as overlaying the maps from lowest to highest
/// precedence, except that entries flagged by `skip` are dropped unless they
/// come from the lowest-precedence map. Keys keep the order in which they
/// were first seen, so the primary map's keys come first.
pub fn merge_maps<K, V, I, F>(maps: I, skip: F) -> IndexMap<K, V>
where
    K: Hash + Eq,
    I: IntoIterator<Item = IndexMap<K, V>>,
    F: Fn(&V) -> bool,
{
    let maps: Vec<IndexMap<K, V>> = maps.into_iter().collect();
    let last = maps.len().saturating_sub(1);

    let mut merged: IndexMap<K, V> = IndexMap::new();
    for (idx, map) in maps.into_iter().enumerate() {
        for (key, value) in map {
            if idx != last && skip(&value) {
                continue;
            }
            merged.entry(key).or_insert(value);
        }
    }
    merged
}
