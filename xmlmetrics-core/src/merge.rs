//! Last-write-wins merging of tag and field maps

use std::collections::BTreeMap;

/// Copy every entry of `src` into `dst`, overwriting existing keys
///
/// Nothing is removed from `dst`. Used for both tags and fields.
pub fn merge_into<V: Clone>(dst: &mut BTreeMap<String, V>, src: &BTreeMap<String, V>) {
    for (key, value) in src {
        dst.insert(key.clone(), value.clone());
    }
}

/// Owned variant of [`merge_into`] for maps that are consumed anyway
pub fn merge_owned<V>(mut dst: BTreeMap<String, V>, src: BTreeMap<String, V>) -> BTreeMap<String, V> {
    dst.extend(src);
    dst
}
