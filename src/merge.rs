//! Merges a file's raw front matter into the attribute mapping for its post.

use serde_yaml::{Mapping, Value};

/// Front-matter keys starting with this marker belong to the post namespace
/// (e.g., `post::brief` becomes the `brief` attribute).
pub const POST_MARKER: &str = "post::";

/// Front-matter key holding a nested mapping of post attributes.
pub const NAMESPACE_KEY: &str = "post";

/// Attribute key under which the unmodified front matter is kept for
/// templates.
pub const RAW_KEY: &str = "__post";

/// Builds a post's attributes from its raw front matter. Marker-prefixed keys
/// come first, in their original order, with the marker stripped. Keys from
/// the nested `post` mapping follow, unless a prefixed key already claimed
/// the name. The raw mapping is appended under [`RAW_KEY`].
pub fn merge(raw: &Mapping) -> Mapping {
    let mut attributes = Mapping::new();

    for (key, value) in raw.iter() {
        if let Value::String(key) = key {
            if let Some(stripped) = key.strip_prefix(POST_MARKER) {
                attributes.insert(Value::String(stripped.to_owned()), value.clone());
            }
        }
    }

    if let Some(Value::Mapping(nested)) = raw.get(&Value::String(NAMESPACE_KEY.to_owned())) {
        for (key, value) in nested.iter() {
            insert_missing(&mut attributes, key.clone(), value.clone());
        }
    }

    insert_missing(
        &mut attributes,
        Value::String(RAW_KEY.to_owned()),
        Value::Mapping(raw.clone()),
    );
    attributes
}

/// Inserts `value` under `key` unless the key is already present.
pub fn insert_missing(m: &mut Mapping, key: Value, value: Value) {
    if !m.contains_key(&key) {
        m.insert(key, value);
    }
}

/// Sets `key` to `value`, keeping the key's position if it already exists.
pub fn set(m: &mut Mapping, key: Value, value: Value) {
    match m.get_mut(&key) {
        Some(slot) => *slot = value,
        None => {
            m.insert(key, value);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn yaml(s: &str) -> Mapping {
        serde_yaml::from_str(s).unwrap()
    }

    fn keys(m: &Mapping) -> Vec<String> {
        m.iter()
            .filter_map(|(k, _)| k.as_str().map(str::to_owned))
            .collect()
    }

    #[test]
    fn test_merge_prefixed_wins() {
        let raw = yaml(
            "title: Generic\npost::title: Prefixed\npost:\n  title: Nested\n  brief: Short\n",
        );
        let attributes = merge(&raw);
        assert_eq!(vec!["title", "brief", RAW_KEY], keys(&attributes));
        assert_eq!(
            Some(&Value::String("Prefixed".to_owned())),
            attributes.get(&Value::String("title".to_owned()))
        );
        assert_eq!(
            Some(&Value::String("Short".to_owned())),
            attributes.get(&Value::String("brief".to_owned()))
        );
    }

    #[test]
    fn test_merge_ignores_generic_keys() {
        let attributes = merge(&yaml("title: Generic\nlayout: wide\n"));
        assert_eq!(vec![RAW_KEY], keys(&attributes));
    }

    #[test]
    fn test_merge_keeps_raw() {
        let raw = yaml("post::tags: [rust, blog]\nauthor: me\n");
        let attributes = merge(&raw);
        assert_eq!(
            Some(&Value::Mapping(raw)),
            attributes.get(&Value::String(RAW_KEY.to_owned()))
        );
    }

    #[test]
    fn test_merge_non_mapping_namespace() {
        let attributes = merge(&yaml("post: just a string\npost::a: 1\n"));
        assert_eq!(vec!["a", RAW_KEY], keys(&attributes));
    }

    #[test]
    fn test_set_keeps_position() {
        let mut m = yaml("a: 1\nb: 2\n");
        set(&mut m, Value::String("a".to_owned()), Value::String("x".to_owned()));
        set(&mut m, Value::String("c".to_owned()), Value::String("y".to_owned()));
        assert_eq!(vec!["a", "b", "c"], keys(&m));
    }
}
