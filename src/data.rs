//! Helpers for the global data bag shared between page generators. Keys may
//! be dotted paths (`blog.posts`) that address nested mappings.

use serde_yaml::{Mapping, Value};

/// Where the indexing phase publishes the serialized post collection.
pub const POSTS_KEY: &str = "blog.posts";

/// Looks up a dotted `path` in `data`.
pub fn get_path<'a>(data: &'a Mapping, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut value = data.get(&Value::String(segments.next()?.to_owned()))?;
    for segment in segments {
        value = match value {
            Value::Mapping(m) => m.get(&Value::String(segment.to_owned()))?,
            _ => return None,
        };
    }
    Some(value)
}

/// Sets a dotted `path` in `data`, creating intermediate mappings as needed.
/// An intermediate value that isn't a mapping is replaced by one.
pub fn set_path(data: &mut Mapping, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            crate::merge::set(data, Value::String(path.to_owned()), value);
        }
        Some((head, rest)) => {
            let key = Value::String(head.to_owned());
            if !matches!(data.get(&key), Some(Value::Mapping(_))) {
                crate::merge::set(data, key.clone(), Value::Mapping(Mapping::new()));
            }
            if let Some(Value::Mapping(child)) = data.get_mut(&key) {
                set_path(child, rest, value);
            }
        }
    }
}
