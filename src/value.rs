//! Converts YAML values (the representation of post attributes and global
//! data) into template [`Value`]s.

use gtmpl_value::Value;
use serde_yaml::{Mapping, Value as Yaml};
use std::collections::HashMap;

/// Converts a YAML mapping into a [`Value::Object`]. Non-string keys are
/// converted to their string form.
pub fn from_mapping(m: &Mapping) -> Value {
    let mut obj: HashMap<String, Value> = HashMap::with_capacity(m.len());
    for (key, value) in m.iter() {
        obj.insert(key_string(key), from_yaml(value));
    }
    Value::Object(obj)
}

/// Converts a YAML value into a [`Value`]. `null` becomes [`Value::Nil`] so
/// that templates can test for it with `{{if}}`.
pub fn from_yaml(yaml: &Yaml) -> Value {
    match yaml {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or_default())
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(seq) => Value::Array(seq.iter().map(from_yaml).collect()),
        Yaml::Mapping(m) => from_mapping(m),
    }
}

fn key_string(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_start_matches("---").trim().to_owned())
            .unwrap_or_default(),
    }
}
