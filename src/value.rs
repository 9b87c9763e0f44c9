//! Conversions from the site's data types into template [`Value`]s. Strings
//! are HTML-escaped on the way in, since every template renders HTML and
//! `gtmpl` prints values verbatim.

use crate::post::Post;
use gtmpl_value::Value;
use std::collections::HashMap;

/// An escaped string value, safe inside element text and quoted attributes.
pub fn text(s: &str) -> Value {
    Value::String(html_escape::encode_quoted_attribute(s).into_owned())
}

impl From<&Post> for Value {
    /// Post fields are exposed under capitalized names, e.g. `{{.Title}}`,
    /// `{{.BasePhoto}}`. A missing `base_photo` is `nil`.
    fn from(p: &Post) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Path".to_owned(), text(&p.path));
        m.insert("Title".to_owned(), text(&p.title));
        m.insert("Description".to_owned(), text(&p.description));
        m.insert(
            "BasePhoto".to_owned(),
            match &p.base_photo {
                Some(photo) => text(photo),
                None => Value::Nil,
            },
        );
        m.insert(
            "Photos".to_owned(),
            Value::Array(p.photos.iter().map(|photo| text(photo)).collect()),
        );
        m.insert("Draft".to_owned(), p.draft.into());
        Value::Object(m)
    }
}

/// Converts arbitrary YAML from `config.yml` into a template value. Mapping
/// keys which aren't strings are rendered to their YAML text.
pub fn from_yaml(v: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match v {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => (*b).into(),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into()
            } else if let Some(u) = n.as_u64() {
                u.into()
            } else {
                n.as_f64().unwrap_or(f64::NAN).into()
            }
        }
        Yaml::String(s) => text(s),
        Yaml::Sequence(seq) => Value::Array(seq.iter().map(from_yaml).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .map(|(k, v)| (yaml_key(k), from_yaml(v)))
                .collect(),
        ),
    }
}

fn yaml_key(k: &serde_yaml::Value) -> String {
    match k {
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_start_matches("---").trim().to_owned())
            .unwrap_or_default(),
    }
}
