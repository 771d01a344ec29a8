//! Safe accessors over upstream JSON.
//!
//! Upstream payloads are untyped; reshaping code reads them through these
//! helpers and pattern-matches on [`Value`] instead of assuming a shape.

use serde_json::{Map, Value};

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Objects contained in `value` when it is a list. Non-objects are skipped.
pub fn objects(value: &Value) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .as_array()
        .map(|items| items.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_object)
}

/// Field accessors that never panic on an unexpected shape.
pub trait PayloadExt {
    /// Member `key` when `self` is an object.
    fn field(&self, key: &str) -> Option<&Value>;

    /// Walk nested objects, e.g. `["ultimoStatus", "gabinete", "sala"]`.
    fn path(&self, keys: &[&str]) -> Option<&Value>;

    /// First truthy member among `keys`, cloned; `""` when none is.
    fn first_truthy(&self, keys: &[&str]) -> Value;

    /// First truthy member among `keys` rendered as text; `""` when none is.
    fn text_of(&self, keys: &[&str]) -> String;

    /// Member `key` as a list slice; empty for anything else.
    fn items(&self, key: &str) -> &[Value];

    /// Member `key` cloned, or `null`.
    fn cloned_or_null(&self, key: &str) -> Value;
}

impl PayloadExt for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|o| o.get(key))
    }

    fn path(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().try_fold(self, |current, key| current.field(key))
    }

    fn first_truthy(&self, keys: &[&str]) -> Value {
        keys.iter()
            .filter_map(|k| self.field(k))
            .find(|v| is_truthy(v))
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()))
    }

    fn text_of(&self, keys: &[&str]) -> String {
        match self.first_truthy(keys) {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    fn items(&self, key: &str) -> &[Value] {
        self.field(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn cloned_or_null(&self, key: &str) -> Value {
        self.field(key).cloned().unwrap_or(Value::Null)
    }
}
