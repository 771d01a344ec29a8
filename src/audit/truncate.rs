//! Size and depth bounding for audit payloads.
//!
//! # Rules
//! - Strings (map keys included) longer than `max_string_len` characters are
//!   cut and suffixed with [`TRUNCATION_MARKER`]
//! - Lists keep their first `max_list_items` items
//! - Maps keep their first `max_map_entries` entries
//! - At `max_depth`, a list becomes the string `"[list:N]"` and a map keeps
//!   at most `max_collapsed_entries` keys, each mapped to a `"<type>"` placeholder

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::config::AuditConfig;
use crate::http::error::clip_chars;

/// Appended to every string that was cut.
pub const TRUNCATION_MARKER: &str = "...(truncated)";

/// Bounds applied to every audit payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditLimits {
    pub max_string_len: usize,
    pub max_list_items: usize,
    pub max_map_entries: usize,
    pub max_depth: usize,
    pub max_collapsed_entries: usize,
}

impl Default for AuditLimits {
    fn default() -> Self {
        Self::from(&AuditConfig::default())
    }
}

impl From<&AuditConfig> for AuditLimits {
    fn from(config: &AuditConfig) -> Self {
        Self {
            max_string_len: config.max_string_len,
            max_list_items: config.max_list_items,
            max_map_entries: config.max_map_entries,
            max_depth: config.max_depth,
            max_collapsed_entries: 10,
        }
    }
}

impl AuditLimits {
    /// Cut `s` to `max_string_len` characters plus the marker.
    pub fn bound_str<'a>(&self, s: &'a str) -> Cow<'a, str> {
        let clipped = clip_chars(s, self.max_string_len);
        if clipped.len() == s.len() {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(format!("{clipped}{TRUNCATION_MARKER}"))
        }
    }

    /// Bound a whole value, starting at depth zero.
    pub fn bound(&self, value: &Value) -> Value {
        self.bound_at(value, 0)
    }

    /// Bound a record of fields: each member of a top-level object is bounded
    /// on its own, so one field's nesting does not eat into another's depth.
    pub fn bound_fields(&self, value: &Value) -> Value {
        match value {
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .take(self.max_map_entries)
                    .map(|(k, v)| (self.bound_str(k).into_owned(), self.bound_at(v, 0)))
                    .collect(),
            ),
            other => self.bound(other),
        }
    }

    fn bound_at(&self, value: &Value, depth: usize) -> Value {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
            Value::String(s) => Value::String(self.bound_str(s).into_owned()),
            Value::Array(items) if depth >= self.max_depth => {
                Value::String(format!("[list:{}]", items.len()))
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .take(self.max_list_items)
                    .map(|item| self.bound_at(item, depth + 1))
                    .collect(),
            ),
            Value::Object(map) if depth >= self.max_depth => {
                Value::Object(self.collapse(map))
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .take(self.max_map_entries)
                    .map(|(k, v)| (self.bound_str(k).into_owned(), self.bound_at(v, depth + 1)))
                    .collect(),
            ),
        }
    }

    fn collapse(&self, map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .take(self.max_collapsed_entries)
            .map(|(k, v)| {
                (
                    self.bound_str(k).into_owned(),
                    Value::String(format!("<{}>", type_name(v))),
                )
            })
            .collect()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn limits() -> AuditLimits {
        AuditLimits {
            max_string_len: 10,
            max_list_items: 3,
            max_map_entries: 4,
            max_depth: 2,
            max_collapsed_entries: 2,
        }
    }

    #[test]
    fn test_short_string_untouched() {
        assert_eq!(limits().bound(&json!("hello")), json!("hello"));
        assert_eq!(limits().bound(&json!("0123456789")), json!("0123456789"));
    }

    #[test]
    fn test_long_string_cut_with_marker() {
        let bounded = limits().bound(&json!("abcdefghijklmnop"));
        assert_eq!(bounded, json!(format!("abcdefghij{TRUNCATION_MARKER}")));
    }

    #[test]
    fn test_string_bound_counts_chars_not_bytes() {
        let s = "ç".repeat(25);
        let bounded = limits().bound_str(&s);
        assert_eq!(bounded.chars().count(), 10 + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn test_list_capped() {
        let bounded = limits().bound(&json!([1, 2, 3, 4, 5, 6]));
        assert_eq!(bounded, json!([1, 2, 3]));
    }

    #[test]
    fn test_map_capped() {
        let bounded = limits().bound(&json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6}));
        assert_eq!(bounded.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_deep_values_collapse() {
        let bounded = limits().bound(&json!({
            "level1": {
                "level2": {"x": {"deep": true}, "y": "s", "z": 1},
                "list2": [1, 2, 3, 4]
            }
        }));
        assert_eq!(
            bounded,
            json!({
                "level1": {
                    "level2": {"x": "<object>", "y": "<string>"},
                    "list2": "[list:4]"
                }
            })
        );
    }

    #[test]
    fn test_bound_fields_resets_depth_per_field() {
        let bounded = limits().bound_fields(&json!({
            "query": {"q": "x"},
            "body": {"a": {"b": [1]}}
        }));
        assert_eq!(bounded["query"], json!({"q": "x"}));
        assert_eq!(bounded["body"], json!({"a": {"b": "[list:1]"}}));
    }

    #[test]
    fn test_long_keys_bounded() {
        let key = "k".repeat(40);
        let bounded = limits().bound(&json!({ key: 1 }));
        let stored_key = bounded.as_object().unwrap().keys().next().unwrap();
        assert!(stored_key.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_default_limits_follow_config() {
        let limits = AuditLimits::default();
        assert_eq!(limits.max_string_len, 1000);
        assert_eq!(limits.max_list_items, 30);
        assert_eq!(limits.max_map_entries, 50);
        assert_eq!(limits.max_depth, 3);
    }
}
