//! Cache key generation.
//!
//! Keys have the form `operation:{"param":value,...}` with parameter names in
//! lexicographic order, so the same logical call always yields the same key
//! regardless of how its parameters were assembled.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Builds the canonical cache key for `operation` called with `params`.
///
/// If a parameter name repeats, the last value wins.
pub fn build_key<'a, I>(operation: &str, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, Value)>,
{
    let sorted: BTreeMap<&str, Value> = params.into_iter().collect();
    let canonical = serde_json::to_string(&sorted).unwrap_or_default();
    format!("{}:{}", operation, canonical)
}

/// Incremental form of [`build_key`] accepting any serializable parameter.
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    operation: String,
    params: BTreeMap<String, Value>,
}

impl CacheKeyBuilder {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter. Values that cannot be represented as JSON are keyed as `null`.
    pub fn param(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.params.insert(name.into(), value);
        self
    }

    pub fn build(&self) -> String {
        build_key(
            &self.operation,
            self.params
                .iter()
                .map(|(name, value)| (name.as_str(), value.clone())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_independent_of_param_order() {
        let forward = build_key("op", [("a", json!(1)), ("b", json!(2))]);
        let reverse = build_key("op", [("b", json!(2)), ("a", json!(1))]);

        assert_eq!(forward, reverse);
        assert_eq!(forward, r#"op:{"a":1,"b":2}"#);
    }

    #[test]
    fn test_key_differs_by_value() {
        let one = build_key("op", [("a", json!(1)), ("b", json!(2))]);
        let other = build_key("op", [("a", json!(1)), ("b", json!(3))]);

        assert_ne!(one, other);
    }

    #[test]
    fn test_key_differs_by_operation() {
        let params = || [("path", json!("/project"))];
        assert_ne!(build_key("patterns", params()), build_key("similar", params()));
    }

    #[test]
    fn test_key_without_params() {
        assert_eq!(build_key("stats", std::iter::empty::<(&str, Value)>()), "stats:{}");
    }

    #[test]
    fn test_key_keeps_operation_as_prefix() {
        let key = build_key("patterns:/project", [("kind", json!("naming"))]);
        assert!(key.starts_with("patterns:/project"));
    }

    #[test]
    fn test_builder_matches_build_key() {
        let built = CacheKeyBuilder::new("similar")
            .param("limit", 10)
            .param("query", "parse config")
            .param("threshold", 0.75)
            .build();
        let direct = build_key(
            "similar",
            [
                ("threshold", json!(0.75)),
                ("query", json!("parse config")),
                ("limit", json!(10)),
            ],
        );

        assert_eq!(built, direct);
    }

    #[test]
    fn test_builder_nested_values() {
        let key = CacheKeyBuilder::new("search")
            .param("filters", vec!["rs", "toml"])
            .param("path", Option::<String>::None)
            .build();

        assert_eq!(key, r#"search:{"filters":["rs","toml"],"path":null}"#);
    }
}
