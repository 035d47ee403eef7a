//! Field-by-field merging of configuration tiers.
//!
//! Tiers are parsed into JSON values and folded together, higher tiers
//! winning. Arrays are replaced as a whole.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers and booleans in overlay replace base
/// - A null overlay keeps the base value (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use fogg_task::config::deep_merge;
///
/// let defaults = json!({"ai": {"model": "kimi-k2-turbo-preview", "timeout_secs": 55}});
/// let project = json!({"ai": {"timeout_secs": 20}});
/// let merged = deep_merge(defaults, project);
/// assert_eq!(merged, json!({"ai": {"model": "kimi-k2-turbo-preview", "timeout_secs": 20}}));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, later tiers taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_sections_merge_per_field() {
        let base = json!({
            "server": {"host": "127.0.0.1", "port": 3000},
            "ai": {"model": "a"}
        });
        let overlay = json!({"server": {"port": 8080}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({
                "server": {"host": "127.0.0.1", "port": 8080},
                "ai": {"model": "a"}
            })
        );
    }

    #[test]
    fn test_arrays_replaced_not_concatenated() {
        let base = json!({"server": {"cors_origins": ["http://a"]}});
        let overlay = json!({"server": {"cors_origins": ["http://b", "http://c"]}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"server": {"cors_origins": ["http://b", "http://c"]}})
        );
    }

    #[test]
    fn test_null_keeps_lower_tier() {
        let base = json!({"ai": {"model": "a", "temperature": 0.6}});
        let overlay = json!({"ai": {"model": null}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"ai": {"model": "a", "temperature": 0.6}})
        );
    }

    #[test]
    fn test_scalar_and_object_replace_each_other() {
        assert_eq!(
            deep_merge(json!({"v": 1}), json!({"v": {"x": true}})),
            json!({"v": {"x": true}})
        );
        assert_eq!(
            deep_merge(json!({"v": {"x": true}}), json!({"v": 1})),
            json!({"v": 1})
        );
    }

    #[test]
    fn test_merge_all_later_wins() {
        let tiers = vec![
            json!({"server": {"port": 3000, "host": "127.0.0.1"}}),
            json!({"server": {"port": 4000}}),
            json!({"server": {"port": 5000}, "ai": {"timeout_secs": 10}}),
        ];
        assert_eq!(
            deep_merge_all(tiers),
            json!({
                "server": {"port": 5000, "host": "127.0.0.1"},
                "ai": {"timeout_secs": 10}
            })
        );
    }
}
