mod defaults;

pub use defaults::default_config;

use serde_json::{Map, Value};

/// JSON-backed configuration with dotted-path access (`"layout.nodeSize"`).
///
/// `ArborConfig::default()` is the built-in defaults; user overrides are applied with
/// [`ArborConfig::deep_merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArborConfig(Value);

impl Default for ArborConfig {
    fn default() -> Self {
        Self(default_config())
    }
}

impl ArborConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Defaults overlaid with `overrides`.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::default();
        cfg.deep_merge(overrides);
        cfg
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path)?.as_f64()
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        let v = self.get(dotted_path)?;
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
    }

    /// Reads a two-element numeric array such as `layout.nodeSize`.
    pub fn get_pair(&self, dotted_path: &str) -> Option<(f64, f64)> {
        let arr = self.get(dotted_path)?.as_array()?;
        match arr.as_slice() {
            [a, b] => Some((a.as_f64()?, b.as_f64()?)),
            _ => None,
        }
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // Configs are objects; coerce anything else so this never panics on user input.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dotted_paths_read_defaults() {
        let cfg = ArborConfig::default();
        assert_eq!(cfg.get_pair("layout.nodeSize"), Some((220.0, 120.0)));
        assert_eq!(cfg.get_f64("animation.duration"), Some(750.0));
        assert_eq!(cfg.get_u64("limits.maxDepth"), Some(4096));
        assert_eq!(cfg.get_f64("node.missing"), None);
    }

    #[test]
    fn deep_merge_overrides_leaves_only() {
        let cfg = ArborConfig::with_overrides(&json!({
            "node": { "height": 40 },
            "layout": { "nodeSize": [100, 50] }
        }));
        assert_eq!(cfg.get_f64("node.height"), Some(40.0));
        assert_eq!(cfg.get_f64("node.labelPadding"), Some(20.0));
        assert_eq!(cfg.get_pair("layout.nodeSize"), Some((100.0, 50.0)));
    }

    #[test]
    fn set_value_coerces_non_objects() {
        let mut cfg = ArborConfig::from_value(json!(3));
        cfg.set_value("anchor.x", json!(10));
        assert_eq!(cfg.get_f64("anchor.x"), Some(10.0));

        cfg.set_value("anchor.x.deep", json!(true));
        assert_eq!(cfg.get("anchor.x.deep"), Some(&json!(true)));
    }

    #[test]
    fn pair_requires_two_numbers() {
        let cfg = ArborConfig::from_value(json!({ "a": [1], "b": [1, "x"], "c": [1, 2] }));
        assert_eq!(cfg.get_pair("a"), None);
        assert_eq!(cfg.get_pair("b"), None);
        assert_eq!(cfg.get_pair("c"), Some((1.0, 2.0)));
    }
}
