//! Tree flattener.
//!
//! Walks the nested source document depth-first and emits one [`RawEntry`]
//! per scalar leaf. Composite and icon tokens are emitted whole.

use dtf_core::keys;
use dtf_core::{RawEntry, SourceError, TokenPath, TokenType};
use serde_json::Value;
use tracing::warn;

use crate::source::declared_type;

/// Flatten a source document into `(path, value)` entries in document order.
pub fn flatten(root: &Value) -> Result<Vec<RawEntry>, SourceError> {
    if !root.is_object() {
        return Err(SourceError::NotAnObject);
    }

    let mut entries = Vec::new();
    walk(root, &TokenPath::new(), &mut entries);
    Ok(entries)
}

fn walk(node: &Value, path: &TokenPath, out: &mut Vec<RawEntry>) {
    if let Some(token_type) = declared_type(node).filter(TokenType::is_composite) {
        if let Err(reason) = emit_composite(node, path, token_type, out) {
            warn!(path = %path, %reason, "skipping malformed composite");
        }
        return;
    }

    match node {
        Value::Object(map) => {
            for (key, value) in map {
                if keys::METADATA.contains(&key.as_str()) {
                    continue;
                }
                walk(value, &path.child(key.as_str()), out);
            }
        }
        Value::Array(items) if is_named_array(items) => {
            for item in items {
                match item.get(keys::NAME).and_then(Value::as_str) {
                    Some(name) if item.is_object() => walk(item, &path.child(name), out),
                    _ => warn!(path = %path, "skipping array element without a $name"),
                }
            }
        }
        Value::Array(items) => match join_scalars(items) {
            Some(joined) => out.push(RawEntry::new(path.clone(), Value::String(joined))),
            None => warn!(path = %path, "skipping array with non-scalar elements"),
        },
        scalar => out.push(RawEntry::new(path.clone(), scalar.clone())),
    }
}

/// Composite tokens yield their `$type` and raw `$value`; per-mode
/// overrides under `$extensions` are still walked so their modes are seen.
fn emit_composite(
    node: &Value,
    path: &TokenPath,
    token_type: TokenType,
    out: &mut Vec<RawEntry>,
) -> Result<(), &'static str> {
    let value = node.get(keys::VALUE).ok_or("missing $value")?;

    out.push(RawEntry::new(
        path.child(keys::TYPE),
        Value::String(token_type.to_string()),
    ));
    out.push(RawEntry::new(path.child(keys::VALUE), value.clone()));

    if let Some(extensions) = node.get(keys::EXTENSIONS) {
        walk(extensions, &path.child(keys::EXTENSIONS), out);
    }
    Ok(())
}

fn is_named_array(items: &[Value]) -> bool {
    items.first().is_some_and(|first| first.get(keys::NAME).is_some())
}

fn join_scalars(items: &[Value]) -> Option<String> {
    let parts = items
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn dotted(entries: &[RawEntry]) -> Vec<String> {
        entries.iter().map(|e| e.path.to_dotted()).collect()
    }

    #[test]
    fn test_flatten_scalars_and_metadata() {
        let doc = json!({
            "$name": "Tokens",
            "$version": "1.0.0",
            "kda": { "spacing": { "sm": { "$type": "dimension", "$value": "4px" } } }
        });
        let entries = flatten(&doc).unwrap();
        assert_eq!(dotted(&entries), vec!["kda.spacing.sm.$type", "kda.spacing.sm.$value"]);
        assert_eq!(entries[1].value, json!("4px"));
    }

    #[test]
    fn test_flatten_composite_is_not_recursed() {
        let doc = json!({
            "kda": { "border": { "default": {
                "$type": "border",
                "$value": { "width": "2px", "color": "#ffffff", "style": "solid" }
            } } }
        });
        let entries = flatten(&doc).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, json!("border"));
        assert_eq!(entries[1].value["width"], json!("2px"));
    }

    #[test]
    fn test_flatten_composite_mode_overrides() {
        let doc = json!({
            "shadow": {
                "$type": "shadow",
                "$value": { "color": "#000000", "blur": "4px" },
                "$extensions": { "mode": { "dark": { "color": "#ffffff" } } }
            }
        });
        let entries = flatten(&doc).unwrap();
        assert!(dotted(&entries).contains(&"shadow.$extensions.mode.dark.color".to_string()));
    }

    #[test]
    fn test_flatten_named_array() {
        let doc = json!({
            "icons": [
                { "$name": "home", "$type": "icon", "$value": "<svg/>" },
                { "$type": "icon", "$value": "<svg/>" }
            ]
        });
        let entries = flatten(&doc).unwrap();
        assert_eq!(dotted(&entries), vec!["icons.home.$type", "icons.home.$value"]);
    }

    #[test]
    fn test_flatten_joined_array() {
        let doc = json!({ "font": { "$value": ["Inter", "sans-serif"] } });
        let entries = flatten(&doc).unwrap();
        assert_eq!(entries[0].value, json!("Inter, sans-serif"));
    }

    #[test]
    fn test_malformed_subtrees_are_skipped() {
        let doc = json!({
            "bad": { "$type": "typography" },
            "mixed": [1, { "a": 2 }],
            "good": { "$value": 1 }
        });
        let entries = flatten(&doc).unwrap();
        assert_eq!(dotted(&entries), vec!["good.$value"]);
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(flatten(&json!([1, 2])), Err(SourceError::NotAnObject)));
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z#0-9]{0,8}".prop_map(Value::String),
            any::<bool>().prop_map(Value::Bool),
        ]
    }

    fn tree() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(4, 32, 4, |inner| {
            prop::collection::btree_map("[a-z]{1,4}", inner, 1..4)
                .prop_map(|map| Value::Object(map.into_iter().collect()))
        })
    }

    fn count_leaves(node: &Value) -> usize {
        match node {
            Value::Object(map) => map.values().map(count_leaves).sum(),
            _ => 1,
        }
    }

    proptest! {
        #[test]
        fn prop_flatten_is_total(root in prop::collection::btree_map("[a-z]{1,4}", tree(), 1..4)) {
            let doc = Value::Object(root.into_iter().collect());
            let entries = flatten(&doc).unwrap();

            prop_assert_eq!(entries.len(), count_leaves(&doc));
            for entry in &entries {
                prop_assert!(!entry.path.is_empty());
                prop_assert!(!entry.value.is_object());
            }
        }
    }
}
