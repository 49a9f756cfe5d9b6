//! Token builder.
//!
//! Turns flattened `$value` entries into [`Token`]s, reading owner metadata
//! (`$type`, `$title`, `$description`, `$extensions`) back out of the source
//! tree.

use dtf_core::keys;
use dtf_core::{
    alias, CollectionMeta, Extensions, ModeSet, Modifier, ModifierSpec, RawEntry, ResolverConfig,
    Token, TokenError, TokenGraph, TokenPath, TokenType, UnitHint,
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::source::SourceTree;

/// Modifier tokens need an owner, the `$extensions` key, a group and a key.
const MODIFIER_DEPTH: usize = 5;

/// Builds a [`TokenGraph`] from flattened entries.
pub struct TokenBuilder<'a> {
    source: SourceTree<'a>,
    config: &'a ResolverConfig,
}

impl<'a> TokenBuilder<'a> {
    pub fn new(root: &'a Value, config: &'a ResolverConfig) -> Self {
        Self { source: SourceTree::new(root), config }
    }

    /// Build every token. Entries that fail are recorded on the graph.
    pub fn build(&self, entries: &[RawEntry]) -> TokenGraph {
        let mut graph = TokenGraph::new(self.collection_meta(entries));

        for entry in entries.iter().filter(|e| e.path.last() == Some(keys::VALUE)) {
            match self.build_token(entry) {
                Ok(Some(token)) => {
                    let name = token.name.clone();
                    if !graph.insert(token) {
                        warn!(token = %name, "duplicate token name, keeping the first");
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(path = %entry.path, error = %err, "token skipped");
                    graph.record_failure(alias::canonical_name(&entry.path), err);
                }
            }
        }

        debug!(tokens = graph.len(), modes = graph.meta.modes.len(), "token graph built");
        graph
    }

    fn collection_meta(&self, entries: &[RawEntry]) -> CollectionMeta {
        let name = self
            .config
            .collection_name
            .clone()
            .or_else(|| self.source.metadata(keys::NAME))
            .unwrap_or_else(|| keys::DEFAULT_COLLECTION_NAME.to_string());

        CollectionMeta {
            name,
            version: self.source.metadata(keys::VERSION),
            modes: ModeSet::new(&self.config.default_mode, discover_modes(entries)),
        }
    }

    fn build_token(&self, entry: &RawEntry) -> Result<Option<Token>, TokenError> {
        if entry.path.is_extension() {
            self.build_extension_token(entry)
        } else {
            Ok(Some(self.build_plain_token(entry)))
        }
    }

    fn build_plain_token(&self, entry: &RawEntry) -> Token {
        let path = &entry.path;
        let roles = path.roles();
        let owner_path = path.parent().unwrap_or_default();
        let name = path.to_name();
        let node = self.source.lookup(&owner_path);

        let extensions = node.and_then(|n| read_extensions(n, &name));
        let modifier = extensions
            .as_ref()
            .and_then(|e| e.modifier.as_ref())
            .map_or(Modifier::None, |spec| spec.family);

        Token {
            token_type: self.source.inherited_type(&owner_path).unwrap_or(TokenType::Custom),
            title: text(node, keys::TITLE)
                .or(roles.parent_key)
                .unwrap_or_default()
                .to_string(),
            description: text(node, keys::DESCRIPTION).map(str::to_string),
            is_alias: alias::is_alias_value(&entry.value),
            value: entry.value.clone(),
            is_extension: false,
            modifier,
            extensions,
            root_key: roles.root_key.map(str::to_string),
            group_name: roles.group_name.map(str::to_string),
            parent_key: roles.parent_key.map(str::to_string),
            path: path.clone(),
            units: UnitHint::default(),
            composite: None,
            name,
        }
    }

    /// Tokens declared inside an owner's `$extensions` group.
    ///
    /// Mode overrides are read through their owner and produce no token.
    fn build_extension_token(&self, entry: &RawEntry) -> Result<Option<Token>, TokenError> {
        let path = &entry.path;
        let Some(group) = extension_group(path) else {
            return Ok(None);
        };
        if group == keys::MODE {
            return Ok(None);
        }
        let Some(family) = Modifier::from_group(group) else {
            debug!(path = %path, group, "ignoring unknown extension group");
            return Ok(None);
        };

        let roles = path.roles();
        roles.require(MODIFIER_DEPTH, path)?;

        let node_path = path.parent().unwrap_or_default();
        let owner_path = path.before_extensions();
        let node = self.source.lookup(&node_path);
        let owner = self.source.lookup(&owner_path);
        let key = roles.parent_key.unwrap_or_default();

        let description = text(node, keys::DESCRIPTION)
            .or_else(|| text(owner, keys::DESCRIPTION))
            .map(str::to_string);
        let description = match family {
            Modifier::Alpha => Some(match description {
                Some(d) => format!("{d} (alpha {key})"),
                None => format!("(alpha {key})"),
            }),
            _ => description,
        };

        let spec = ModifierSpec {
            family,
            amount: entry.value.clone(),
            base: node.and_then(|n| n.get(keys::BASE)).cloned(),
            owner: Some(owner_path.to_name()),
        };

        Ok(Some(Token {
            name: alias::canonical_name(path),
            token_type: self.source.inherited_type(&node_path).unwrap_or(TokenType::Color),
            title: text(node, keys::TITLE).unwrap_or(key).to_string(),
            description,
            is_alias: alias::is_alias_value(&entry.value),
            value: entry.value.clone(),
            is_extension: true,
            modifier: family,
            extensions: Some(Extensions { modes: IndexMap::new(), modifier: Some(spec) }),
            root_key: roles.root_key.map(str::to_string),
            group_name: roles.group_name.map(str::to_string),
            parent_key: roles.parent_key.map(str::to_string),
            path: path.clone(),
            units: UnitHint::default(),
            composite: None,
        }))
    }
}

/// Mode names found under any `$extensions.mode` map.
pub fn discover_modes(entries: &[RawEntry]) -> Vec<String> {
    entries.iter().filter_map(|e| mode_of(&e.path)).collect()
}

fn mode_of(path: &TokenPath) -> Option<String> {
    path.segments()
        .windows(3)
        .find(|w| w[0] == keys::EXTENSIONS && w[1] == keys::MODE)
        .map(|w| w[2].clone())
}

/// First segment after `$extensions`.
fn extension_group(path: &TokenPath) -> Option<&str> {
    let segments = path.segments();
    let at = segments.iter().position(|s| s == keys::EXTENSIONS)?;
    segments.get(at + 1).map(String::as_str)
}

fn text<'v>(node: Option<&'v Value>, key: &str) -> Option<&'v str> {
    node?.get(key)?.as_str()
}

/// Mode overrides and an inline modifier declared on a token node.
fn read_extensions(node: &Value, owner: &str) -> Option<Extensions> {
    let raw = node.get(keys::EXTENSIONS)?;

    let modes = raw
        .get(keys::MODE)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(mode, value)| (mode.clone(), unwrap_mode_value(value)))
                .collect::<IndexMap<_, _>>()
        })
        .unwrap_or_default();

    let modifier = [keys::ALPHA, keys::HUE].into_iter().find_map(|group| {
        let amount = raw.get(group)?;
        let inline = amount.is_number() || alias::is_alias_value(amount);
        inline.then(|| ModifierSpec {
            family: Modifier::from_group(group).unwrap_or_default(),
            amount: amount.clone(),
            base: None,
            owner: Some(owner.to_string()),
        })
    });

    let extensions = Extensions { modes, modifier };
    (!extensions.is_empty()).then_some(extensions)
}

/// `{ "$value": x }` override nodes collapse to `x`, whatever their `$type`.
fn unwrap_mode_value(value: &Value) -> Value {
    value.get(keys::VALUE).unwrap_or(value).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use serde_json::json;

    fn build(doc: &Value) -> TokenGraph {
        let config = ResolverConfig::default();
        let entries = flatten(doc).unwrap();
        TokenBuilder::new(doc, &config).build(&entries)
    }

    #[test]
    fn test_build_plain_token() {
        let doc = json!({
            "kda": { "color": {
                "$type": "color",
                "primary": { "$value": "#112233", "$description": "Brand" }
            } }
        });
        let graph = build(&doc);
        let token = graph.get("kda/color/primary").unwrap();

        assert_eq!(token.token_type, TokenType::Color);
        assert_eq!(token.title, "primary");
        assert_eq!(token.description.as_deref(), Some("Brand"));
        assert_eq!(token.group_name.as_deref(), Some("color"));
        assert!(!token.is_alias);
    }

    #[test]
    fn test_modes_and_meta() {
        let doc = json!({
            "$name": "Doc",
            "$version": "3",
            "bg": {
                "$type": "color",
                "$value": "#ffffff",
                "$extensions": { "mode": { "dark": "#000000", "contrast": "#ffff00" } }
            }
        });
        let graph = build(&doc);

        assert_eq!(graph.meta.name, "Doc");
        assert_eq!(graph.meta.version.as_deref(), Some("3"));
        assert_eq!(graph.meta.modes.as_slice(), &["light", "contrast", "dark"]);

        let token = graph.get("bg").unwrap();
        assert_eq!(token.raw_for_mode("dark", "light"), &json!("#000000"));
    }

    #[test]
    fn test_typed_composite_override_is_unwrapped() {
        let doc = json!({
            "line": {
                "$type": "border",
                "$value": { "width": 1 },
                "$extensions": { "mode": {
                    "dark": { "$type": "border", "$value": { "width": 3 } }
                } }
            }
        });
        let graph = build(&doc);
        let token = graph.get("line").unwrap();
        assert_eq!(token.raw_for_mode("dark", "light"), &json!({ "width": 3 }));
    }

    #[test]
    fn test_config_name_wins() {
        let doc = json!({ "$name": "Doc", "a": { "$value": 1 } });
        let config = ResolverConfig::default().with_collection_name("Mine");
        let entries = flatten(&doc).unwrap();
        let graph = TokenBuilder::new(&doc, &config).build(&entries);
        assert_eq!(graph.meta.name, "Mine");
    }

    #[test]
    fn test_default_collection_name() {
        let graph = build(&json!({ "a": { "b": { "$value": 1 } } }));
        assert_eq!(graph.meta.name, keys::DEFAULT_COLLECTION_NAME);
        assert_eq!(graph.meta.modes.as_slice(), &["light"]);
    }

    #[test]
    fn test_alpha_extension_token() {
        let doc = json!({
            "kda": { "color": {
                "$type": "color",
                "primary": {
                    "$value": "#112233",
                    "$description": "Brand",
                    "$extensions": { "alpha": { "50": { "$value": 50, "$base": "#ff0000" } } }
                }
            } }
        });
        let graph = build(&doc);
        let token = graph.get("kda/color/primary/alpha/50").unwrap();

        assert!(token.is_extension);
        assert_eq!(token.modifier, Modifier::Alpha);
        assert_eq!(token.token_type, TokenType::Color);
        assert_eq!(token.title, "50");
        assert_eq!(token.description.as_deref(), Some("Brand (alpha 50)"));

        let spec = token.modifier_spec().unwrap();
        assert_eq!(spec.amount, json!(50));
        assert_eq!(spec.base, Some(json!("#ff0000")));
        assert_eq!(spec.owner.as_deref(), Some("kda/color/primary"));
    }

    #[test]
    fn test_inline_alpha_modifier() {
        let doc = json!({
            "overlay": {
                "$type": "color",
                "$value": "{kda.color.primary}",
                "$extensions": { "alpha": 40 }
            }
        });
        let graph = build(&doc);
        let token = graph.get("overlay").unwrap();

        assert!(token.is_alias);
        assert_eq!(token.modifier, Modifier::Alpha);
        assert_eq!(token.modifier_spec().unwrap().amount, json!(40));
    }

    #[test]
    fn test_short_modifier_path_fails() {
        let doc = json!({ "$extensions": { "alpha": { "50": { "$value": 50 } } } });
        let graph = build(&doc);
        assert!(graph.is_empty());
        assert!(matches!(graph.failures[0].error, TokenError::PathTooShort { .. }));
    }

    #[test]
    fn test_missing_type_is_custom() {
        let graph = build(&json!({ "misc": { "thing": { "$value": "x" } } }));
        assert_eq!(graph.get("misc/thing").unwrap().token_type, TokenType::Custom);
    }
}
