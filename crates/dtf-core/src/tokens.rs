//! Token system types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::alias::alias_target_of;
use crate::errors::{TokenError, TokenFailure};
use crate::path::TokenPath;
use crate::types::{CompositeKind, DimensionUnit, Modifier, TokenType};

/// One flattened `(path, value)` pair from the source tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub path: TokenPath,
    pub value: Value,
}

impl RawEntry {
    pub fn new(path: TokenPath, value: Value) -> Self {
        Self { path, value }
    }
}

/// Ordered mode names. The first entry is always the default mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSet(Vec<String>);

impl ModeSet {
    /// Build from the default mode and every discovered mode name.
    ///
    /// Discovered names are sorted and de-duplicated; the default is never repeated.
    pub fn new<I, S>(default_mode: &str, discovered: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rest: Vec<String> = discovered
            .into_iter()
            .map(Into::into)
            .filter(|m| m != default_mode)
            .collect();
        rest.sort();
        rest.dedup();

        let mut modes = Vec::with_capacity(rest.len() + 1);
        modes.push(default_mode.to_string());
        modes.extend(rest);
        ModeSet(modes)
    }

    pub fn default_mode(&self) -> &str {
        &self.0[0]
    }

    pub fn is_default(&self, mode: &str) -> bool {
        self.default_mode() == mode
    }

    pub fn contains(&self, mode: &str) -> bool {
        self.0.iter().any(|m| m == mode)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a mode set holds at least the default mode.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ModeSet {
    fn default() -> Self {
        ModeSet::new(crate::keys::DEFAULT_MODE, std::iter::empty::<String>())
    }
}

/// How unit-less and unparseable dimension values are read for a token.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitHint {
    pub default_unit: DimensionUnit,
    /// Bare numbers are pixels even when the token is not a NUMBER.
    pub unitless_px: bool,
}

impl UnitHint {
    pub fn pixels() -> Self {
        Self { default_unit: DimensionUnit::Pixels, unitless_px: true }
    }

    pub fn auto() -> Self {
        Self { default_unit: DimensionUnit::Auto, unitless_px: true }
    }
}

/// A modifier token's payload, narrowed from its `$extensions` group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierSpec {
    pub family: Modifier,
    /// Alpha percent (0-100) or hue shift; may be an alias.
    pub amount: Value,
    /// Explicit `$base` color (or alias) of the modifier entry.
    pub base: Option<Value>,
    /// Token that declares the `$extensions` group.
    pub owner: Option<String>,
}

/// Extension payload copied from the token that declares `$extensions`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Extensions {
    /// Per-mode overrides keyed by mode name.
    pub modes: IndexMap<String, Value>,
    pub modifier: Option<ModifierSpec>,
}

impl Extensions {
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty() && self.modifier.is_none()
    }

    pub fn mode_value(&self, mode: &str) -> Option<&Value> {
        self.modes.get(mode).filter(|v| !v.is_null())
    }
}

/// Where a decomposed sub-token came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeOrigin {
    pub parent: String,
    pub kind: CompositeKind,
    pub field: String,
}

/// A built, unresolved token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Canonical slash-joined name, unique within a pass.
    pub name: String,
    pub token_type: TokenType,
    pub title: String,
    pub description: Option<String>,
    /// Raw source value.
    pub value: Value,
    pub is_alias: bool,
    /// The token itself lives under an `$extensions` group.
    pub is_extension: bool,
    pub modifier: Modifier,
    pub extensions: Option<Extensions>,
    pub path: TokenPath,
    pub root_key: Option<String>,
    pub group_name: Option<String>,
    pub parent_key: Option<String>,
    pub units: UnitHint,
    pub composite: Option<CompositeOrigin>,
}

impl Token {
    /// A plain token whose path mirrors its name.
    pub fn new(name: impl Into<String>, token_type: TokenType, value: Value) -> Self {
        let name = name.into();
        let path = TokenPath::from_name(&name);
        let roles = path.roles();
        let owned = |s: Option<&str>| s.map(str::to_string);
        Self {
            title: roles.key.unwrap_or_default().to_string(),
            root_key: owned(roles.group_name),
            group_name: owned(roles.parent_key),
            parent_key: owned(roles.key),
            is_alias: crate::alias::is_alias_value(&value),
            name,
            token_type,
            description: None,
            value,
            is_extension: false,
            modifier: Modifier::None,
            extensions: None,
            path: path.child(crate::keys::VALUE),
            units: UnitHint::default(),
            composite: None,
        }
    }

    /// Raw value for a mode: the override in non-default modes, else the base value.
    pub fn raw_for_mode(&self, mode: &str, default_mode: &str) -> &Value {
        if mode != default_mode {
            if let Some(value) = self.extensions.as_ref().and_then(|e| e.mode_value(mode)) {
                return value;
            }
        }
        &self.value
    }

    /// Target name when the base value is an alias.
    pub fn alias_target(&self) -> Option<String> {
        alias_target_of(&self.value)
    }

    pub fn modifier_spec(&self) -> Option<&ModifierSpec> {
        self.extensions.as_ref().and_then(|e| e.modifier.as_ref())
    }

    /// Whether this token becomes a store variable.
    ///
    /// Composites become styles or icons; only border fields are variables.
    pub fn is_variable(&self) -> bool {
        !self.token_type.is_composite()
            && self
                .composite
                .as_ref()
                .map_or(true, |origin| origin.kind == CompositeKind::Border)
    }
}

/// Collection-level metadata of a token document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMeta {
    pub name: String,
    pub version: Option<String>,
    pub modes: ModeSet,
}

/// All tokens built from one source document, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGraph {
    pub meta: CollectionMeta,
    tokens: IndexMap<String, Token>,
    /// Entries that could not become tokens.
    pub failures: Vec<TokenFailure>,
}

impl TokenGraph {
    pub fn new(meta: CollectionMeta) -> Self {
        Self { meta, tokens: IndexMap::new(), failures: Vec::new() }
    }

    /// Insert a token; returns `false` and keeps the existing one on a name clash.
    pub fn insert(&mut self, token: Token) -> bool {
        if self.tokens.contains_key(&token.name) {
            return false;
        }
        self.tokens.insert(token.name.clone(), token);
        true
    }

    pub fn record_failure(&mut self, token: impl Into<String>, error: TokenError) {
        self.failures.push(TokenFailure::new(token, error));
    }

    /// Get a token by name.
    pub fn get(&self, name: &str) -> Option<&Token> {
        self.tokens.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.contains_key(name)
    }

    /// Iterate over all tokens.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_set_order() {
        let modes = ModeSet::new("light", ["dark", "contrast", "dark", "light"]);
        assert_eq!(modes.as_slice(), &["light", "contrast", "dark"]);
        assert_eq!(modes.default_mode(), "light");
        assert!(modes.contains("dark"));
    }

    #[test]
    fn test_raw_for_mode() {
        let mut token = Token::new("kda/color/bg", TokenType::Color, json!("#ffffff"));
        let mut extensions = Extensions::default();
        extensions.modes.insert("dark".into(), json!("#000000"));
        token.extensions = Some(extensions);

        assert_eq!(token.raw_for_mode("light", "light"), &json!("#ffffff"));
        assert_eq!(token.raw_for_mode("dark", "light"), &json!("#000000"));
        assert_eq!(token.raw_for_mode("contrast", "light"), &json!("#ffffff"));
    }

    #[test]
    fn test_token_new_roles() {
        let token = Token::new("kda/border/default", TokenType::Border, json!({}));
        assert_eq!(token.parent_key.as_deref(), Some("default"));
        assert_eq!(token.group_name.as_deref(), Some("border"));
        assert_eq!(token.path.to_name(), "kda/border/default");
        assert!(!token.is_variable());
    }

    #[test]
    fn test_graph_keeps_first_duplicate() {
        let meta = CollectionMeta {
            name: "c".into(),
            version: None,
            modes: ModeSet::default(),
        };
        let mut graph = TokenGraph::new(meta);
        assert!(graph.insert(Token::new("a/b", TokenType::Number, json!(1))));
        assert!(!graph.insert(Token::new("a/b", TokenType::Number, json!(2))));
        assert_eq!(graph.get("a/b").map(|t| t.value.clone()), Some(json!(1)));
        assert_eq!(graph.len(), 1);
    }
}
