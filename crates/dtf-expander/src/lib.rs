//! Composite token decomposition.
//!
//! This crate handles:
//! - Splitting border, shadow, blur and typography values into sub-tokens
//! - Dereferencing composite values given as aliases
//! - Splitting per-mode composite overrides onto the sub-tokens
//! - Collecting icon records

mod border;
mod effects;
mod icon;
mod typography;

pub use icon::{component_name, IconRecord};

use dtf_core::keys;
use dtf_core::{
    alias, CompositeKind, CompositeOrigin, Extensions, Modifier, Token, TokenError, TokenGraph,
    TokenType, UnitHint,
};
use dtf_parser::UnitContext;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// One primitive field of a composite value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub token_type: TokenType,
    pub value: Value,
    pub units: UnitHint,
}

impl Field {
    pub fn new(name: &str, token_type: TokenType, value: Value, units: UnitHint) -> Self {
        Self { name: name.to_string(), token_type, value, units }
    }
}

/// A decomposed composite token: the style or variable group its sub-tokens feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub name: String,
    pub kind: CompositeKind,
    pub description: Option<String>,
    /// Field name to sub-token name, in source order.
    pub fields: IndexMap<String, String>,
    /// Blur visibility; always true for other kinds.
    pub visible: bool,
}

impl Composite {
    /// Sub-token name of a field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Result of expanding a token graph.
#[derive(Debug, Clone)]
pub struct Expansion {
    /// Scalar tokens and composite sub-tokens; composite parents are removed.
    pub graph: TokenGraph,
    pub composites: Vec<Composite>,
    pub icons: Vec<IconRecord>,
}

/// Expand every composite token of `graph`.
///
/// Decomposition failures are recorded on the returned graph.
pub fn expand(graph: &TokenGraph, units: &UnitContext) -> Expansion {
    CompositeExpander::new(graph, units).expand_all()
}

struct CompositeExpander<'a> {
    source: &'a TokenGraph,
    units: &'a UnitContext,
    graph: TokenGraph,
    composites: Vec<Composite>,
    icons: Vec<IconRecord>,
}

impl<'a> CompositeExpander<'a> {
    fn new(source: &'a TokenGraph, units: &'a UnitContext) -> Self {
        let mut graph = TokenGraph::new(source.meta.clone());
        graph.failures = source.failures.clone();
        Self { source, units, graph, composites: Vec::new(), icons: Vec::new() }
    }

    fn expand_all(mut self) -> Expansion {
        let source = self.source;
        for token in source.iter() {
            let Some(kind) = token.token_type.composite_kind() else {
                self.insert(token.clone());
                continue;
            };

            if let Err(err) = self.expand_token(token, kind) {
                warn!(token = %token.name, error = %err, "composite not expanded");
                self.graph.record_failure(token.name.clone(), err);
            }
        }

        Expansion { graph: self.graph, composites: self.composites, icons: self.icons }
    }

    fn insert(&mut self, token: Token) {
        let name = token.name.clone();
        if !self.graph.insert(token) {
            warn!(token = %name, "duplicate token name, keeping the first");
        }
    }

    fn expand_token(&mut self, token: &Token, kind: CompositeKind) -> Result<(), TokenError> {
        let value = deref_composite(self.source, &token.name, &token.value)?;

        if kind == CompositeKind::Icon {
            let markup = value.as_str().ok_or_else(|| TokenError::CompositeDecomposition {
                token: token.name.clone(),
                reason: "icon value must be markup".to_string(),
            })?;
            self.icons.push(IconRecord::new(token, markup));
            return Ok(());
        }

        let object = as_object(&token.name, value)?;
        let (fields, visible) = self.decompose(kind, object);

        let mut record = Composite {
            name: token.name.clone(),
            kind,
            description: token.description.clone(),
            fields: IndexMap::new(),
            visible,
        };
        let mut subs: Vec<Token> = fields
            .into_iter()
            .map(|field| {
                let sub = sub_token(token, kind, field);
                record.fields.insert(sub.title.clone(), sub.name.clone());
                sub
            })
            .collect();

        self.split_mode_overrides(token, kind, &mut subs);

        for sub in subs {
            self.insert(sub);
        }
        debug!(token = %token.name, fields = record.fields.len(), "composite expanded");
        self.composites.push(record);
        Ok(())
    }

    fn decompose(&self, kind: CompositeKind, value: &Map<String, Value>) -> (Vec<Field>, bool) {
        match kind {
            CompositeKind::Border => (border::decompose(value, self.units), true),
            CompositeKind::Shadow => (effects::shadow(value), true),
            CompositeKind::Blur => effects::blur(value),
            CompositeKind::Typography => (typography::decompose(value, self.units), true),
            CompositeKind::Icon => (Vec::new(), true),
        }
    }

    /// Per-mode composite overrides become per-mode values of the matching sub-tokens.
    fn split_mode_overrides(&self, token: &Token, kind: CompositeKind, subs: &mut [Token]) {
        let Some(modes) = token.extensions.as_ref().map(|e| &e.modes) else {
            return;
        };

        for (mode, raw) in modes {
            let object = deref_composite(self.source, &token.name, raw)
                .and_then(|value| as_object(&token.name, value));
            let object = match object {
                Ok(object) => object,
                Err(err) => {
                    warn!(token = %token.name, mode = %mode, error = %err, "mode override ignored");
                    continue;
                }
            };

            for field in self.decompose(kind, object).0 {
                match subs.iter_mut().find(|sub| sub.title == field.name) {
                    Some(sub) => {
                        sub.extensions
                            .get_or_insert_with(Extensions::default)
                            .modes
                            .insert(mode.clone(), field.value);
                    }
                    None => {
                        warn!(token = %token.name, mode = %mode, field = %field.name, "override field has no base value");
                    }
                }
            }
        }
    }
}

/// Follow alias values to another composite token's raw value.
fn deref_composite<'g>(
    graph: &'g TokenGraph,
    origin: &str,
    value: &'g Value,
) -> Result<&'g Value, TokenError> {
    let mut stack = vec![origin.to_string()];
    let mut current = value;

    while let Some(target) = alias::alias_target_of(current) {
        if stack.contains(&target) {
            stack.push(target);
            return Err(TokenError::AliasCycle { cycle: stack });
        }
        let next = graph.get(&target).ok_or_else(|| TokenError::CompositeDecomposition {
            token: origin.to_string(),
            reason: format!("alias target {target} not found"),
        })?;
        stack.push(target);
        current = &next.value;
    }

    Ok(current)
}

fn as_object<'v>(token: &str, value: &'v Value) -> Result<&'v Map<String, Value>, TokenError> {
    value.as_object().ok_or_else(|| TokenError::CompositeDecomposition {
        token: token.to_string(),
        reason: format!("expected an object, got {value}"),
    })
}

fn sub_token(parent: &Token, kind: CompositeKind, field: Field) -> Token {
    let path = parent
        .path
        .without_value_key()
        .child(field.name.as_str())
        .child(keys::VALUE);
    let roles = path.roles();

    Token {
        name: format!("{}{}{}", parent.name, keys::NAME_DELIMITER, field.name),
        token_type: field.token_type,
        title: field.name.clone(),
        description: parent.description.clone(),
        is_alias: alias::is_alias_value(&field.value),
        value: field.value,
        is_extension: parent.is_extension,
        modifier: Modifier::None,
        extensions: None,
        root_key: roles.root_key.map(str::to_string),
        group_name: roles.group_name.map(str::to_string),
        parent_key: roles.parent_key.map(str::to_string),
        units: field.units,
        composite: Some(CompositeOrigin { parent: parent.name.clone(), kind, field: field.name }),
        path,
    }
}
