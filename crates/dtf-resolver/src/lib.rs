//! Mode and alias resolution for DTF token graphs.
//!
//! This crate handles:
//! - Per-mode value selection (mode overrides over base values)
//! - Alias resolution with cycle detection
//! - Alpha and hue modifier composition
//! - Unit and color normalization of concrete values
//! - Text and effect style assembly from composite sub-tokens

mod modifier;
mod resolver;
mod styles;

pub use resolver::TokenResolver;
pub use styles::{Effect, EffectStyle, TextStyle};

use dtf_core::{
    CollectionMeta, CompositeOrigin, ResolvedType, ResolverConfig, SourceError, TokenFailure,
    TokenGraph, TokenType, TokenValue,
};
use dtf_expander::IconRecord;
use dtf_parser::UnitContext;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Value of a token in one mode.
///
/// Concrete values carry only `value`; alias-resolved values carry both the
/// target name and its value; pending aliases carry only the target name.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeValue {
    pub value: Option<TokenValue>,
    pub alias: Option<String>,
}

impl ModeValue {
    pub fn concrete(value: TokenValue) -> Self {
        Self { value: Some(value), alias: None }
    }

    pub fn aliased(target: impl Into<String>, value: Option<TokenValue>) -> Self {
        Self { value, alias: Some(target.into()) }
    }

    /// Alias whose target lies outside the token set.
    pub fn is_pending(&self) -> bool {
        self.value.is_none() && self.alias.is_some()
    }
}

/// Where a token ended up after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// Every mode has a literal value.
    Concrete,
    /// At least one mode follows an alias inside the token set.
    AliasResolved,
    /// At least one mode aliases a token outside the set.
    AliasPending,
}

/// A token with a value for every mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedToken {
    pub name: String,
    pub token_type: TokenType,
    pub resolved_type: ResolvedType,
    pub title: String,
    pub description: Option<String>,
    /// Raw default-mode value before normalization.
    pub prev_value: Value,
    /// Values keyed by mode name, in mode order.
    pub values: IndexMap<String, ModeValue>,
    pub state: ResolutionState,
    /// Whether this token is written to the store as a variable.
    pub is_variable: bool,
    pub composite: Option<CompositeOrigin>,
}

impl ResolvedToken {
    pub fn value_in(&self, mode: &str) -> Option<&ModeValue> {
        self.values.get(mode)
    }

    /// Whether any mode binds to another variable.
    pub fn has_alias(&self) -> bool {
        self.values.values().any(|v| v.alias.is_some())
    }

    /// Targets outside the token set.
    pub fn pending_targets(&self) -> impl Iterator<Item = &str> {
        self.values
            .values()
            .filter(|v| v.is_pending())
            .filter_map(|v| v.alias.as_deref())
    }
}

/// Immutable output of one resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSet {
    pub meta: CollectionMeta,
    pub tokens: IndexMap<String, ResolvedToken>,
    pub text_styles: Vec<TextStyle>,
    pub effect_styles: Vec<EffectStyle>,
    pub icons: Vec<IconRecord>,
    pub failures: Vec<TokenFailure>,
}

impl ResolvedSet {
    pub fn get(&self, name: &str) -> Option<&ResolvedToken> {
        self.tokens.get(name)
    }

    /// Tokens materialized as store variables, in source order.
    pub fn variables(&self) -> impl Iterator<Item = &ResolvedToken> {
        self.tokens.values().filter(|t| t.is_variable)
    }

    /// Number of aliases whose targets lie outside the set.
    pub fn pending_count(&self) -> usize {
        self.tokens
            .values()
            .filter(|t| t.state == ResolutionState::AliasPending)
            .count()
    }
}

/// Expand and resolve a token graph.
pub fn resolve(graph: &TokenGraph, config: &ResolverConfig) -> ResolvedSet {
    let units = UnitContext::new(config.base_font_size);
    let expansion = dtf_expander::expand(graph, &units);

    let mut resolver = TokenResolver::new(&expansion.graph, units);
    let (tokens, mut failures) = resolver.resolve_all();

    let default_mode = expansion.graph.meta.modes.default_mode().to_string();
    let (text_styles, effect_styles) =
        styles::assemble(&expansion.composites, &tokens, &default_mode, &units);

    let mut all_failures = expansion.graph.failures.clone();
    all_failures.append(&mut failures);

    debug!(
        tokens = tokens.len(),
        text_styles = text_styles.len(),
        effect_styles = effect_styles.len(),
        failures = all_failures.len(),
        "token set resolved"
    );

    ResolvedSet {
        meta: expansion.graph.meta.clone(),
        tokens,
        text_styles,
        effect_styles,
        icons: expansion.icons,
        failures: all_failures,
    }
}

/// Parse, expand and resolve a source document.
pub fn resolve_source(root: &Value, config: &ResolverConfig) -> Result<ResolvedSet, SourceError> {
    let graph = dtf_parser::parse_source(root, config)?;
    Ok(resolve(&graph, config))
}
