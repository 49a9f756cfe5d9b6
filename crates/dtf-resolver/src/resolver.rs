//! Token resolution.
//!
//! Resolves every token in every mode: alias references are followed
//! depth-first through the token set, concrete values are normalized to
//! [`TokenValue`]s.

use std::collections::HashMap;

use dtf_core::{
    alias, Color, Token, TokenError, TokenFailure, TokenGraph, TokenType, TokenValue,
};
use dtf_parser::{font_weight_name, parse_color_value, UnitContext};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::modifier;
use crate::{ModeValue, ResolutionState, ResolvedToken};

/// Resolves the tokens of one graph, memoizing per `(token, mode)`.
pub struct TokenResolver<'a> {
    graph: &'a TokenGraph,
    units: UnitContext,
    memo: HashMap<(String, String), Result<ModeValue, TokenError>>,
    /// Track the current resolution path for circular reference detection.
    resolution_stack: Vec<String>,
}

impl<'a> TokenResolver<'a> {
    pub fn new(graph: &'a TokenGraph, units: UnitContext) -> Self {
        Self {
            graph,
            units,
            memo: HashMap::new(),
            resolution_stack: Vec::new(),
        }
    }

    pub fn graph(&self) -> &'a TokenGraph {
        self.graph
    }

    pub fn default_mode(&self) -> &'a str {
        self.graph.meta.modes.default_mode()
    }

    /// Resolve every token in every mode.
    ///
    /// A token with any failing mode is left out and reported once.
    pub fn resolve_all(&mut self) -> (IndexMap<String, ResolvedToken>, Vec<TokenFailure>) {
        let graph = self.graph;
        let mut tokens = IndexMap::with_capacity(graph.len());
        let mut failures = Vec::new();

        for token in graph.iter() {
            match self.resolve_token(token) {
                Ok(resolved) => {
                    tokens.insert(token.name.clone(), resolved);
                }
                Err(err) => {
                    debug!(token = %token.name, error = %err, "token failed to resolve");
                    failures.push(TokenFailure::new(token.name.clone(), err));
                }
            }
        }

        (tokens, failures)
    }

    /// Resolve one token in every mode of the graph.
    pub fn resolve_token(&mut self, token: &Token) -> Result<ResolvedToken, TokenError> {
        let graph = self.graph;
        let mut values = IndexMap::with_capacity(graph.meta.modes.len());
        for mode in graph.meta.modes.iter() {
            values.insert(mode.to_string(), self.resolve_mode(&token.name, mode)?);
        }

        let state = if values.values().any(ModeValue::is_pending) {
            ResolutionState::AliasPending
        } else if values.values().any(|v| v.alias.is_some()) {
            ResolutionState::AliasResolved
        } else {
            ResolutionState::Concrete
        };

        Ok(ResolvedToken {
            name: token.name.clone(),
            token_type: token.token_type,
            resolved_type: token.token_type.resolved_type(),
            title: token.title.clone(),
            description: token.description.clone(),
            prev_value: token.value.clone(),
            values,
            state,
            is_variable: token.is_variable(),
            composite: token.composite.clone(),
        })
    }

    /// Value of the token named `name` in `mode`.
    ///
    /// Names outside the graph resolve to a pending alias marker.
    pub fn resolve_mode(&mut self, name: &str, mode: &str) -> Result<ModeValue, TokenError> {
        let key = (name.to_string(), mode.to_string());
        if let Some(cached) = self.memo.get(&key) {
            return cached.clone();
        }

        // Check for circular reference
        if self.resolution_stack.iter().any(|n| n == name) {
            let mut cycle = self.resolution_stack.clone();
            cycle.push(name.to_string());
            return Err(TokenError::AliasCycle { cycle });
        }

        let graph = self.graph;
        let Some(token) = graph.get(name) else {
            return Ok(ModeValue::aliased(name, None));
        };

        self.resolution_stack.push(name.to_string());
        let result = match token.modifier_spec() {
            Some(spec) => modifier::compose(self, token, spec, mode),
            None => self.resolve_plain(token, mode),
        };
        self.resolution_stack.pop();

        self.memo.insert(key, result.clone());
        result
    }

    /// Value of `token` in `mode`, ignoring any modifier it declares.
    pub(crate) fn resolve_plain(&mut self, token: &Token, mode: &str) -> Result<ModeValue, TokenError> {
        let raw = token.raw_for_mode(mode, self.default_mode());
        self.resolve_raw(token, raw, mode)
    }

    /// Resolve a raw value in the context of `token`.
    pub(crate) fn resolve_raw(
        &mut self,
        token: &Token,
        raw: &Value,
        mode: &str,
    ) -> Result<ModeValue, TokenError> {
        match alias::alias_target_of(raw) {
            Some(target) => {
                let resolved = self.resolve_mode(&target, mode)?;
                Ok(ModeValue::aliased(target, resolved.value))
            }
            None => self.normalize(token, raw, mode).map(ModeValue::concrete),
        }
    }

    /// Resolve a raw value that must end up as a color.
    pub(crate) fn resolve_color(
        &mut self,
        token: &Token,
        raw: &Value,
        mode: &str,
    ) -> Result<Color, TokenError> {
        let resolved = self.resolve_raw(token, raw, mode)?;
        match (resolved.value, resolved.alias) {
            (Some(TokenValue::Color(color)), _) => Ok(color),
            (None, Some(target)) => Err(TokenError::AliasUnresolved { token: token.name.clone(), target }),
            (Some(TokenValue::String(s)), _) => parse_color_value(&Value::String(s)),
            (other, _) => Err(TokenError::TypeMismatch {
                token: token.name.clone(),
                expected: dtf_core::ResolvedType::Color,
                found: format!("{other:?}"),
            }),
        }
    }

    /// Normalize a concrete raw value according to the token's type.
    fn normalize(&self, token: &Token, raw: &Value, mode: &str) -> Result<TokenValue, TokenError> {
        if raw.is_null() {
            return Err(TokenError::MissingValue { token: token.name.clone(), mode: mode.to_string() });
        }

        match token.token_type {
            TokenType::Color => parse_color_value(raw).map(TokenValue::Color),
            TokenType::Dimension => Ok(TokenValue::Dimension(self.units.parse_dimension(
                token.token_type,
                raw,
                token.units,
            ))),
            TokenType::Number => match raw {
                Value::Number(n) => n.as_f64().map(TokenValue::Number).ok_or_else(|| mismatch(token, raw)),
                _ => self
                    .units
                    .try_parse_dimension(token.token_type, raw, token.units)
                    .ok()
                    .and_then(|d| d.value)
                    .map(TokenValue::Number)
                    .ok_or_else(|| mismatch(token, raw)),
            },
            TokenType::FontWeight => Ok(TokenValue::String(font_weight_name(raw))),
            _ => text(raw).map(TokenValue::String).ok_or_else(|| mismatch(token, raw)),
        }
    }
}

fn text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn mismatch(token: &Token, raw: &Value) -> TokenError {
    TokenError::TypeMismatch {
        token: token.name.clone(),
        expected: token.token_type.resolved_type(),
        found: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtf_core::{CollectionMeta, Dimension, ModeSet};
    use serde_json::json;

    fn graph(tokens: Vec<Token>) -> TokenGraph {
        let meta = CollectionMeta {
            name: "test".into(),
            version: None,
            modes: ModeSet::new("light", ["dark"]),
        };
        let mut graph = TokenGraph::new(meta);
        for token in tokens {
            graph.insert(token);
        }
        graph
    }

    #[test]
    fn test_resolve_color_token() {
        let graph = graph(vec![Token::new("colors/primary", TokenType::Color, json!("#ff0000"))]);
        let mut resolver = TokenResolver::new(&graph, UnitContext::default());

        let value = resolver.resolve_mode("colors/primary", "light").unwrap();
        assert_eq!(value, ModeValue::concrete(TokenValue::Color(Color::rgb(1.0, 0.0, 0.0))));
    }

    #[test]
    fn test_alias_chain() {
        let graph = graph(vec![
            Token::new("a", TokenType::Number, json!(4)),
            Token::new("b", TokenType::Number, json!("{x.a}")),
            Token::new("x/a", TokenType::Number, json!("{y.a}")),
            Token::new("y/a", TokenType::Number, json!(8)),
        ]);
        let mut resolver = TokenResolver::new(&graph, UnitContext::default());

        let value = resolver.resolve_mode("b", "dark").unwrap();
        assert_eq!(value.alias.as_deref(), Some("x/a"));
        assert_eq!(value.value, Some(TokenValue::Number(8.0)));
    }

    #[test]
    fn test_circular_reference_detection() {
        let graph = graph(vec![
            Token::new("c/a", TokenType::Color, json!("{c.b}")),
            Token::new("c/b", TokenType::Color, json!("{c.a}")),
        ]);
        let mut resolver = TokenResolver::new(&graph, UnitContext::default());

        let err = resolver.resolve_mode("c/a", "light").unwrap_err();
        assert_eq!(err.to_string(), "Circular alias reference: c/a -> c/b -> c/a");
    }

    #[test]
    fn test_unknown_target_is_pending() {
        let graph = graph(vec![Token::new("c/a", TokenType::Color, json!("{lib.blue}"))]);
        let mut resolver = TokenResolver::new(&graph, UnitContext::default());

        let value = resolver.resolve_mode("c/a", "light").unwrap();
        assert!(value.is_pending());
        assert_eq!(value.alias.as_deref(), Some("lib/blue"));
    }

    #[test]
    fn test_number_from_unit_string() {
        let graph = graph(vec![
            Token::new("n", TokenType::Number, json!("2px")),
            Token::new("d", TokenType::Dimension, json!(3)),
        ]);
        let mut resolver = TokenResolver::new(&graph, UnitContext::default());

        let n = resolver.resolve_mode("n", "light").unwrap();
        assert_eq!(n.value, Some(TokenValue::Number(2.0)));

        let d = resolver.resolve_mode("d", "light").unwrap();
        assert_eq!(d.value, Some(TokenValue::Dimension(Dimension::unset(Default::default()))));
    }

    #[test]
    fn test_missing_value() {
        let graph = graph(vec![Token::new("s", TokenType::Custom, Value::Null)]);
        let mut resolver = TokenResolver::new(&graph, UnitContext::default());
        assert!(matches!(
            resolver.resolve_mode("s", "light"),
            Err(TokenError::MissingValue { .. })
        ));
    }
}
