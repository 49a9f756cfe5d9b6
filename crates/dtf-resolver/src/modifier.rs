//! Alpha and hue modifiers.

use dtf_core::{alias, Color, Modifier, ModifierSpec, Token, TokenError, TokenValue};
use serde_json::Value;
use tracing::debug;

use crate::resolver::TokenResolver;
use crate::ModeValue;

/// Compute a modifier token's color in `mode`.
///
/// The base color is the entry's explicit `$base`, else the owner token
/// resolved in the same mode.
pub(crate) fn compose(
    resolver: &mut TokenResolver<'_>,
    token: &Token,
    spec: &ModifierSpec,
    mode: &str,
) -> Result<ModeValue, TokenError> {
    let base = base_color(resolver, token, spec, mode)?;

    let color = match spec.family {
        Modifier::Alpha => {
            let amount = amount(resolver, token, &spec.amount, mode)?;
            base.with_alpha((amount / 100.0).clamp(0.0, 1.0))
        }
        Modifier::Hue | Modifier::None => {
            debug!(token = %token.name, mode, "hue modifier passes the base color through");
            base
        }
    };

    Ok(ModeValue::concrete(TokenValue::Color(color)))
}

fn base_color(
    resolver: &mut TokenResolver<'_>,
    token: &Token,
    spec: &ModifierSpec,
    mode: &str,
) -> Result<Color, TokenError> {
    if let Some(base) = &spec.base {
        return resolver.resolve_color(token, base, mode);
    }

    match spec.owner.as_deref() {
        // Inline modifiers tint their own value.
        Some(owner) if owner == token.name => {
            let raw = token.raw_for_mode(mode, resolver.default_mode());
            resolver.resolve_color(token, raw, mode)
        }
        Some(owner) => {
            let resolved = resolver.resolve_mode(owner, mode)?;
            match resolved.value {
                Some(TokenValue::Color(color)) => Ok(color),
                Some(other) => Err(TokenError::TypeMismatch {
                    token: token.name.clone(),
                    expected: dtf_core::ResolvedType::Color,
                    found: format!("{other:?}"),
                }),
                None => Err(TokenError::AliasUnresolved {
                    token: token.name.clone(),
                    target: resolved.alias.unwrap_or_else(|| owner.to_string()),
                }),
            }
        }
        None => Err(TokenError::MissingValue { token: token.name.clone(), mode: mode.to_string() }),
    }
}

/// Alpha percent: a number, a numeric string, or an alias to a number.
fn amount(
    resolver: &mut TokenResolver<'_>,
    token: &Token,
    raw: &Value,
    mode: &str,
) -> Result<f64, TokenError> {
    let mismatch = || TokenError::TypeMismatch {
        token: token.name.clone(),
        expected: dtf_core::ResolvedType::Float,
        found: raw.to_string(),
    };

    if let Some(target) = alias::alias_target_of(raw) {
        let resolved = resolver.resolve_mode(&target, mode)?;
        return match resolved.value {
            Some(value) => value.as_f64().ok_or_else(mismatch),
            None => Err(TokenError::AliasUnresolved { token: token.name.clone(), target }),
        };
    }

    match raw {
        Value::Number(n) => n.as_f64().ok_or_else(mismatch),
        Value::String(s) => s.trim().trim_end_matches('%').parse().map_err(|_| mismatch()),
        _ => Err(mismatch()),
    }
}
