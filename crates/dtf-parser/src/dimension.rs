//! Dimension, font-size, and font-weight normalization.

use dtf_core::keys;
use dtf_core::{Dimension, DimensionUnit, TokenError, TokenType, UnitHint};
use nom::combinator::all_consuming;
use serde_json::Value;
use tracing::debug;

use crate::lexer;

/// Unit conversions that depend on the document's base font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitContext {
    /// Pixel size of `1rem`.
    pub base_font_size: f64,
}

impl Default for UnitContext {
    fn default() -> Self {
        Self { base_font_size: keys::BASE_FONT_SIZE }
    }
}

impl UnitContext {
    pub fn new(base_font_size: f64) -> Self {
        Self { base_font_size }
    }

    /// Parse a dimension, falling back to `{None, hint.default_unit}`.
    ///
    /// Unparseable values are logged and never fatal.
    pub fn parse_dimension(&self, token_type: TokenType, raw: &Value, hint: UnitHint) -> Dimension {
        match self.try_parse_dimension(token_type, raw, hint) {
            Ok(dimension) => dimension,
            Err(err) => {
                debug!(error = %err, "dimension fallback");
                Dimension::unset(hint.default_unit)
            }
        }
    }

    /// Strict form of [`UnitContext::parse_dimension`].
    pub fn try_parse_dimension(
        &self,
        token_type: TokenType,
        raw: &Value,
        hint: UnitHint,
    ) -> Result<Dimension, TokenError> {
        let unitless_px = token_type == TokenType::Number || hint.unitless_px;
        let parse_error = || TokenError::DimensionParse { value: raw_text(raw) };

        match raw {
            Value::Number(n) if unitless_px => n.as_f64().map(Dimension::px).ok_or_else(parse_error),
            Value::String(s) => {
                let (_, (value, unit)) = all_consuming(lexer::dimension)(s.as_str()).map_err(|_| parse_error())?;
                match unit {
                    Some(unit) => Ok(self.with_unit(value, unit)),
                    None if unitless_px => Ok(Dimension::px(value)),
                    None => Err(parse_error()),
                }
            }
            _ => Err(parse_error()),
        }
    }

    fn with_unit(&self, value: f64, unit: &str) -> Dimension {
        match unit {
            "%" => Dimension::percent(value),
            "rem" => Dimension::px(value * self.base_font_size),
            _ => Dimension::px(value),
        }
    }

    /// Font size in pixels; absent or unparseable values give the base font size.
    pub fn parse_font_size(&self, raw: Option<&Value>) -> f64 {
        match raw {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(self.base_font_size),
            Some(Value::String(s)) => match all_consuming(lexer::dimension)(s.as_str()) {
                Ok((_, (value, Some("rem")))) => value * self.base_font_size,
                Ok((_, (value, _))) => value,
                Err(_) => self.base_font_size,
            },
            _ => self.base_font_size,
        }
    }
}

/// Parse a dimension with the default base font size.
///
/// NUMBER tokens read bare numbers as pixels; other types fall back to
/// `default_unit` with no value.
pub fn parse_dimension(token_type: TokenType, raw: &Value, default_unit: DimensionUnit) -> Dimension {
    let hint = UnitHint { default_unit, unitless_px: false };
    UnitContext::default().parse_dimension(token_type, raw, hint)
}

/// Font size with the default base font size.
pub fn parse_font_size(raw: Option<&Value>) -> f64 {
    UnitContext::default().parse_font_size(raw)
}

/// Map a numeric CSS font weight to its style name. Strings pass through.
pub fn font_weight_name(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => weight_name(n.as_f64().unwrap_or_default()).to_string(),
        _ => "Regular".to_string(),
    }
}

fn weight_name(weight: f64) -> &'static str {
    match weight as i64 {
        _ if weight.fract() != 0.0 => "Regular",
        100 => "Thin",
        200 => "Extra-Light",
        300 => "Light",
        400 => "Normal",
        500 => "Medium",
        600 => "Semi-Bold",
        700 => "Bold",
        800 => "Extra-bold",
        900 => "Black",
        950 => "Extra-black",
        _ => "Regular",
    }
}

fn raw_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
