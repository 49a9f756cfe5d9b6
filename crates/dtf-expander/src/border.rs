//! Border decomposition: `width`, `color` and `style` sub-tokens.

use dtf_core::{alias, TokenType, UnitHint};
use dtf_parser::UnitContext;
use serde_json::{Map, Value};
use tracing::debug;

use crate::Field;

pub(crate) fn decompose(value: &Map<String, Value>, units: &UnitContext) -> Vec<Field> {
    value
        .iter()
        .filter_map(|(key, raw)| match key.as_str() {
            "width" => Some(Field::new(
                "width",
                TokenType::Dimension,
                normalize_width(raw, units),
                UnitHint::pixels(),
            )),
            "color" => Some(Field::new("color", TokenType::Color, raw.clone(), UnitHint::default())),
            "style" => Some(Field::new("style", TokenType::Custom, raw.clone(), UnitHint::default())),
            other => {
                debug!(field = other, "ignoring unknown border field");
                None
            }
        })
        .collect()
}

/// Widths are written back with their unit symbol so bare numbers read as pixels.
fn normalize_width(raw: &Value, units: &UnitContext) -> Value {
    if alias::is_alias_value(raw) {
        return raw.clone();
    }
    let parsed = units.parse_dimension(TokenType::Number, raw, UnitHint::pixels());
    match parsed.value {
        Some(width) => Value::String(format!("{width}{}", parsed.unit.symbol())),
        None => raw.clone(),
    }
}
