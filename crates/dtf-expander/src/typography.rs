//! Typography decomposition.

use dtf_core::{alias, DimensionUnit, TokenType, UnitHint};
use dtf_parser::{font_weight_name, UnitContext};
use serde_json::{Map, Value};
use tracing::debug;

use crate::Field;

pub(crate) fn decompose(value: &Map<String, Value>, units: &UnitContext) -> Vec<Field> {
    value
        .iter()
        .filter_map(|(key, raw)| {
            let is_alias = alias::is_alias_value(raw);
            let field = match key.as_str() {
                "fontFamily" => Field::new(
                    key,
                    TokenType::FontFamily,
                    family(raw),
                    UnitHint::default(),
                ),
                "fontWeight" => {
                    let weight = if is_alias { raw.clone() } else { Value::String(font_weight_name(raw)) };
                    Field::new(key, TokenType::FontWeight, weight, UnitHint::default())
                }
                "fontSize" => {
                    let size = if is_alias { raw.clone() } else { Value::from(units.parse_font_size(Some(raw))) };
                    Field::new(key, TokenType::Dimension, size, UnitHint::pixels())
                }
                "letterSpacing" => {
                    let spacing = if is_alias { raw.clone() } else { letter_spacing(raw, units) };
                    Field::new(key, TokenType::Dimension, spacing, UnitHint::pixels())
                }
                "lineHeight" => Field::new(
                    key,
                    TokenType::Dimension,
                    raw.clone(),
                    UnitHint { default_unit: DimensionUnit::Auto, unitless_px: true },
                ),
                other => {
                    debug!(field = other, "ignoring unknown typography field");
                    return None;
                }
            };
            Some(field)
        })
        .collect()
}

/// Font stacks given as arrays collapse to a comma-separated family list.
fn family(raw: &Value) -> Value {
    match raw {
        Value::Array(items) => Value::String(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => other.clone(),
    }
}

/// Unparseable letter spacing falls back to `0px`.
fn letter_spacing(raw: &Value, units: &UnitContext) -> Value {
    let parsed = units.parse_dimension(TokenType::Dimension, raw, UnitHint::pixels());
    match parsed.value {
        Some(_) => raw.clone(),
        None => Value::String("0px".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Vec<Field> {
        decompose(value.as_object().unwrap(), &UnitContext::default())
    }

    #[test]
    fn test_typography_fields() {
        let fields = fields(json!({
            "fontFamily": ["Inter", "sans-serif"],
            "fontWeight": 700,
            "fontSize": "1.5rem",
            "letterSpacing": "normal",
            "lineHeight": 1.4
        }));

        assert_eq!(fields[0].value, json!("Inter, sans-serif"));
        assert_eq!(fields[0].token_type, TokenType::FontFamily);
        assert_eq!(fields[1].value, json!("Bold"));
        assert_eq!(fields[2].value, json!(24.0));
        assert_eq!(fields[3].value, json!("0px"));
        assert_eq!(fields[4].units.default_unit, DimensionUnit::Auto);
    }

    #[test]
    fn test_aliases_pass_through() {
        let fields = fields(json!({
            "fontWeight": "{kda.font.weight.bold}",
            "fontSize": "{kda.font.size.md}"
        }));
        assert_eq!(fields[0].value, json!("{kda.font.weight.bold}"));
        assert_eq!(fields[1].value, json!("{kda.font.size.md}"));
    }
}
