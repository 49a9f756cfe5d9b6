//! Shadow and blur decomposition.

use dtf_core::{TokenType, UnitHint};
use serde_json::{Map, Value};
use tracing::debug;

use crate::Field;

const VISIBLE: &str = "visible";

pub(crate) fn shadow(value: &Map<String, Value>) -> Vec<Field> {
    value
        .iter()
        .filter_map(|(key, raw)| {
            let token_type = match key.as_str() {
                "color" => TokenType::Color,
                "offsetX" | "offsetY" => TokenType::Number,
                "blur" | "spread" => TokenType::Dimension,
                other => {
                    debug!(field = other, "ignoring unknown shadow field");
                    return None;
                }
            };
            let units = match token_type {
                TokenType::Color => UnitHint::default(),
                _ => UnitHint::pixels(),
            };
            Some(Field::new(key, token_type, raw.clone(), units))
        })
        .collect()
}

/// Blur fields and the `visible` flag (default true).
pub(crate) fn blur(value: &Map<String, Value>) -> (Vec<Field>, bool) {
    let visible = value.get(VISIBLE).and_then(Value::as_bool).unwrap_or(true);
    let fields = value
        .get("radius")
        .map(|raw| Field::new("radius", TokenType::Dimension, raw.clone(), UnitHint::pixels()))
        .into_iter()
        .collect();
    (fields, visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shadow_fields() {
        let value = json!({
            "color": "#00000040",
            "offsetX": 0,
            "offsetY": "2px",
            "blur": "4px",
            "spread": 0,
            "type": "dropShadow"
        });
        let fields = shadow(value.as_object().unwrap());
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["color", "offsetX", "offsetY", "blur", "spread"]);
        assert_eq!(fields[1].token_type, TokenType::Number);
        assert_eq!(fields[3].token_type, TokenType::Dimension);
    }

    #[test]
    fn test_blur_visibility() {
        let value = json!({ "radius": "8px", "visible": false });
        let (fields, visible) = blur(value.as_object().unwrap());
        assert_eq!(fields.len(), 1);
        assert!(!visible);

        let value = json!({});
        let (fields, visible) = blur(value.as_object().unwrap());
        assert!(fields.is_empty());
        assert!(visible);
    }
}
