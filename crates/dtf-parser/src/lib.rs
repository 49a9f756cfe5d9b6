//! Parser for DTF token documents.
//!
//! Flattens the nested JSON source, normalizes units and colors, and builds
//! the unresolved [`TokenGraph`].

pub mod builder;
pub mod color;
pub mod dimension;
pub mod flatten;
pub mod lexer;
pub mod source;

pub use builder::{discover_modes, TokenBuilder};
pub use color::{hsl_to_rgb, parse_color, parse_color_value, rgba_to_hex};
pub use dimension::{font_weight_name, parse_dimension, parse_font_size, UnitContext};
pub use flatten::flatten;
pub use source::SourceTree;

use dtf_core::{ResolverConfig, SourceError, TokenGraph};
use serde_json::Value;

/// Flatten and build a parsed source document.
pub fn parse_source(root: &Value, config: &ResolverConfig) -> Result<TokenGraph, SourceError> {
    let entries = flatten(root)?;
    Ok(TokenBuilder::new(root, config).build(&entries))
}

/// Parse a JSON token document.
pub fn parse_str(json: &str, config: &ResolverConfig) -> Result<TokenGraph, SourceError> {
    let root: Value = serde_json::from_str(json)?;
    parse_source(&root, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str() {
        let graph = parse_str(
            r#"{ "kda": { "spacing": { "$type": "dimension", "sm": { "$value": "4px" } } } }"#,
            &ResolverConfig::default(),
        )
        .unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.contains("kda/spacing/sm"));
    }

    #[test]
    fn test_parse_errors() {
        let config = ResolverConfig::default();
        assert!(matches!(parse_str("not json", &config), Err(SourceError::Json(_))));
        assert!(matches!(parse_str("[]", &config), Err(SourceError::NotAnObject)));
    }
}
