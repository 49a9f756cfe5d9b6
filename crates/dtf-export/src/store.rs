//! The variable store port.
//!
//! A store owns one collection of mode-aware variables plus text styles,
//! effect styles and icon components. The driver only talks to a store
//! through [`VariableStore`]; hosts with asynchronous APIs adapt at this
//! boundary.

use std::fmt::Debug;

use dtf_core::{CollectionMeta, Color, Dimension, ResolvedType, StoreError, TokenValue};
use dtf_expander::IconRecord;
use dtf_resolver::{EffectStyle, TextStyle};
use indexmap::IndexMap;

/// A value written to one mode of a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue<H> {
    Color(Color),
    Float(f64),
    String(String),
    /// Binding to another variable.
    Alias(H),
}

impl<H> StoreValue<H> {
    /// Convert a resolved value to the store representation of `resolved_type`.
    ///
    /// Returns `None` when the value cannot be expressed in that type.
    pub fn from_token_value(resolved_type: ResolvedType, value: &TokenValue) -> Option<Self> {
        match (resolved_type, value) {
            (ResolvedType::Color, TokenValue::Color(c)) => Some(StoreValue::Color(*c)),
            (ResolvedType::Color, TokenValue::String(s)) => {
                dtf_parser::parse_color(s).ok().map(StoreValue::Color)
            }
            (ResolvedType::Color, _) => None,
            (ResolvedType::Float, TokenValue::Number(n)) => Some(StoreValue::Float(*n)),
            (ResolvedType::Float, TokenValue::Dimension(d)) => Some(StoreValue::Float(d.value_or_zero())),
            (ResolvedType::Float, TokenValue::String(s)) => s.trim().parse().ok().map(StoreValue::Float),
            (ResolvedType::Float, TokenValue::Color(_)) => None,
            (ResolvedType::String, TokenValue::String(s)) => Some(StoreValue::String(s.trim().to_string())),
            (ResolvedType::String, TokenValue::Number(n)) => Some(StoreValue::String(n.to_string())),
            (ResolvedType::String, TokenValue::Dimension(d)) => Some(StoreValue::String(dimension_text(d))),
            (ResolvedType::String, TokenValue::Color(c)) => Some(StoreValue::String(dtf_parser::rgba_to_hex(c))),
        }
    }

    /// The store type this value can be written to, `None` for aliases.
    pub fn resolved_type(&self) -> Option<ResolvedType> {
        match self {
            StoreValue::Color(_) => Some(ResolvedType::Color),
            StoreValue::Float(_) => Some(ResolvedType::Float),
            StoreValue::String(_) => Some(ResolvedType::String),
            StoreValue::Alias(_) => None,
        }
    }
}

fn dimension_text(d: &Dimension) -> String {
    match d.value {
        Some(v) => format!("{v}{}", d.unit.symbol()),
        None => "auto".to_string(),
    }
}

/// Style field bindings resolved to store handles.
pub type Bindings<H> = IndexMap<String, H>;

/// Destination of a materialization.
///
/// Variables are addressed by name; handles are whatever the store uses to
/// refer to an existing variable.
pub trait VariableStore {
    type Handle: Clone + Debug;

    /// Create or update the collection and its modes.
    ///
    /// With `reset`, the existing collection and every style is cleared first.
    fn ensure_collection(&mut self, meta: &CollectionMeta, reset: bool) -> Result<(), StoreError>;

    /// Look up an existing variable by name.
    fn find_variable(&self, name: &str) -> Option<Self::Handle>;

    /// Create the variable if it does not exist and update its description.
    fn upsert_variable(
        &mut self,
        name: &str,
        resolved_type: ResolvedType,
        description: Option<&str>,
    ) -> Result<Self::Handle, StoreError>;

    fn set_value_for_mode(
        &mut self,
        variable: &Self::Handle,
        mode: &str,
        value: StoreValue<Self::Handle>,
    ) -> Result<(), StoreError>;

    /// Value binding `variable` to `target`.
    fn create_alias(&self, target: &Self::Handle) -> StoreValue<Self::Handle> {
        StoreValue::Alias(target.clone())
    }

    fn upsert_text_style(
        &mut self,
        style: &TextStyle,
        bindings: &Bindings<Self::Handle>,
    ) -> Result<(), StoreError>;

    /// Create or update an effect style; a style without an effect is removed.
    fn upsert_effect_style(
        &mut self,
        style: &EffectStyle,
        bindings: &Bindings<Self::Handle>,
    ) -> Result<(), StoreError>;

    /// Publish an icon as a component, its fill bound to `color` when given.
    fn render_icon_component(
        &mut self,
        icon: &IconRecord,
        color: Option<&Self::Handle>,
    ) -> Result<(), StoreError>;

    /// Number of variables in the collection.
    fn variable_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    type Value = StoreValue<usize>;

    #[test]
    fn test_float_from_dimension() {
        let value = Value::from_token_value(ResolvedType::Float, &TokenValue::Dimension(Dimension::px(12.0)));
        assert_eq!(value, Some(StoreValue::Float(12.0)));

        let unset = Value::from_token_value(
            ResolvedType::Float,
            &TokenValue::Dimension(Dimension::unset(Default::default())),
        );
        assert_eq!(unset, Some(StoreValue::Float(0.0)));
    }

    #[test]
    fn test_string_forms() {
        let number = Value::from_token_value(ResolvedType::String, &TokenValue::Number(1.5));
        assert_eq!(number, Some(StoreValue::String("1.5".into())));

        let color = Value::from_token_value(ResolvedType::String, &TokenValue::Color(Color::WHITE));
        assert_eq!(color, Some(StoreValue::String("#ffffff".into())));

        let percent = Value::from_token_value(ResolvedType::String, &TokenValue::Dimension(Dimension::percent(50.0)));
        assert_eq!(percent, Some(StoreValue::String("50%".into())));
    }

    #[test]
    fn test_type_mismatches() {
        assert_eq!(Value::from_token_value(ResolvedType::Color, &TokenValue::Number(1.0)), None);
        assert_eq!(Value::from_token_value(ResolvedType::Float, &TokenValue::String("wide".into())), None);
        assert_eq!(Value::from_token_value(ResolvedType::Float, &TokenValue::Color(Color::BLACK)), None);
    }
}
