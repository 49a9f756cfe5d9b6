//! Text and effect style assembly.
//!
//! Styles are built from the default-mode values of their resolved
//! sub-tokens. Fields that alias a variable keep the binding by name.

use dtf_core::{Color, CompositeKind, Dimension, DimensionUnit, TokenValue};
use dtf_expander::Composite;
use dtf_parser::UnitContext;
use indexmap::IndexMap;

use crate::{ModeValue, ResolvedToken};

/// A text style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub name: String,
    pub description: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub font_size: f64,
    pub letter_spacing: Dimension,
    pub line_height: Dimension,
    /// Style field to bound variable name.
    pub bindings: IndexMap<String, String>,
}

/// A single style effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    DropShadow {
        color: Color,
        offset_x: f64,
        offset_y: f64,
        radius: f64,
        spread: f64,
    },
    LayerBlur {
        radius: f64,
        visible: bool,
    },
}

/// An effect style. `effect` is `None` when the style should be removed.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectStyle {
    pub name: String,
    pub description: Option<String>,
    pub effect: Option<Effect>,
    pub bindings: IndexMap<String, String>,
}

/// Default-mode field values of one composite.
struct Fields<'a> {
    composite: &'a Composite,
    tokens: &'a IndexMap<String, ResolvedToken>,
    mode: &'a str,
}

impl<'a> Fields<'a> {
    fn get(&self, field: &str) -> Option<&'a ModeValue> {
        let name = self.composite.field(field)?;
        self.tokens.get(name)?.value_in(self.mode)
    }

    fn value(&self, field: &str) -> Option<&'a TokenValue> {
        self.get(field)?.value.as_ref()
    }

    fn number(&self, field: &str) -> Option<f64> {
        self.value(field)?.as_f64()
    }

    fn text(&self, field: &str) -> Option<String> {
        self.value(field)?.as_str().map(str::to_string)
    }

    fn bindings(&self) -> IndexMap<String, String> {
        self.composite
            .fields
            .keys()
            .filter_map(|field| {
                let target = self.get(field)?.alias.clone()?;
                Some((field.clone(), target))
            })
            .collect()
    }
}

/// Assemble every typography, shadow and blur composite into a style.
pub(crate) fn assemble(
    composites: &[Composite],
    tokens: &IndexMap<String, ResolvedToken>,
    mode: &str,
    units: &UnitContext,
) -> (Vec<TextStyle>, Vec<EffectStyle>) {
    let mut text_styles = Vec::new();
    let mut effect_styles = Vec::new();

    for composite in composites {
        let fields = Fields { composite, tokens, mode };
        match composite.kind {
            CompositeKind::Typography => text_styles.push(text_style(&fields, units)),
            CompositeKind::Shadow => effect_styles.push(effect_style(&fields, shadow(&fields))),
            CompositeKind::Blur => effect_styles.push(effect_style(&fields, blur(&fields))),
            CompositeKind::Border | CompositeKind::Icon => {}
        }
    }

    (text_styles, effect_styles)
}

fn text_style(fields: &Fields<'_>, units: &UnitContext) -> TextStyle {
    let dimension = |field: &str| fields.value(field).and_then(TokenValue::as_dimension);

    TextStyle {
        name: fields.composite.name.clone(),
        description: fields.composite.description.clone(),
        font_family: fields.text("fontFamily"),
        font_weight: fields.text("fontWeight"),
        font_size: fields.number("fontSize").unwrap_or(units.base_font_size),
        letter_spacing: dimension("letterSpacing")
            .filter(|d| d.value.is_some())
            .unwrap_or(Dimension::px(0.0)),
        line_height: dimension("lineHeight").unwrap_or(Dimension::unset(DimensionUnit::Auto)),
        bindings: fields.bindings(),
    }
}

fn effect_style(fields: &Fields<'_>, effect: Option<Effect>) -> EffectStyle {
    EffectStyle {
        name: fields.composite.name.clone(),
        description: fields.composite.description.clone(),
        effect,
        bindings: fields.bindings(),
    }
}

/// Shadows without a resolved color are removed.
fn shadow(fields: &Fields<'_>) -> Option<Effect> {
    let color = fields.value("color").and_then(TokenValue::as_color)?;
    Some(Effect::DropShadow {
        color,
        offset_x: fields.number("offsetX").unwrap_or_default(),
        offset_y: fields.number("offsetY").unwrap_or_default(),
        radius: fields.number("blur").unwrap_or_default(),
        spread: fields.number("spread").unwrap_or_default(),
    })
}

/// Blurs with a zero or missing radius are removed.
fn blur(fields: &Fields<'_>) -> Option<Effect> {
    let radius = fields.number("radius").filter(|r| *r != 0.0)?;
    Some(Effect::LayerBlur { radius, visible: fields.composite.visible })
}
