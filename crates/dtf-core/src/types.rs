//! Core value types for design tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A dimension value with unit.
///
/// `value` is `None` when the source could not be parsed; the unit then
/// carries the caller's default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub value: Option<f64>,
    pub unit: DimensionUnit,
}

impl Dimension {
    pub fn px(value: f64) -> Self {
        Self { value: Some(value), unit: DimensionUnit::Pixels }
    }

    pub fn percent(value: f64) -> Self {
        Self { value: Some(value), unit: DimensionUnit::Percent }
    }

    /// A dimension with no numeric part.
    pub fn unset(unit: DimensionUnit) -> Self {
        Self { value: None, unit }
    }

    /// Numeric part, or zero when unparsed.
    pub fn value_or_zero(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

/// Dimension units as understood by the variable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DimensionUnit {
    /// Pixels (`px`, and `rem` after scaling)
    Pixels,
    /// Percentage (`%`)
    Percent,
    /// Host decides (line heights)
    #[default]
    Auto,
}

impl DimensionUnit {
    /// CSS suffix for this unit.
    pub fn symbol(&self) -> &'static str {
        match self {
            DimensionUnit::Percent => "%",
            DimensionUnit::Pixels | DimensionUnit::Auto => "px",
        }
    }
}

/// A color value with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create from 8-bit RGB values.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
            a: 1.0,
        }
    }

    /// Same channels, different alpha.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Convert to 8-bit RGB channels, rounding to nearest.
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Declared token type (`$type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    Color,
    Dimension,
    FontFamily,
    FontWeight,
    Duration,
    Number,
    Border,
    Shadow,
    Blur,
    Typography,
    Icon,
    Custom,
}

impl TokenType {
    /// Parse a `$type` string; unknown types become `Custom`.
    pub fn from_type_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "color" => TokenType::Color,
            "dimension" => TokenType::Dimension,
            "fontfamily" => TokenType::FontFamily,
            "fontweight" => TokenType::FontWeight,
            "duration" => TokenType::Duration,
            "number" => TokenType::Number,
            "border" => TokenType::Border,
            "shadow" => TokenType::Shadow,
            "blur" => TokenType::Blur,
            "typography" => TokenType::Typography,
            "icon" => TokenType::Icon,
            _ => TokenType::Custom,
        }
    }

    /// Composite kind of this type, if it is a composite.
    pub fn composite_kind(&self) -> Option<CompositeKind> {
        match self {
            TokenType::Border => Some(CompositeKind::Border),
            TokenType::Shadow => Some(CompositeKind::Shadow),
            TokenType::Blur => Some(CompositeKind::Blur),
            TokenType::Typography => Some(CompositeKind::Typography),
            TokenType::Icon => Some(CompositeKind::Icon),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.composite_kind().is_some()
    }

    /// Variable type used when the token is written to a store.
    pub fn resolved_type(&self) -> ResolvedType {
        match self {
            TokenType::Color => ResolvedType::Color,
            TokenType::Number | TokenType::Dimension => ResolvedType::Float,
            _ => ResolvedType::String,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenType::Color => "color",
            TokenType::Dimension => "dimension",
            TokenType::FontFamily => "fontFamily",
            TokenType::FontWeight => "fontWeight",
            TokenType::Duration => "duration",
            TokenType::Number => "number",
            TokenType::Border => "border",
            TokenType::Shadow => "shadow",
            TokenType::Blur => "blur",
            TokenType::Typography => "typography",
            TokenType::Icon => "icon",
            TokenType::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Composite token families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompositeKind {
    Border,
    Shadow,
    Blur,
    Typography,
    Icon,
}

/// Variable types of the destination store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResolvedType {
    Color,
    Float,
    String,
}

/// Derived-value family a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    #[default]
    None,
    Alpha,
    Hue,
}

impl Modifier {
    /// Modifier named by an `$extensions` group key.
    pub fn from_group(group: &str) -> Option<Self> {
        match group {
            crate::keys::ALPHA => Some(Modifier::Alpha),
            crate::keys::HUE => Some(Modifier::Hue),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::None => "none",
            Modifier::Alpha => crate::keys::ALPHA,
            Modifier::Hue => crate::keys::HUE,
        }
    }
}

/// A normalized token value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TokenValue {
    Color(Color),
    Dimension(Dimension),
    Number(f64),
    String(String),
}

impl TokenValue {
    /// Try to get as a color.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            TokenValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Try to get as a dimension.
    pub fn as_dimension(&self) -> Option<Dimension> {
        match self {
            TokenValue::Dimension(d) => Some(*d),
            _ => None,
        }
    }

    /// Numeric part of numbers and parsed dimensions.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TokenValue::Number(n) => Some(*n),
            TokenValue::Dimension(d) => d.value,
            _ => None,
        }
    }

    /// Try to get as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::String(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_parsing_is_case_insensitive() {
        assert_eq!(TokenType::from_type_str("fontFamily"), TokenType::FontFamily);
        assert_eq!(TokenType::from_type_str("COLOR"), TokenType::Color);
        assert_eq!(TokenType::from_type_str("gradient"), TokenType::Custom);
    }

    #[test]
    fn test_resolved_types() {
        assert_eq!(TokenType::Color.resolved_type(), ResolvedType::Color);
        assert_eq!(TokenType::Dimension.resolved_type(), ResolvedType::Float);
        assert_eq!(TokenType::Number.resolved_type(), ResolvedType::Float);
        assert_eq!(TokenType::FontWeight.resolved_type(), ResolvedType::String);
    }

    #[test]
    fn test_color_to_rgb8_rounds() {
        let c = Color::from_rgb8(17, 34, 51);
        assert_eq!(c.to_rgb8(), (17, 34, 51));
        assert_eq!(Color::WHITE.to_rgb8(), (255, 255, 255));
    }

    #[test]
    fn test_dimension_defaults() {
        let d = Dimension::unset(DimensionUnit::Auto);
        assert_eq!(d.value_or_zero(), 0.0);
        assert_eq!(Dimension::percent(50.0).unit.symbol(), "%");
    }
}
