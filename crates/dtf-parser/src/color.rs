//! Color literal parsing and formatting.

use dtf_core::{Color, TokenError};
use nom::combinator::all_consuming;
use serde_json::Value;

use crate::lexer::{self, Argument};

/// Parse a color literal: `#rgb`, `#rrggbb`, `rgb()`, `rgba()`, `hsl()`,
/// `hsla()` or a float object `{r: .., g: .., b: .. [, opacity: ..]}`.
pub fn parse_color(raw: &str) -> Result<Color, TokenError> {
    let input = raw.trim();
    let invalid = || TokenError::ColorFormat { value: raw.to_string() };

    if let Ok((_, digits)) = all_consuming(lexer::hex_color)(input) {
        return parse_hex(digits).ok_or_else(invalid);
    }
    if let Ok((_, (name, args))) = all_consuming(lexer::color_function)(input) {
        return from_function(&name.to_ascii_lowercase(), &args).ok_or_else(invalid);
    }
    if let Ok((_, fields)) = all_consuming(lexer::float_object)(input) {
        return from_fields(fields).ok_or_else(invalid);
    }
    Err(invalid())
}

/// Parse a color from a raw JSON value: a literal string or an `{r, g, b[, a]}` object.
pub fn parse_color_value(raw: &Value) -> Result<Color, TokenError> {
    match raw {
        Value::String(s) => parse_color(s),
        Value::Object(map) => {
            let fields = map
                .iter()
                .filter_map(|(k, v)| v.as_f64().map(|n| (k.as_str(), n)));
            from_fields(fields).ok_or_else(|| TokenError::ColorFormat { value: raw.to_string() })
        }
        other => Err(TokenError::ColorFormat { value: other.to_string() }),
    }
}

fn parse_hex(digits: &str) -> Option<Color> {
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(Color::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
}

fn from_function(name: &str, args: &[Argument]) -> Option<Color> {
    match (name, args) {
        ("rgb", [r, g, b]) => Some(Color::rgb(byte(r)?, byte(g)?, byte(b)?)),
        ("rgba", [r, g, b, a]) => Some(Color::rgba(byte(r)?, byte(g)?, byte(b)?, unit_interval(a)?)),
        ("hsl", [h, s, l]) => Some(hsl_to_rgb(h.value, percent(s)?, percent(l)?)),
        ("hsla", [h, s, l, a]) => {
            Some(hsl_to_rgb(h.value, percent(s)?, percent(l)?).with_alpha(unit_interval(a)?))
        }
        _ => None,
    }
}

fn byte(arg: &Argument) -> Option<f64> {
    (!arg.percent && (0.0..=255.0).contains(&arg.value)).then(|| arg.value / 255.0)
}

fn percent(arg: &Argument) -> Option<f64> {
    (arg.percent && (0.0..=100.0).contains(&arg.value)).then(|| arg.value / 100.0)
}

fn unit_interval(arg: &Argument) -> Option<f64> {
    if arg.percent {
        return percent(arg);
    }
    (0.0..=1.0).contains(&arg.value).then_some(arg.value)
}

fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, f64)>) -> Option<Color> {
    let (mut r, mut g, mut b, mut a) = (None, None, None, 1.0);
    for (key, value) in fields {
        match key {
            "r" => r = Some(value),
            "g" => g = Some(value),
            "b" => b = Some(value),
            "a" | "opacity" => a = value,
            _ => {}
        }
    }
    Some(Color::rgba(r?, g?, b?, a))
}

/// Convert HSL (hue in degrees, saturation and lightness in `[0, 1]`) to RGB.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Color {
    if saturation == 0.0 {
        return Color::rgb(lightness, lightness, lightness);
    }

    let h = (hue / 360.0).rem_euclid(1.0);
    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    Color::rgb(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

/// Format a color as `#rrggbb`, or `rgba(r, g, b, a)` when it is not opaque.
pub fn rgba_to_hex(color: &Color) -> String {
    let (r, g, b) = color.to_rgb8();
    if color.a != 1.0 {
        format!("rgba({r}, {g}, {b}, {:.4})", color.a)
    } else {
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.001
    }

    #[test]
    fn test_parse_hex() {
        let c = parse_color("#112233").unwrap();
        assert!(approx(c.r, 0.0667));
        assert!(approx(c.g, 0.1333));
        assert!(approx(c.b, 0.2));
        assert_eq!(c.a, 1.0);

        assert_eq!(parse_color("#fff").unwrap(), Color::WHITE);
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(parse_color("rgb(255, 0, 0)").unwrap(), Color::rgb(1.0, 0.0, 0.0));

        let c = parse_color("rgba(0, 0, 255, 0.5)").unwrap();
        assert_eq!(c.a, 0.5);
        assert!(approx(c.b, 1.0));

        let c = parse_color("hsl(120, 100%, 50%)").unwrap();
        assert!(approx(c.r, 0.0) && approx(c.g, 1.0) && approx(c.b, 0.0));

        let c = parse_color("hsla(0, 0%, 50%, 0.25)").unwrap();
        assert!(approx(c.r, 0.5));
        assert_eq!(c.a, 0.25);
    }

    #[test]
    fn test_parse_float_object() {
        let c = parse_color("{ r: 0.5, g: 0.25, b: 1, opacity: 0.8 }").unwrap();
        assert_eq!(c, Color::rgba(0.5, 0.25, 1.0, 0.8));

        let c = parse_color_value(&json!({ "r": 1, "g": 1, "b": 1 })).unwrap();
        assert_eq!(c, Color::WHITE);
    }

    #[test]
    fn test_invalid_colors() {
        assert!(matches!(parse_color("tomato"), Err(TokenError::ColorFormat { .. })));
        assert!(parse_color("rgb(300, 0, 0)").is_err());
        assert!(parse_color("rgb(1, 2)").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color_value(&json!(12)).is_err());
    }

    #[test]
    fn test_rgba_to_hex() {
        let base = parse_color("#112233").unwrap();
        assert_eq!(rgba_to_hex(&base), "#112233");
        assert_eq!(rgba_to_hex(&base.with_alpha(0.5)), "rgba(17, 34, 51, 0.5000)");
    }

    proptest! {
        #[test]
        fn prop_hex_round_trip(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let hex = format!("#{r:02x}{g:02x}{b:02x}");
            let color = parse_color(&hex).unwrap();
            prop_assert_eq!(rgba_to_hex(&color), hex);
        }
    }
}
