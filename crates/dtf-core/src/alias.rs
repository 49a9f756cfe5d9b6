//! Alias reference grammar.
//!
//! An alias is a string value of the form `{group.token}` or `{group/token}`:
//! brace-delimited, at least two segments, nothing after the closing brace.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::keys;
use crate::path::TokenPath;

fn alias_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\{[^.}]+[./][^}]+\}$").expect("alias pattern compiles"))
}

/// Whether a string matches the alias grammar.
pub fn is_alias(value: &str) -> bool {
    alias_pattern().is_match(value.trim())
}

/// Whether a raw JSON value is an alias string.
pub fn is_alias_value(value: &Value) -> bool {
    value.as_str().is_some_and(is_alias)
}

/// Whether an alias dereferences through an `$extensions` segment.
pub fn is_extended_alias(value: &str) -> bool {
    is_alias(value) && reference_path(value).contains(keys::EXTENSIONS)
}

/// Segments of the referenced path, with braces stripped and `.`/`/` both accepted.
fn reference_path(value: &str) -> TokenPath {
    value
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(|c: char| c == keys::PATH_DELIMITER || c == keys::NAME_DELIMITER)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Canonical token name an alias points at, or `None` if `value` is not an alias.
///
/// Extended aliases lose their `$extensions` segment and have the modifier
/// segment canonicalized to `alpha`, so `{c.primary.$extensions.hue.10}` and
/// `{c.primary.$extensions.alpha.10}` name the same family.
pub fn alias_target(value: &str) -> Option<String> {
    if !is_alias(value) {
        return None;
    }

    Some(canonical_name(&reference_path(value)))
}

/// Canonical token name of a path.
///
/// Extension paths lose their `$extensions` segment and have the modifier
/// segment that follows it canonicalized to `alpha`. Other segments are kept.
pub fn canonical_name(path: &TokenPath) -> String {
    let path = path.without_value_key();
    if !path.is_extension() {
        return path.to_name();
    }

    let mut canonical: Vec<&str> = Vec::with_capacity(path.len());
    let mut after_extensions = false;
    for segment in path.segments() {
        match segment.as_str() {
            keys::EXTENSIONS => {
                after_extensions = true;
                continue;
            }
            keys::HUE if after_extensions => canonical.push(keys::ALPHA),
            other => canonical.push(other),
        }
        after_extensions = false;
    }
    canonical.into_iter().collect::<TokenPath>().to_name()
}

/// Alias target of a raw JSON value.
pub fn alias_target_of(value: &Value) -> Option<String> {
    value.as_str().and_then(alias_target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alias_grammar() {
        assert!(is_alias("{kda.color.primary}"));
        assert!(is_alias("{group/b}"));
        assert!(is_alias("{a..b}"));
        assert!(!is_alias("{primary}"));
        assert!(!is_alias("{a.b} trailing"));
        assert!(!is_alias("prefix {a.b}"));
        assert!(!is_alias("#112233"));
        assert!(!is_alias("{a.}"));
    }

    #[test]
    fn test_alias_target_strips_value_key() {
        assert_eq!(alias_target("{kda.color.primary.$value}").as_deref(), Some("kda/color/primary"));
        assert_eq!(alias_target("{group/b}").as_deref(), Some("group/b"));
        assert_eq!(alias_target("16px"), None);
    }

    #[test]
    fn test_extended_alias_canonicalization() {
        let alpha = "{kda.color.primary.$extensions.alpha.50}";
        let hue = "{kda.color.primary.$extensions.hue.50}";

        assert!(is_extended_alias(alpha));
        assert_eq!(alias_target(alpha).as_deref(), Some("kda/color/primary/alpha/50"));
        assert_eq!(alias_target(hue), alias_target(alpha));
    }

    #[test]
    fn test_canonical_name_of_extension_path() {
        let path = TokenPath::from_dotted("kda.color.primary.$extensions.hue.10.$value");
        assert_eq!(canonical_name(&path), "kda/color/primary/alpha/10");
        assert_eq!(canonical_name(&TokenPath::from_dotted("a.b.$value")), "a/b");
    }

    #[test]
    fn test_group_named_hue_is_kept() {
        assert_eq!(
            alias_target("{kda.hue.red.$extensions.alpha.10}").as_deref(),
            Some("kda/hue/red/alpha/10")
        );
        assert_eq!(
            alias_target("{kda.alpha.red.$extensions.hue.10}").as_deref(),
            Some("kda/alpha/red/alpha/10")
        );
        let path = TokenPath::from_dotted("kda.hue.red.$extensions.hue.10.$value");
        assert_eq!(canonical_name(&path), "kda/hue/red/alpha/10");
    }

    #[test]
    fn test_leading_text_is_not_an_alias() {
        assert!(!is_alias("prefix {a.b}"));
        assert!(!is_alias_value(&json!("see {kda.color.primary}")));
        assert_eq!(alias_target("prefix {a.b}"), None);
        assert!(is_alias("  {a.b}  "));
    }

    #[test]
    fn test_non_string_values_are_not_aliases() {
        assert!(!is_alias_value(&json!(4)));
        assert!(is_alias_value(&json!("{a.b}")));
        assert_eq!(alias_target_of(&json!(null)), None);
    }
}
