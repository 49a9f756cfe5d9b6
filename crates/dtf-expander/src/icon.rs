//! Icon records.

use dtf_core::keys;
use dtf_core::Token;

/// An icon token: markup plus the component name it is published under.
#[derive(Debug, Clone, PartialEq)]
pub struct IconRecord {
    pub name: String,
    pub component_name: String,
    pub description: Option<String>,
    pub markup: String,
}

impl IconRecord {
    pub(crate) fn new(token: &Token, markup: &str) -> Self {
        Self {
            name: token.name.clone(),
            component_name: component_name(&token.name),
            description: token.description.clone(),
            markup: markup.to_string(),
        }
    }
}

/// Component name of an icon token: namespace segments dropped, `_` in the
/// icon's own name replaced with `-`.
pub fn component_name(token_name: &str) -> String {
    let mut segments: Vec<&str> = token_name.split(keys::NAME_DELIMITER).collect();
    let last = segments.pop().unwrap_or_default().replace('_', "-");

    let namespaces = [keys::NAMESPACE_ROOT, keys::NAMESPACE_FOUNDATION, keys::ICONS_FRAME];
    let mut parts: Vec<String> = segments
        .into_iter()
        .filter(|s| !namespaces.contains(s))
        .map(str::to_string)
        .collect();
    parts.push(last);
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_name() {
        assert_eq!(component_name("kda/foundation/icons/arrow_left"), "arrow-left");
        assert_eq!(component_name("kda/foundation/icons/nav/chevron_up"), "nav/chevron-up");
        assert_eq!(component_name("home"), "home");
    }
}
