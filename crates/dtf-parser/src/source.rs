//! Read-only lookups into the source document.

use dtf_core::keys;
use dtf_core::{TokenPath, TokenType};
use serde_json::Value;

/// A borrowed source document.
#[derive(Debug, Clone, Copy)]
pub struct SourceTree<'a> {
    root: &'a Value,
}

impl<'a> SourceTree<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Node at `path`. Named arrays are indexed by their elements' `$name`.
    pub fn lookup(&self, path: &TokenPath) -> Option<&'a Value> {
        path.segments()
            .iter()
            .try_fold(self.root, |node, segment| child(node, segment))
    }

    /// String field of the node at `path`.
    pub fn field(&self, path: &TokenPath, key: &str) -> Option<&'a str> {
        self.lookup(path)?.get(key)?.as_str()
    }

    /// `$type` declared on the node at `path` or on its nearest ancestor.
    pub fn inherited_type(&self, path: &TokenPath) -> Option<TokenType> {
        let mut node = self.root;
        let mut found = declared_type(node);
        for segment in path.segments() {
            node = match child(node, segment) {
                Some(next) => next,
                None => break,
            };
            if let Some(token_type) = declared_type(node) {
                found = Some(token_type);
            }
        }
        found
    }

    /// Document-level metadata string (`$name`, `$version`).
    pub fn metadata(&self, key: &str) -> Option<String> {
        match self.root.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// `$type` declared directly on a node.
pub fn declared_type(node: &Value) -> Option<TokenType> {
    node.get(keys::TYPE)?.as_str().map(TokenType::from_type_str)
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items
            .iter()
            .find(|item| item.get(keys::NAME).and_then(Value::as_str) == Some(segment)),
        _ => None,
    }
}
