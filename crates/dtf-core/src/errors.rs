//! Error types for the DTF token engine.

use thiserror::Error;

use crate::types::ResolvedType;

/// Top-level error type for an import.
#[derive(Debug, Error)]
pub enum DtfError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Still unresolved after {passes} passes: {}", .unresolved.join(", "))]
    Unconverged { passes: usize, unresolved: Vec<String> },
}

/// Errors reading the source document.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token document root must be an object")]
    NotAnObject,
}

/// Per-token errors. These are recorded against the token and never abort a pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenError {
    #[error("Invalid color format: \"{value}\"")]
    ColorFormat { value: String },

    #[error("Invalid dimension: \"{value}\"")]
    DimensionParse { value: String },

    #[error("Unresolved alias in {token}: {target} not found")]
    AliasUnresolved { token: String, target: String },

    #[error("Circular alias reference: {}", .cycle.join(" -> "))]
    AliasCycle { cycle: Vec<String> },

    #[error("Cannot decompose {token}: {reason}")]
    CompositeDecomposition { token: String, reason: String },

    #[error("Path {path} has {found} segments, {required} required")]
    PathTooShort { path: String, required: usize, found: usize },

    #[error("Token {token} has no value for mode {mode}")]
    MissingValue { token: String, mode: String },

    #[error("Token {token} expects a {expected:?} value, got {found}")]
    TypeMismatch { token: String, expected: ResolvedType, found: String },
}

impl TokenError {
    /// Whether another pass could fix this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TokenError::AliasUnresolved { .. })
    }
}

/// A per-token error tagged with the token it belongs to.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{token}: {error}")]
pub struct TokenFailure {
    pub token: String,
    #[source]
    pub error: TokenError,
}

impl TokenFailure {
    pub fn new(token: impl Into<String>, error: TokenError) -> Self {
        Self { token: token.into(), error }
    }
}

/// Errors reported by a variable store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Cannot prepare collection {name}: {reason}")]
    Collection { name: String, reason: String },

    #[error(
        "Collection is limited to {limit} mode(s). Remove the modes from the token data \
         or upgrade the plan to import multiple modes."
    )]
    ModeLimit { limit: usize },

    #[error("Store rejected {name}: {reason}")]
    Write { name: String, reason: String },
}

impl StoreError {
    /// Collection-level errors abort the whole import.
    pub fn is_collection_level(&self) -> bool {
        matches!(self, StoreError::Collection { .. } | StoreError::ModeLimit { .. })
    }
}
