//! Core types, token paths, and utilities for the DTF token engine.
//!
//! This crate provides the foundational types used across all other dtf crates:
//! - Token paths and their positional roles
//! - The alias reference grammar
//! - Value types (colors, dimensions, token types)
//! - The token data model and mode sets
//! - Error types
//! - Import configuration

pub mod alias;
pub mod config;
pub mod errors;
pub mod keys;
pub mod path;
pub mod tokens;
pub mod types;

pub use alias::*;
pub use config::*;
pub use errors::*;
pub use path::*;
pub use tokens::*;
pub use types::*;
