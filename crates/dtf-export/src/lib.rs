//! Materialization of resolved DTF token sets.
//!
//! This crate handles:
//! - The [`VariableStore`] port every destination implements
//! - The pass loop that writes a resolved set until it converges
//! - An in-memory reference store

pub mod cache;
pub mod driver;
pub mod memory;
pub mod store;

pub use cache::MaterializationCache;
pub use driver::{import, import_str, ImportReport, Materializer, PassReport};
pub use memory::{InMemoryStore, StoredVariable, VariableId};
pub use store::{Bindings, StoreValue, VariableStore};
