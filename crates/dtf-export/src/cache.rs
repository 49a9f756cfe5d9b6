//! Name to handle cache shared across materialization passes.

use indexmap::IndexMap;

use crate::store::VariableStore;

/// Handles of variables already created or found in the store.
#[derive(Debug, Clone)]
pub struct MaterializationCache<H> {
    handles: IndexMap<String, H>,
}

impl<H: Clone> MaterializationCache<H> {
    pub fn new() -> Self {
        Self { handles: IndexMap::new() }
    }

    pub fn insert(&mut self, name: impl Into<String>, handle: H) {
        self.handles.insert(name.into(), handle);
    }

    pub fn get(&self, name: &str) -> Option<&H> {
        self.handles.get(name)
    }

    /// Cached handle, falling back to a store lookup that is then cached.
    pub fn lookup<S>(&mut self, store: &S, name: &str) -> Option<H>
    where
        S: VariableStore<Handle = H>,
    {
        if let Some(handle) = self.handles.get(name) {
            return Some(handle.clone());
        }
        let handle = store.find_variable(name)?;
        self.handles.insert(name.to_string(), handle.clone());
        Some(handle)
    }

    /// Cached names in the order they were first seen.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

impl<H: Clone> Default for MaterializationCache<H> {
    fn default() -> Self {
        Self::new()
    }
}
