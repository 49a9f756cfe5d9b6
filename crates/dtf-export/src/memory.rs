//! In-memory reference store.
//!
//! Behaves like a host variable collection closely enough to exercise the
//! driver: variables keep their type, values must match it, aliases must
//! point at variables of the same type, and modes must exist before they
//! are written. A mode limit and per-variable write failures can be
//! injected for tests.

use std::collections::HashMap;

use dtf_core::{CollectionMeta, ResolvedType, StoreError};
use dtf_expander::IconRecord;
use dtf_resolver::{EffectStyle, TextStyle};
use indexmap::IndexMap;
use tracing::debug;

use crate::store::{Bindings, StoreValue, VariableStore};

pub type VariableId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredVariable {
    pub id: VariableId,
    pub name: String,
    pub resolved_type: ResolvedType,
    pub description: Option<String>,
    /// Values keyed by mode name.
    pub values: IndexMap<String, StoreValue<VariableId>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredCollection {
    pub name: String,
    /// Mode names; the first one is the default mode.
    pub modes: Vec<String>,
}

/// A style as stored, with bindings recorded by variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredStyle<S> {
    pub style: S,
    pub bindings: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredIcon {
    pub component_name: String,
    pub description: Option<String>,
    pub markup: String,
    /// Name of the variable bound to the icon fill.
    pub fill: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    collection: Option<StoredCollection>,
    variables: Vec<StoredVariable>,
    index: HashMap<String, VariableId>,
    text_styles: IndexMap<String, StoredStyle<TextStyle>>,
    effect_styles: IndexMap<String, StoredStyle<EffectStyle>>,
    icons: IndexMap<String, StoredIcon>,
    mode_limit: Option<usize>,
    /// Remaining injected write failures per variable name.
    failing_writes: HashMap<String, usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject collections with more than `limit` modes.
    pub fn with_mode_limit(mut self, limit: usize) -> Self {
        self.mode_limit = Some(limit);
        self
    }

    /// Fail the next `times` value writes to the variable `name`.
    pub fn with_failing_writes(mut self, name: impl Into<String>, times: usize) -> Self {
        self.failing_writes.insert(name.into(), times);
        self
    }

    pub fn collection(&self) -> Option<&StoredCollection> {
        self.collection.as_ref()
    }

    pub fn variable(&self, name: &str) -> Option<&StoredVariable> {
        self.index.get(name).and_then(|id| self.variables.get(*id))
    }

    pub fn variables(&self) -> impl Iterator<Item = &StoredVariable> {
        self.variables.iter()
    }

    /// Raw value of `name` in `mode`.
    pub fn value(&self, name: &str, mode: &str) -> Option<&StoreValue<VariableId>> {
        self.variable(name)?.values.get(mode)
    }

    /// Value of `name` in `mode` with aliases followed.
    pub fn resolved_value(&self, name: &str, mode: &str) -> Option<StoreValue<VariableId>> {
        let mut value = self.value(name, mode)?;
        for _ in 0..=self.variables.len() {
            match value {
                StoreValue::Alias(id) => value = self.variables.get(*id)?.values.get(mode)?,
                concrete => return Some(concrete.clone()),
            }
        }
        None
    }

    /// Name of the variable an alias value points at.
    pub fn alias_target(&self, name: &str, mode: &str) -> Option<&str> {
        match self.value(name, mode)? {
            StoreValue::Alias(id) => self.variables.get(*id).map(|v| v.name.as_str()),
            _ => None,
        }
    }

    pub fn text_style(&self, name: &str) -> Option<&StoredStyle<TextStyle>> {
        self.text_styles.get(name)
    }

    pub fn text_styles(&self) -> impl Iterator<Item = &StoredStyle<TextStyle>> {
        self.text_styles.values()
    }

    pub fn effect_style(&self, name: &str) -> Option<&StoredStyle<EffectStyle>> {
        self.effect_styles.get(name)
    }

    pub fn effect_styles(&self) -> impl Iterator<Item = &StoredStyle<EffectStyle>> {
        self.effect_styles.values()
    }

    pub fn icon(&self, component_name: &str) -> Option<&StoredIcon> {
        self.icons.get(component_name)
    }

    pub fn icons(&self) -> impl Iterator<Item = &StoredIcon> {
        self.icons.values()
    }

    fn clear(&mut self) {
        self.collection = None;
        self.variables.clear();
        self.index.clear();
        self.text_styles.clear();
        self.effect_styles.clear();
        self.icons.clear();
    }

    fn get(&self, id: VariableId) -> Result<&StoredVariable, StoreError> {
        self.variables.get(id).ok_or_else(|| StoreError::Write {
            name: format!("#{id}"),
            reason: "unknown variable".to_string(),
        })
    }

    fn binding_names(&self, bindings: &Bindings<VariableId>) -> IndexMap<String, String> {
        bindings
            .iter()
            .filter_map(|(field, id)| Some((field.clone(), self.variables.get(*id)?.name.clone())))
            .collect()
    }
}

impl VariableStore for InMemoryStore {
    type Handle = VariableId;

    fn ensure_collection(&mut self, meta: &CollectionMeta, reset: bool) -> Result<(), StoreError> {
        if let Some(limit) = self.mode_limit {
            if meta.modes.len() > limit {
                return Err(StoreError::ModeLimit { limit });
            }
        }

        if reset {
            debug!(collection = %meta.name, "resetting collection");
            self.clear();
        }

        let collection = self.collection.get_or_insert_with(|| StoredCollection {
            name: meta.name.clone(),
            modes: Vec::new(),
        });
        collection.name = meta.name.clone();

        // The first mode always carries the default mode's name.
        let default_mode = meta.modes.default_mode().to_string();
        match collection.modes.first_mut() {
            Some(first) => *first = default_mode,
            None => collection.modes.push(default_mode),
        }
        for mode in meta.modes.iter() {
            if !collection.modes.iter().any(|m| m == mode) {
                collection.modes.push(mode.to_string());
            }
        }
        Ok(())
    }

    fn find_variable(&self, name: &str) -> Option<VariableId> {
        self.index.get(name).copied()
    }

    fn upsert_variable(
        &mut self,
        name: &str,
        resolved_type: ResolvedType,
        description: Option<&str>,
    ) -> Result<VariableId, StoreError> {
        if self.collection.is_none() {
            return Err(StoreError::Collection {
                name: name.to_string(),
                reason: "no collection".to_string(),
            });
        }

        if let Some(&id) = self.index.get(name) {
            let variable = &mut self.variables[id];
            if variable.resolved_type != resolved_type {
                return Err(StoreError::Write {
                    name: name.to_string(),
                    reason: format!(
                        "exists as {:?}, cannot become {resolved_type:?}",
                        variable.resolved_type
                    ),
                });
            }
            variable.description = description.map(str::to_string);
            return Ok(id);
        }

        let id = self.variables.len();
        self.variables.push(StoredVariable {
            id,
            name: name.to_string(),
            resolved_type,
            description: description.map(str::to_string),
            values: IndexMap::new(),
        });
        self.index.insert(name.to_string(), id);
        Ok(id)
    }

    fn set_value_for_mode(
        &mut self,
        variable: &VariableId,
        mode: &str,
        value: StoreValue<VariableId>,
    ) -> Result<(), StoreError> {
        let (name, resolved_type) = {
            let target = self.get(*variable)?;
            (target.name.clone(), target.resolved_type)
        };
        let reject = |reason: String| StoreError::Write { name: name.clone(), reason };

        if let Some(remaining) = self.failing_writes.get_mut(&name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(reject("write failed".to_string()));
            }
        }

        let has_mode = self
            .collection
            .as_ref()
            .is_some_and(|c| c.modes.iter().any(|m| m == mode));
        if !has_mode {
            return Err(reject(format!("unknown mode {mode}")));
        }

        let value_type = match &value {
            StoreValue::Alias(id) => self.get(*id)?.resolved_type,
            other => other.resolved_type().unwrap_or(resolved_type),
        };
        if value_type != resolved_type {
            return Err(reject(format!("{value_type:?} value for a {resolved_type:?} variable")));
        }

        self.variables[*variable].values.insert(mode.to_string(), value);
        Ok(())
    }

    fn upsert_text_style(
        &mut self,
        style: &TextStyle,
        bindings: &Bindings<VariableId>,
    ) -> Result<(), StoreError> {
        let bindings = self.binding_names(bindings);
        self.text_styles
            .insert(style.name.clone(), StoredStyle { style: style.clone(), bindings });
        Ok(())
    }

    fn upsert_effect_style(
        &mut self,
        style: &EffectStyle,
        bindings: &Bindings<VariableId>,
    ) -> Result<(), StoreError> {
        if style.effect.is_none() {
            self.effect_styles.shift_remove(&style.name);
            return Ok(());
        }
        let bindings = self.binding_names(bindings);
        self.effect_styles
            .insert(style.name.clone(), StoredStyle { style: style.clone(), bindings });
        Ok(())
    }

    fn render_icon_component(
        &mut self,
        icon: &IconRecord,
        color: Option<&VariableId>,
    ) -> Result<(), StoreError> {
        let fill = match color {
            Some(id) => Some(self.get(*id)?.name.clone()),
            None => None,
        };
        self.icons.insert(
            icon.component_name.clone(),
            StoredIcon {
                component_name: icon.component_name.clone(),
                description: icon.description.clone(),
                markup: icon.markup.clone(),
                fill,
            },
        );
        Ok(())
    }

    fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtf_core::{Color, ModeSet};

    fn meta(modes: &[&str]) -> CollectionMeta {
        CollectionMeta {
            name: "Kode".into(),
            version: None,
            modes: ModeSet::new("light", modes.iter().copied()),
        }
    }

    fn store() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.ensure_collection(&meta(&["dark"]), false).unwrap();
        store
    }

    #[test]
    fn test_collection_modes() {
        let store = store();
        let collection = store.collection().unwrap();
        assert_eq!(collection.name, "Kode");
        assert_eq!(collection.modes, vec!["light", "dark"]);
    }

    #[test]
    fn test_mode_limit() {
        let mut store = InMemoryStore::new().with_mode_limit(1);
        let err = store.ensure_collection(&meta(&["dark"]), false).unwrap_err();
        assert!(err.is_collection_level());
        assert!(store.ensure_collection(&meta(&[]), false).is_ok());
    }

    #[test]
    fn test_variables_need_a_collection() {
        let mut store = InMemoryStore::new();
        assert!(matches!(
            store.upsert_variable("a", ResolvedType::Float, None),
            Err(StoreError::Collection { .. })
        ));
    }

    #[test]
    fn test_upsert_keeps_identity_and_type() {
        let mut store = store();
        let id = store.upsert_variable("a", ResolvedType::Float, None).unwrap();
        assert_eq!(store.upsert_variable("a", ResolvedType::Float, Some("size")).unwrap(), id);
        assert_eq!(store.variable("a").unwrap().description.as_deref(), Some("size"));
        assert!(store.upsert_variable("a", ResolvedType::Color, None).is_err());
        assert_eq!(store.variable_count(), 1);
    }

    #[test]
    fn test_values_and_aliases() {
        let mut store = store();
        let base = store.upsert_variable("c/base", ResolvedType::Color, None).unwrap();
        let link = store.upsert_variable("c/link", ResolvedType::Color, None).unwrap();
        let size = store.upsert_variable("size", ResolvedType::Float, None).unwrap();

        store.set_value_for_mode(&base, "dark", StoreValue::Color(Color::WHITE)).unwrap();
        let alias = store.create_alias(&base);
        store.set_value_for_mode(&link, "dark", alias).unwrap();

        assert_eq!(store.alias_target("c/link", "dark"), Some("c/base"));
        assert_eq!(store.resolved_value("c/link", "dark"), Some(StoreValue::Color(Color::WHITE)));

        assert!(store.set_value_for_mode(&size, "dark", StoreValue::Alias(base)).is_err());
        assert!(store.set_value_for_mode(&size, "dark", StoreValue::String("x".into())).is_err());
        assert!(store.set_value_for_mode(&size, "sepia", StoreValue::Float(1.0)).is_err());
    }

    #[test]
    fn test_injected_failures_run_out() {
        let mut store = InMemoryStore::new().with_failing_writes("size", 1);
        store.ensure_collection(&meta(&[]), false).unwrap();
        let size = store.upsert_variable("size", ResolvedType::Float, None).unwrap();

        assert!(store.set_value_for_mode(&size, "light", StoreValue::Float(4.0)).is_err());
        assert!(store.set_value_for_mode(&size, "light", StoreValue::Float(4.0)).is_ok());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = store();
        store.upsert_variable("a", ResolvedType::Float, None).unwrap();
        store.ensure_collection(&meta(&[]), true).unwrap();
        assert_eq!(store.variable_count(), 0);
        assert_eq!(store.collection().unwrap().modes, vec!["light"]);
    }
}
