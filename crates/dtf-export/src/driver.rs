//! The materialization driver.
//!
//! Each pass resolves the source document from scratch and writes the
//! result into the store: variables are created first, concrete values are
//! written before alias bindings, then styles and icons follow. Passes
//! repeat until nothing is outstanding, or fail once the outstanding set
//! stops shrinking.

use dtf_core::{DtfError, ResolverConfig, SourceError, StoreError, TokenFailure};
use dtf_resolver::{resolve_source, ModeValue, ResolvedSet, ResolvedToken};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::MaterializationCache;
use crate::store::{Bindings, StoreValue, VariableStore};

/// Status of one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    pub pass: usize,
    /// Variables written in every mode.
    pub added: Vec<String>,
    /// Tokens that failed to resolve or that the store rejected.
    pub failed: Vec<String>,
    /// Variables with an alias the store could not bind yet.
    pub pending: Vec<String>,
    /// Text styles written; the host loads their fonts.
    pub typography: Vec<String>,
    /// Icon components rendered.
    pub icons: Vec<String>,
}

/// Result of a converged import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub collection: String,
    pub modes: Vec<String>,
    pub passes: Vec<PassReport>,
    /// Resolution failures of the final pass.
    pub failures: Vec<TokenFailure>,
}

impl ImportReport {
    pub fn last_pass(&self) -> Option<&PassReport> {
        self.passes.last()
    }
}

/// Import a token document into `store`.
pub fn import<S: VariableStore>(
    store: &mut S,
    source: &Value,
    config: &ResolverConfig,
) -> Result<ImportReport, DtfError> {
    Materializer::new(store, config).run(source)
}

/// Import a token document given as JSON text.
pub fn import_str<S: VariableStore>(
    store: &mut S,
    json: &str,
    config: &ResolverConfig,
) -> Result<ImportReport, DtfError> {
    let source: Value = serde_json::from_str(json).map_err(SourceError::from)?;
    import(store, &source, config)
}

/// Drives passes against one store.
pub struct Materializer<'a, S: VariableStore> {
    store: &'a mut S,
    config: &'a ResolverConfig,
    cache: MaterializationCache<S::Handle>,
}

/// Per-token write outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Written {
    Complete,
    Pending,
    Invalid,
}

impl<'a, S: VariableStore> Materializer<'a, S> {
    pub fn new(store: &'a mut S, config: &'a ResolverConfig) -> Self {
        Self { store, config, cache: MaterializationCache::new() }
    }

    /// Run passes until the store holds every resolvable token.
    pub fn run(mut self, source: &Value) -> Result<ImportReport, DtfError> {
        let max_passes = self.config.max_passes.max(1);
        let mut passes = Vec::new();
        let mut previous: Option<usize> = None;
        let mut pass = 0;

        loop {
            pass += 1;
            let set = resolve_source(source, self.config)?;

            let reset = pass == 1 && self.config.is_reset;
            self.store.ensure_collection(&set.meta, reset)?;
            if reset {
                self.cache.clear();
            }

            let (report, rejected) = self.materialize(pass, &set)?;
            let outstanding = self.outstanding(&set, &report, rejected);
            info!(
                pass,
                added = report.added.len(),
                failed = report.failed.len(),
                pending = report.pending.len(),
                outstanding = outstanding.len(),
                "materialization pass finished"
            );
            passes.push(report);

            if outstanding.is_empty() {
                return Ok(ImportReport {
                    collection: set.meta.name.clone(),
                    modes: set.meta.modes.as_slice().to_vec(),
                    passes,
                    failures: set.failures,
                });
            }

            let stalled = previous.is_some_and(|before| outstanding.len() >= before);
            if stalled || pass >= max_passes {
                warn!(pass, unresolved = outstanding.len(), "materialization did not converge");
                return Err(DtfError::Unconverged { passes: pass, unresolved: outstanding });
            }
            previous = Some(outstanding.len());
        }
    }

    /// Write one resolved set. Returns the pass report and the names the
    /// store rejected.
    fn materialize(
        &mut self,
        pass: usize,
        set: &ResolvedSet,
    ) -> Result<(PassReport, Vec<String>), StoreError> {
        let mut report = PassReport { pass, ..PassReport::default() };
        let mut rejected = Vec::new();
        report.failed.extend(set.failures.iter().map(|f| f.token.clone()));

        // Every variable exists before any value is written so aliases inside
        // the set can bind.
        let mut handles = Vec::new();
        for token in set.variables() {
            match self
                .store
                .upsert_variable(&token.name, token.resolved_type, token.description.as_deref())
            {
                Ok(handle) => {
                    self.cache.insert(token.name.clone(), handle.clone());
                    handles.push((token, handle));
                }
                Err(err) => record(err, &token.name, &mut report, &mut rejected)?,
            }
        }

        handles.sort_by_key(|(token, _)| token.has_alias());
        for (token, handle) in &handles {
            match self.write_values(set, token, handle) {
                Ok(Written::Complete) => report.added.push(token.name.clone()),
                Ok(Written::Pending) => report.pending.push(token.name.clone()),
                Ok(Written::Invalid) => report.failed.push(token.name.clone()),
                Err(err) => record(err, &token.name, &mut report, &mut rejected)?,
            }
        }

        if self.config.import_typography {
            for style in &set.text_styles {
                let bindings = self.bindings(&style.bindings);
                match self.store.upsert_text_style(style, &bindings) {
                    Ok(()) => report.typography.push(style.name.clone()),
                    Err(err) => record(err, &style.name, &mut report, &mut rejected)?,
                }
            }
        }

        for style in &set.effect_styles {
            let bindings = self.bindings(&style.bindings);
            if let Err(err) = self.store.upsert_effect_style(style, &bindings) {
                record(err, &style.name, &mut report, &mut rejected)?;
            }
        }

        if self.config.import_icons {
            let fill = self.cache.lookup(&*self.store, &self.config.icon_color_token);
            if fill.is_none() {
                debug!(token = %self.config.icon_color_token, "icon color variable not found");
            }
            for icon in &set.icons {
                match self.store.render_icon_component(icon, fill.as_ref()) {
                    Ok(()) => report.icons.push(icon.component_name.clone()),
                    Err(err) => record(err, &icon.name, &mut report, &mut rejected)?,
                }
            }
        }

        Ok((report, rejected))
    }

    fn write_values(
        &mut self,
        set: &ResolvedSet,
        token: &ResolvedToken,
        handle: &S::Handle,
    ) -> Result<Written, StoreError> {
        let mut written = Written::Complete;
        for (mode, mode_value) in &token.values {
            match self.store_value(set, token, mode_value) {
                Some(value) => self.store.set_value_for_mode(handle, mode, value)?,
                None if mode_value.value.is_none() => {
                    debug!(token = %token.name, mode = %mode, target = ?mode_value.alias, "alias target not in store");
                    if written == Written::Complete {
                        written = Written::Pending;
                    }
                }
                None => {
                    warn!(token = %token.name, mode = %mode, "value does not fit the variable type");
                    written = Written::Invalid;
                }
            }
        }
        Ok(written)
    }

    /// Store form of one mode value: an alias binding when the target is a
    /// compatible variable, else the resolved value.
    fn store_value(
        &mut self,
        set: &ResolvedSet,
        token: &ResolvedToken,
        mode_value: &ModeValue,
    ) -> Option<StoreValue<S::Handle>> {
        if let Some(target) = &mode_value.alias {
            let compatible = set
                .get(target)
                .map_or(true, |t| t.is_variable && t.resolved_type == token.resolved_type);
            if compatible {
                if let Some(handle) = self.cache.lookup(&*self.store, target) {
                    return Some(self.store.create_alias(&handle));
                }
            }
        }
        let value = mode_value.value.as_ref()?;
        StoreValue::from_token_value(token.resolved_type, value)
    }

    fn bindings(&mut self, names: &IndexMap<String, String>) -> Bindings<S::Handle> {
        let mut bindings = Bindings::new();
        for (field, target) in names {
            match self.cache.lookup(&*self.store, target) {
                Some(handle) => {
                    bindings.insert(field.clone(), handle);
                }
                None => debug!(field = %field, target = %target, "style binding target not in store"),
            }
        }
        bindings
    }

    /// Names that another pass could still fix.
    fn outstanding(&self, set: &ResolvedSet, report: &PassReport, rejected: Vec<String>) -> Vec<String> {
        let mut names = rejected;
        names.extend(report.pending.iter().cloned());
        names.extend(
            set.failures
                .iter()
                .filter(|f| f.error.is_retryable())
                .map(|f| f.token.clone()),
        );
        if self.store.variable_count() < set.variables().count() {
            names.extend(
                set.variables()
                    .filter(|t| self.store.find_variable(&t.name).is_none())
                    .map(|t| t.name.clone()),
            );
        }
        names.sort();
        names.dedup();
        names
    }
}

/// Record a store rejection; collection-level errors abort the import.
fn record(
    err: StoreError,
    name: &str,
    report: &mut PassReport,
    rejected: &mut Vec<String>,
) -> Result<(), StoreError> {
    if err.is_collection_level() {
        return Err(err);
    }
    warn!(token = %name, error = %err, "store rejected write");
    report.failed.push(name.to_string());
    rejected.push(name.to_string());
    Ok(())
}
