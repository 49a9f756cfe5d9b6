//! Configuration for one import action.

use serde::{Deserialize, Serialize};

use crate::errors::SourceError;
use crate::keys;

/// Default cap on materialization passes.
pub const DEFAULT_MAX_PASSES: usize = 8;

/// Options for resolving and materializing a token document.
///
/// Deserializes from the host's import payload, so both `collectionName`
/// and the shorter `name` are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Overrides the document's `$name`.
    #[serde(alias = "name")]
    pub collection_name: Option<String>,
    pub default_mode: String,
    /// Pixel size of `1rem`.
    pub base_font_size: f64,
    pub max_passes: usize,
    /// Clear the destination collection and styles on the first pass.
    pub is_reset: bool,
    #[serde(alias = "isImportTypography")]
    pub import_typography: bool,
    #[serde(alias = "isImportIcons")]
    pub import_icons: bool,
    /// Color variable bound to icon fills.
    pub icon_color_token: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            collection_name: None,
            default_mode: keys::DEFAULT_MODE.to_string(),
            base_font_size: keys::BASE_FONT_SIZE,
            max_passes: DEFAULT_MAX_PASSES,
            is_reset: false,
            import_typography: true,
            import_icons: false,
            icon_color_token: "kda/foundation/color/icon/base/default".to_string(),
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from its JSON form; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn with_reset(mut self, is_reset: bool) -> Self {
        self.is_reset = is_reset;
        self
    }

    pub fn with_typography(mut self, import_typography: bool) -> Self {
        self.import_typography = import_typography;
        self
    }

    pub fn with_icons(mut self, import_icons: bool) -> Self {
        self.import_icons = import_icons;
        self
    }
}
