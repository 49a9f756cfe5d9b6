//! Reserved keys and naming constants of the source token format.

pub const VALUE: &str = "$value";
pub const TYPE: &str = "$type";
pub const NAME: &str = "$name";
pub const VERSION: &str = "$version";
pub const TITLE: &str = "$title";
pub const DESCRIPTION: &str = "$description";
pub const EXTENSIONS: &str = "$extensions";
pub const BASE: &str = "$base";

/// Keys that carry document metadata and never produce tokens.
pub const METADATA: [&str; 2] = [NAME, VERSION];

/// Extension group holding per-mode overrides.
pub const MODE: &str = "mode";
/// Extension group holding alpha modifiers.
pub const ALPHA: &str = "alpha";
/// Extension group holding hue modifiers.
pub const HUE: &str = "hue";

pub const PATH_DELIMITER: char = '.';
pub const NAME_DELIMITER: char = '/';

pub const DEFAULT_MODE: &str = "light";
pub const DEFAULT_COLLECTION_NAME: &str = "Kode Design System";
pub const BASE_FONT_SIZE: f64 = 16.0;

pub const NAMESPACE_ROOT: &str = "kda";
pub const NAMESPACE_FOUNDATION: &str = "foundation";
pub const ICONS_FRAME: &str = "icons";
