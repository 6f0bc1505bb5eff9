use crate::{file::FileFormat, meta};


/// Separator for sequence items if none is given.
pub const DEFAULT_SEPARATOR: &str = " ";

/// Timestamp layout if none is given: RFC 3339.
pub const RFC3339: &str = "%+";

/// Key that marks a field as ignored.
const IGNORE_KEY: &str = "-";


/// The resolved annotations of one field. Obtained from the raw
/// [`meta::Tags`] via [`ConfigTags::extract`], which fills in defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigTags {
    /// Explicit lookup key, used verbatim (plus a provider's prefix).
    pub key: Option<&'static str>,

    pub json: Option<&'static str>,
    pub yaml: Option<&'static str>,
    pub toml: Option<&'static str>,

    /// Literal used when no source provides a value.
    pub default: Option<&'static str>,
    pub required: bool,
    pub ignore: bool,

    /// Whether `${VAR}` references in the value are substituted.
    pub expand: bool,

    pub separator: &'static str,

    /// `chrono` layout for timestamps.
    pub format: &'static str,
}

impl ConfigTags {
    pub fn extract(tags: &meta::Tags) -> Self {
        Self {
            key: tags.key.filter(|k| !k.is_empty() && *k != IGNORE_KEY),
            json: tags.json.and_then(format_key),
            yaml: tags.yaml.and_then(format_key),
            toml: tags.toml.and_then(format_key),
            default: tags.default,
            required: tags.required,
            ignore: tags.ignore || tags.key == Some(IGNORE_KEY),
            expand: tags.expand,
            separator: tags.separator.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SEPARATOR),
            format: tags.format.filter(|s| !s.is_empty()).unwrap_or(RFC3339),
        }
    }

    /// The key override for the given file format, if any.
    pub fn format_key(&self, format: FileFormat) -> Option<&'static str> {
        match format {
            #[cfg(feature = "json5")]
            FileFormat::Json5 => self.json,
            #[cfg(feature = "yaml")]
            FileFormat::Yaml => self.yaml,
            #[cfg(feature = "toml")]
            FileFormat::Toml => self.toml,
        }
    }

    /// The key of a field called `name` in a file of the given format.
    pub fn file_key(&self, format: FileFormat, name: &'static str) -> &'static str {
        self.format_key(format).unwrap_or(name)
    }

    /// The default literal, unless it is empty.
    pub fn default_value(&self) -> Option<&'static str> {
        self.default.filter(|d| !d.is_empty())
    }
}

impl Default for ConfigTags {
    fn default() -> Self {
        Self::extract(&meta::Tags::EMPTY)
    }
}

/// `"name,omitempty"` -> `"name"`. An empty name means "no override".
fn format_key(raw: &'static str) -> Option<&'static str> {
    let name = raw.split(',').next().unwrap_or(raw).trim();
    Some(name).filter(|n| !n.is_empty())
}
