//! Types for [`Config::META`][super::Config::META]. Represent information about
//! a configuration type as written down in the source code.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Meta {
    /// The type (struct) name.
    pub name: &'static str,

    /// Doc comments.
    pub doc: &'static [&'static str],

    pub fields: &'static [Field],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub doc: &'static [&'static str],
    pub tags: Tags,
}

/// The annotations of a field exactly as written in `#[config(...)]`. See
/// [`ConfigTags`][crate::ConfigTags] for the resolved form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tags {
    /// Key override, `"-"` ignores the field.
    pub key: Option<&'static str>,
    pub json: Option<&'static str>,
    pub yaml: Option<&'static str>,
    pub toml: Option<&'static str>,

    /// Default value in its string form.
    pub default: Option<&'static str>,
    pub required: bool,
    pub ignore: bool,
    pub expand: bool,
    pub separator: Option<&'static str>,
    pub format: Option<&'static str>,
}

impl Tags {
    /// A field without any annotations.
    pub const EMPTY: Tags = Tags {
        key: None,
        json: None,
        yaml: None,
        toml: None,
        default: None,
        required: false,
        ignore: false,
        expand: false,
        separator: None,
        format: None,
    };
}

impl Default for Tags {
    fn default() -> Self {
        Self::EMPTY
    }
}
