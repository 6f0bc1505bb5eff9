//! Definition of the intermediate representation.


/// The parsed input to the `Config` derive.
pub(crate) struct Input {
    pub(crate) doc: Vec<String>,
    pub(crate) name: syn::Ident,
    pub(crate) fields: Vec<Field>,
}

pub(crate) struct Field {
    pub(crate) doc: Vec<String>,
    pub(crate) name: syn::Ident,
    pub(crate) ty: syn::Type,
    pub(crate) tags: Tags,
}

impl Field {
    /// Ignored fields are never visited, so their type does not have to
    /// implement `Reflect`.
    pub(crate) fn is_ignored(&self) -> bool {
        self.tags.ignore || self.tags.key.as_deref() == Some("-")
    }
}

/// Everything from `#[config(...)]` on a single field.
#[derive(Default)]
pub(crate) struct Tags {
    pub(crate) key: Option<String>,
    pub(crate) json: Option<String>,
    pub(crate) yaml: Option<String>,
    pub(crate) toml: Option<String>,
    pub(crate) default: Option<Expr>,
    pub(crate) required: bool,
    pub(crate) ignore: bool,
    pub(crate) expand: bool,
    pub(crate) separator: Option<String>,
    pub(crate) format: Option<String>,
}

/// The kinds of expressions (just literals) we allow for default values.
#[derive(Debug)]
pub(crate) enum Expr {
    Str(syn::LitStr),
    Int(syn::LitInt),
    Float(syn::LitFloat),
    Bool(syn::LitBool),
}

impl Expr {
    /// Default values are handed to the value converter, so they are stored
    /// in their string form.
    pub(crate) fn to_raw_string(&self) -> String {
        match self {
            Self::Str(lit) => lit.value(),
            Self::Int(lit) => lit.base10_digits().to_owned(),
            Self::Float(lit) => lit.base10_digits().to_owned(),
            Self::Bool(lit) => lit.value.to_string(),
        }
    }
}
