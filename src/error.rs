use std::{fmt, path::PathBuf};

use crate::Kind;


/// Type describing all errors that can occur in this library.
///
/// Errors raised while populating a field carry the dotted path to that
/// field, starting with the name of the root struct, e.g. `Conf.http.port`.
/// See [`Error::path`]. A load that produced several errors returns a single
/// error of kind [`ErrorKind::Multiple`]; use [`Error::errors`] to inspect the
/// individual errors.
pub struct Error {
    pub(crate) inner: Box<ErrorInner>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorInner {
    /// The value handed to the loader cannot be populated.
    #[error("confill: invalid input: {0}")]
    InvalidInput(InvalidInput),

    /// A field (or sequence element) has a type that can never be populated.
    /// Raised while walking the struct, before any value is read.
    #[error("unsupported type: cannot handle {} \"{kind}\" at \"{path}\"", label(.element))]
    UnsupportedType {
        kind: Kind,
        element: bool,
        path: String,
    },

    /// A file source whose extension is not one of the enabled formats.
    #[error("unsupported file extension: \"{ext}\" ('{}')", .path.display())]
    UnsupportedFileExt { ext: String, path: PathBuf },

    #[error("unsettable field: \"{path}\" cannot be set")]
    UnsettableField { path: String },

    /// Internal signal of providers: the key has no value in that source.
    #[error("key not found: \"{key}\"")]
    KeyNotFound { key: String },

    /// No source and no default supplied a value for a required field.
    #[error("missing value: \"{path}\" is required")]
    RequiredField { path: String },

    #[error("failed parsing \"{literal}\" as {kind} at \"{path}\": {err}")]
    Parse {
        literal: String,
        kind: Kind,
        path: String,
        #[source]
        err: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("value overflow: \"{literal}\" overflows type \"{kind}\" at \"{path}\"")]
    ValueOverflow {
        literal: String,
        kind: Kind,
        path: String,
    },

    /// An IO error occured, e.g. when reading a file.
    #[error("IO error occured while reading '{}': {err}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// A file source was marked as required but the file does not exist.
    #[error("required configuration file does not exist: '{}'", .path.display())]
    MissingRequiredFile { path: PathBuf },

    /// The content of a file could not be decoded, either syntactically or
    /// into the shape of the target struct.
    #[error("failed to decode '{}'{}: {msg}", .file.display(), at(.path))]
    Decode {
        file: PathBuf,
        path: Option<String>,
        msg: String,
    },

    /// Error raised by a user defined provider.
    #[error("{provider}: {err}")]
    Provider {
        provider: String,
        #[source]
        err: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Multiple(ConfigErrors),
}

fn label(element: &bool) -> &'static str {
    if *element { "sequence of" } else { "type" }
}

fn at(path: &Option<String>) -> String {
    match path {
        Some(path) => format!(" at \"{path}\""),
        None => String::new(),
    }
}

/// Why the root value handed to the loader was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    /// The root is an absent optional value.
    Nil,

    /// The root is not a struct. Carries the Rust type name.
    NonStruct(&'static str),
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil pointer"),
            Self::NonStruct(ty) => write!(f, "non-struct type \"{ty}\""),
        }
    }
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidInput,
    UnsupportedType,
    UnsupportedFileExt,
    UnsettableField,
    KeyNotFound,
    RequiredField,
    Parse,
    ValueOverflow,
    Io,
    MissingRequiredFile,
    Decode,
    Provider,
    Multiple,
}

impl Error {
    /// Wraps an error raised by a custom [`Provider`][crate::Provider]
    /// implementation.
    pub fn provider(
        provider: impl Into<String>,
        err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ErrorInner::Provider { provider: provider.into(), err: err.into() }.into()
    }

    /// Signals that `key` has no value in a source. Loaders treat this as
    /// "try the next source" and never report it.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        ErrorInner::KeyNotFound { key: key.into() }.into()
    }

    pub fn kind(&self) -> ErrorKind {
        match &*self.inner {
            ErrorInner::InvalidInput(_) => ErrorKind::InvalidInput,
            ErrorInner::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            ErrorInner::UnsupportedFileExt { .. } => ErrorKind::UnsupportedFileExt,
            ErrorInner::UnsettableField { .. } => ErrorKind::UnsettableField,
            ErrorInner::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            ErrorInner::RequiredField { .. } => ErrorKind::RequiredField,
            ErrorInner::Parse { .. } => ErrorKind::Parse,
            ErrorInner::ValueOverflow { .. } => ErrorKind::ValueOverflow,
            ErrorInner::Io { .. } => ErrorKind::Io,
            ErrorInner::MissingRequiredFile { .. } => ErrorKind::MissingRequiredFile,
            ErrorInner::Decode { .. } => ErrorKind::Decode,
            ErrorInner::Provider { .. } => ErrorKind::Provider,
            ErrorInner::Multiple(_) => ErrorKind::Multiple,
        }
    }

    /// The dotted path of the field this error is attributed to, if any.
    pub fn path(&self) -> Option<&str> {
        match &*self.inner {
            ErrorInner::UnsupportedType { path, .. }
            | ErrorInner::UnsettableField { path }
            | ErrorInner::RequiredField { path }
            | ErrorInner::Parse { path, .. }
            | ErrorInner::ValueOverflow { path, .. } => Some(path),
            ErrorInner::Decode { path, .. } => path.as_deref(),
            _ => None,
        }
    }

    /// The individual errors. For an error of kind [`ErrorKind::Multiple`]
    /// these are the collected errors in the order they occured, otherwise
    /// it is just `self`.
    pub fn errors(&self) -> &[Error] {
        match &*self.inner {
            ErrorInner::Multiple(errs) => &errs.0,
            _ => std::slice::from_ref(self),
        }
    }

    pub(crate) fn is_key_not_found(&self) -> bool {
        self.kind() == ErrorKind::KeyNotFound
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&*self.inner)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<ErrorInner> for Error {
    fn from(inner: ErrorInner) -> Self {
        Self { inner: Box::new(inner) }
    }
}

impl From<ConfigErrors> for Error {
    fn from(errs: ConfigErrors) -> Self {
        ErrorInner::Multiple(errs).into()
    }
}


/// Ordered collection of errors gathered during one load.
#[derive(Default)]
pub struct ConfigErrors(Vec<Error>);

impl ConfigErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `err`. Collections are flattened: pushing an error of kind
    /// [`ErrorKind::Multiple`] appends its errors instead.
    pub fn push(&mut self, err: Error) {
        match *err.inner {
            ErrorInner::Multiple(errs) => self.0.extend(errs.0),
            inner => self.0.push(inner.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }

    /// `Ok(())` when empty, the collection as one error otherwise.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }

        f.write_str("confill:")?;
        for err in &self.0 {
            write!(f, "\n  * {err}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl IntoIterator for ConfigErrors {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn required(path: &str) -> Error {
        ErrorInner::RequiredField { path: path.into() }.into()
    }

    #[test]
    fn messages() {
        let err: Error = ErrorInner::UnsupportedType {
            kind: Kind::Function,
            element: false,
            path: "Conf.f".into(),
        }.into();
        assert_eq!(err.to_string(), r#"unsupported type: cannot handle type "function" at "Conf.f""#);
        assert_eq!(err.path(), Some("Conf.f"));

        let err: Error = ErrorInner::UnsupportedType {
            kind: Kind::Channel,
            element: true,
            path: "Conf.c".into(),
        }.into();
        assert_eq!(err.to_string(), r#"unsupported type: cannot handle sequence of "channel" at "Conf.c""#);

        assert_eq!(required("Conf.port").to_string(), r#"missing value: "Conf.port" is required"#);

        let err: Error = ErrorInner::InvalidInput(InvalidInput::Nil).into();
        assert_eq!(err.to_string(), "confill: invalid input: nil pointer");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.path(), None);
    }

    #[test]
    fn push_flattens() {
        let mut inner = ConfigErrors::new();
        inner.push(required("A.a"));
        inner.push(required("A.b"));

        let mut outer = ConfigErrors::new();
        outer.push(required("A.x"));
        outer.push(inner.into());
        assert_eq!(outer.len(), 3);

        let paths: Vec<_> = outer.iter().map(|e| e.path().unwrap().to_owned()).collect();
        assert_eq!(paths, ["A.x", "A.a", "A.b"]);
    }

    #[test]
    fn collection_display() {
        let mut errs = ConfigErrors::new();
        assert_eq!(errs.to_string(), "");
        errs.push(required("A.a"));
        errs.push(required("A.b"));

        let err = errs.into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Multiple);
        assert_eq!(err.errors().len(), 2);
        assert_eq!(
            err.to_string(),
            "confill:\n  * missing value: \"A.a\" is required\n  * missing value: \"A.b\" is required",
        );
    }

    #[test]
    fn single_error_slice() {
        let err = required("A.a");
        assert_eq!(err.errors().len(), 1);
        assert!(ConfigErrors::new().into_result().is_ok());
    }
}
