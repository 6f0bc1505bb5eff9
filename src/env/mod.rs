//! Environment variables and dotenv files as source.

use std::path::PathBuf;

use heck::ToSnakeCase;

use crate::{
    error::{ConfigErrors, ErrorInner},
    provider::{Filler, Provider},
    Error, Input,
};

mod vars;

#[cfg(test)]
mod tests;

pub use self::vars::Vars;


/// Loads values from environment variables and, optionally, a dotenv file.
///
/// The variable for a field is its explicit `key` if it has one, otherwise
/// it is built from the field path: each segment is converted to
/// `snake_case`, the segments are joined with `field_separator` and the
/// result is upper-cased. With the default settings, the field `db.max_conn`
/// is read from `DB_MAX_CONN`. In both cases, `prefix` is prepended.
///
/// Variables of the process environment take precedence over the ones in the
/// dotenv file. Every field found is set, even if an earlier provider already
/// set it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvProvider {
    /// Prepended to all keys. Default: `""`.
    pub prefix: String,

    /// Whether to convert path segments to `snake_case`. Default: `true`.
    pub snake_case: bool,

    /// Whether to upper-case keys built from the path. Default: `true`.
    pub upper_case: bool,

    /// Joins path segments. Default: `"_"`.
    pub field_separator: String,

    /// Dotenv file to read in addition to the environment.
    pub source: Option<PathBuf>,

    /// Whether a missing `source` file is an error. Default: `false`.
    pub required: bool,

    /// Environment to use instead of the one given to the loader.
    pub vars: Option<Vars>,
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            snake_case: true,
            upper_case: true,
            field_separator: "_".into(),
            source: None,
            required: false,
            vars: None,
        }
    }
}

impl EnvProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider reading the dotenv file `path` in addition to the environment.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new().source(path)
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn snake_case(mut self, snake_case: bool) -> Self {
        self.snake_case = snake_case;
        self
    }

    pub fn upper_case(mut self, upper_case: bool) -> Self {
        self.upper_case = upper_case;
        self
    }

    pub fn field_separator(mut self, separator: impl Into<String>) -> Self {
        self.field_separator = separator.into();
        self
    }

    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Marks the `source` file as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn vars(mut self, vars: Vars) -> Self {
        self.vars = Some(vars);
        self
    }

    /// The variable name for a field with the given explicit key and path.
    pub fn key(&self, key: Option<&str>, path: &[&str]) -> String {
        if let Some(key) = key {
            return format!("{}{key}", self.prefix);
        }

        let segments = path.iter()
            .map(|s| if self.snake_case { s.to_snake_case() } else { (*s).to_owned() })
            .collect::<Vec<_>>();
        let mut key = segments.join(&self.field_separator);
        if self.upper_case {
            key = key.to_uppercase();
        }

        format!("{}{key}", self.prefix)
    }

    /// Looks up the value for a field. Errors with kind
    /// [`KeyNotFound`][crate::ErrorKind::KeyNotFound] if there is none.
    pub fn provide(&self, vars: &Vars, key: Option<&str>, path: &[&str]) -> Result<String, Error> {
        let key = self.key(key, path);
        match vars.get(&key) {
            Some(value) => Ok(value.to_owned()),
            None => Err(Error::key_not_found(key)),
        }
    }

    /// The variables to read from: this provider's snapshot (or `fallback`)
    /// plus the variables of the dotenv file that are not set already.
    pub fn env_map(&self, fallback: &Vars) -> Result<Vars, Error> {
        let mut vars = self.vars.clone().unwrap_or_else(|| fallback.clone());
        let Some(path) = &self.source else {
            return Ok(vars);
        };

        let dotenv_error = |e: dotenvy::Error| -> Error {
            match e {
                dotenvy::Error::Io(err) => ErrorInner::Io { path: path.clone(), err },
                other => ErrorInner::Decode {
                    file: path.clone(),
                    path: None,
                    msg: other.to_string(),
                },
            }.into()
        };

        match dotenvy::from_path_iter(path) {
            Ok(iter) => {
                let pairs = iter.collect::<Result<Vec<_>, _>>().map_err(dotenv_error)?;
                tracing::debug!(path = %path.display(), vars = pairs.len(), "read dotenv file");
                vars.merge_missing(pairs);
            }
            Err(e) if e.not_found() => {
                if self.required {
                    return Err(ErrorInner::MissingRequiredFile { path: path.clone() }.into());
                }
                tracing::debug!(path = %path.display(), "optional dotenv file not found");
            }
            Err(e) => return Err(dotenv_error(e)),
        }

        Ok(vars)
    }
}

impl Provider for EnvProvider {
    fn name(&self) -> String {
        "ENV provider".into()
    }

    fn filler(&self) -> Option<&dyn Filler> {
        Some(self)
    }
}

impl Filler for EnvProvider {
    fn fill(&self, input: &mut Input<'_>) -> Result<(), Error> {
        let vars = self.env_map(input.vars())?;
        let mut errors = ConfigErrors::new();

        for i in 0..input.fields().len() {
            let field = &input.fields()[i];
            let value = match self.provide(&vars, field.tags.key, &field.path) {
                Ok(v) => v,
                Err(e) if e.is_key_not_found() => {
                    tracing::trace!(field = %input.path(i), "{e}");
                    continue;
                }
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            match input.set_value(i, &value) {
                Ok(()) => input.mark_set(i),
                Err(e) => errors.push(e),
            }
        }

        errors.into_result()
    }
}
