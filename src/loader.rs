use std::{fmt, path::PathBuf};

use crate::{
    env::{EnvProvider, Vars},
    error::ConfigErrors,
    file::{FileProvider, ENV_EXT},
    Error, Input, Provider, Reflect,
};


/// Convenience function for [`Loader::new`].
pub fn load() -> Loader {
    Loader::new()
}

/// Loads configuration from several providers into a struct.
///
/// **Providers run in the order they were added**. The value of a later
/// provider replaces the value of an earlier one, except for file providers,
/// which only write fields present in their file. Fields that no provider
/// set get their default value, if any.
///
/// ```
/// use confill::Config;
///
/// #[derive(Config)]
/// struct Conf {
///     #[config(default = 8080)]
///     port: u16,
///     #[config(default = "localhost")]
///     host: String,
/// }
///
/// let mut conf = Conf { port: 0, host: String::new() };
/// confill::load()
///     .file("/etc/myapp/config.toml")
///     .env_with(confill::EnvProvider::new().prefix("MYAPP_"))
///     .load_into(&mut conf)?;
/// # Ok::<_, confill::Error>(())
/// ```
#[derive(Default)]
pub struct Loader {
    providers: Vec<Box<dyn Provider>>,
    vars: Option<Vars>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the environment variables as a provider, with default settings.
    pub fn env(self) -> Self {
        self.env_with(EnvProvider::new())
    }

    /// Adds the environment variables as a provider.
    pub fn env_with(self, provider: EnvProvider) -> Self {
        self.provider(provider)
    }

    /// Adds a configuration file as provider. The format is inferred from
    /// the file extension. `.env` files are read by an [`EnvProvider`], for
    /// unknown extensions, [`Loader::load_into`] will return an error.
    ///
    /// The file is not required: if it does not exist, it is skipped.
    pub fn file(self, path: impl Into<PathBuf>) -> Self {
        self.file_with(FileProvider::new(path))
    }

    /// Like [`Loader::file`], but with a configured [`FileProvider`].
    pub fn file_with(self, file: FileProvider) -> Self {
        if file.ext == ENV_EXT {
            let mut env = EnvProvider::from_file(file.path);
            env.required = file.required;
            self.provider(env)
        } else {
            self.provider(file)
        }
    }

    /// Adds a custom provider.
    pub fn provider(mut self, provider: impl Provider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Uses `vars` instead of the process environment, for environment
    /// providers and for `expand`.
    pub fn with_vars(mut self, vars: Vars) -> Self {
        self.vars = Some(vars);
        self
    }

    pub fn providers(&self) -> &[Box<dyn Provider>] {
        &self.providers
    }

    /// Loads all providers in order into `target`, then applies defaults and
    /// checks required fields.
    ///
    /// If the type of some field of `target` is not supported, an error is
    /// returned before any provider runs. All other errors are collected and
    /// returned together as one error of kind
    /// [`Multiple`][crate::ErrorKind::Multiple].
    pub fn load_into<T: Reflect>(&self, target: &mut T) -> Result<(), Error> {
        let vars = self.vars.clone().unwrap_or_else(Vars::os);
        let mut input = Input::with_vars(target, vars)?;
        let mut errors = ConfigErrors::new();

        for provider in &self.providers {
            tracing::debug!(provider = %provider.name(), "loading");

            if let Some(unmarshaler) = provider.unmarshaler() {
                if let Err(e) = unmarshaler.unmarshal_struct(input.root_mut()) {
                    errors.push(e);
                }
            }
            if let Some(filler) = provider.filler() {
                if let Err(e) = filler.fill(&mut input) {
                    errors.push(e);
                }
            }
        }

        input.finalize(&mut errors);
        if !errors.is_empty() {
            tracing::debug!(input = input.name(), errors = errors.len(), "loading failed");
        }
        errors.into_result()
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = self.providers.iter().map(|p| p.name()).collect::<Vec<_>>();
        f.debug_struct("Loader")
            .field("providers", &names)
            .field("vars", &self.vars.as_ref().map(Vars::len))
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn file_routing() {
        let loader = load()
            .file("config.json")
            .file("local.env")
            .file_with(FileProvider::new(".env").required())
            .env();

        let names = loader.providers().iter().map(|p| p.name()).collect::<Vec<_>>();
        assert_eq!(names, ["File provider (json)", "ENV provider", "ENV provider", "ENV provider"]);
    }
}
