//! Populate plain structs from environment variables, dotenv files and
//! JSON/YAML/TOML files.
//!
//! Derive [`Config`] for your struct, then hand a mutable reference to a
//! [`Loader`]. Every leaf field can be set from a string: numbers, booleans,
//! strings, durations, timestamps, URLs, complex numbers, sequences and
//! optional values of those. Nested structs are descended into.
//!
//! ```
//! use std::time::Duration;
//! use confill::Config;
//!
//! /// Settings of our app.
//! #[derive(Config)]
//! struct Conf {
//!     #[config(default = "0.0.0.0")]
//!     host: String,
//!
//!     /// Read from `APP_PORT`.
//!     #[config(key = "APP_PORT", default = 8080)]
//!     port: u16,
//!
//!     #[config(default = "30s")]
//!     timeout: Duration,
//!
//!     db: Database,
//! }
//!
//! #[derive(Config)]
//! struct Database {
//!     /// Read from `DB_URL`.
//!     #[config(required, expand)]
//!     url: String,
//!
//!     #[config(separator = ",")]
//!     replicas: Vec<String>,
//! }
//!
//! let vars: confill::Vars = [("DB_URL", "postgres://$USER@db/app"), ("USER", "peter")]
//!     .into_iter()
//!     .collect();
//!
//! let mut conf = Conf::zero_value();
//! confill::load().env().with_vars(vars).load_into(&mut conf)?;
//!
//! assert_eq!(conf.port, 8080);
//! assert_eq!(conf.timeout, Duration::from_secs(30));
//! assert_eq!(conf.db.url, "postgres://peter@db/app");
//! # Ok::<_, confill::Error>(())
//! ```
//!
//! # Field attributes
//!
//! - `key = "NAME"`: explicit key for environment providers. `"-"` ignores
//!   the field.
//! - `json = "..."`, `yaml = "..."`, `toml = "..."`: key of the field in
//!   files of that format.
//! - `default = ...`: string, integer, float or bool literal, used when no
//!   provider sets the field.
//! - `required`: loading fails if no provider sets the field.
//! - `ignore`: the field is never touched and uses `Default` for
//!   [`Config::zero_value`].
//! - `expand`: `$VAR` and `${VAR}` in the value are replaced.
//! - `separator = "..."`: separates sequence items (default: `" "`).
//! - `format = "..."`: `chrono` layout for timestamps (default: RFC 3339).

extern crate self as confill;

pub mod env;
pub mod error;
pub mod file;
pub mod meta;

mod convert;
mod input;
mod kind;
mod loader;
mod provider;
mod reflect;
mod tags;

pub use confill_macro::Config;

pub use chrono;
pub use num_complex;
pub use url;

pub use self::{
    env::{EnvProvider, Vars},
    error::{ConfigErrors, Error, ErrorKind, InvalidInput},
    file::{FileFormat, FileProvider},
    input::{Field, Input},
    kind::{Kind, Unsupported, UnsupportedField},
    loader::{load, Loader},
    provider::{Filler, Provider, Unmarshaler},
    reflect::{check_field, ElementFn, PointeeFn, Reflect, Scalar, SetError, Struct},
    tags::ConfigTags,
};


/// A configuration struct. Implemented via `#[derive(Config)]`, which also
/// implements [`Reflect`] and [`Struct`].
pub trait Config: Reflect + Struct + Sized {
    /// Structural metadata: field names, doc comments and attributes.
    const META: meta::Meta;

    /// A value with all fields set to their zero value: `0`, `false`, empty
    /// strings and sequences, `None`. Ignored fields use `Default`.
    ///
    /// # Panics
    ///
    /// If some field has a type without zero value: functions, channels,
    /// pointers and `dyn Any`. Such structs cannot be loaded anyway.
    fn zero_value() -> Self {
        match Self::zero() {
            Some(v) => v,
            None => panic!("`{}` has a field without zero value", Self::META.name),
        }
    }
}
