//! Configuration files as source.

use std::{fs, io, path::{Path, PathBuf}};

use crate::{
    error::ErrorInner,
    provider::{Filler, Provider, Unmarshaler},
    Error, Input, Reflect,
};

mod node;
mod unmarshal;

use self::node::Node;


/// Extension of dotenv files. Files with this extension are loaded by an
/// [`EnvProvider`][crate::EnvProvider].
pub const ENV_EXT: &str = "env";

/// A JSON, YAML or TOML file as source for configuration.
///
/// The format is chosen by the file extension. By default, the file is
/// considered optional: if it does not exist, the provider does nothing.
///
/// As [`Unmarshaler`], the decoded file is written into the struct directly,
/// using the native types of the format. As [`Filler`], the provider only
/// marks the fields present in the file as set, so that defaults are not
/// applied to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProvider {
    pub path: PathBuf,

    /// Everything after the last `.` of the file name, e.g. `json`. For
    /// `.env` this is `env`.
    pub ext: String,

    /// Whether a missing file is an error.
    pub required: bool,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ext = extension(&path).to_owned();
        Self { path, ext, required: false }
    }

    /// Marks this file as required: loading fails if it does not exist.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The format of this file, `None` if the extension is unknown or the
    /// corresponding crate feature is disabled.
    pub fn format(&self) -> Option<FileFormat> {
        FileFormat::from_extension(&self.ext)
    }

    /// Reads and decodes the file. `Ok(None)` if there is nothing to load:
    /// the file is optional and missing, or it is empty.
    fn load(&self) -> Result<Option<(FileFormat, Node)>, Error> {
        let format = self.format().ok_or_else(|| ErrorInner::UnsupportedFileExt {
            ext: self.ext.clone(),
            path: self.path.clone(),
        })?;

        let content = match fs::read_to_string(&self.path) {
            Ok(v) => v,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.required {
                    return Err(ErrorInner::MissingRequiredFile { path: self.path.clone() }.into());
                }
                tracing::debug!(path = %self.path.display(), "optional config file not found");
                return Ok(None);
            }
            Err(e) => return Err(ErrorInner::Io { path: self.path.clone(), err: e }.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let decode_error = |msg: String| ErrorInner::Decode {
            file: self.path.clone(),
            path: None,
            msg,
        };
        match format.decode(&content).map_err(decode_error)? {
            Node::Null => Ok(None),
            node @ Node::Map(_) => Ok(Some((format, node))),
            other => Err(decode_error(format!(
                "top-level value must be a map, found {}",
                other.describe(),
            )).into()),
        }
    }
}

impl Provider for FileProvider {
    fn name(&self) -> String {
        format!("File provider ({})", self.ext)
    }

    fn filler(&self) -> Option<&dyn Filler> {
        Some(self)
    }

    fn unmarshaler(&self) -> Option<&dyn Unmarshaler> {
        Some(self)
    }
}

impl Unmarshaler for FileProvider {
    fn unmarshal_struct(&self, root: &mut dyn Reflect) -> Result<(), Error> {
        match self.load()? {
            Some((format, node)) => unmarshal::unmarshal(root, &node, format, &self.path),
            None => Ok(()),
        }
    }
}

impl Filler for FileProvider {
    fn fill(&self, input: &mut Input<'_>) -> Result<(), Error> {
        let Some((format, content)) = self.load()? else {
            return Ok(());
        };

        let hits = input.fields().iter()
            .enumerate()
            .filter(|(_, f)| !f.is_set)
            .filter(|(_, f)| {
                content.lookup(&f.file_path(format)).is_some_and(|n| !n.is_null())
            })
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        for i in hits {
            tracing::trace!(field = %input.path(i), file = %self.path.display(), "found value");
            input.mark_set(i);
        }
        Ok(())
    }
}

fn extension(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .map_or("", |(_, ext)| ext)
}


/// All file formats supported by confill.
///
/// All enum variants are `#[cfg]` guarded with the respective crate feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FileFormat {
    #[cfg(feature = "toml")] Toml,
    #[cfg(feature = "yaml")] Yaml,

    /// Also used for plain JSON, as JSON5 is a superset of it.
    #[cfg(feature = "json5")] Json5,
}

impl FileFormat {
    /// Guesses the file format from a file extension, returning `None` if the
    /// extension is unknown or if the respective crate feature is not enabled.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            #[cfg(feature = "toml")]
            "toml" => Some(Self::Toml),

            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Some(Self::Yaml),

            #[cfg(feature = "json5")]
            "json" | "json5" => Some(Self::Json5),

            _ => None,
        }
    }

    fn decode(self, content: &str) -> Result<Node, String> {
        // With all format features disabled, this type is uninhabited.
        #![cfg_attr(
            not(any(feature = "toml", feature = "yaml", feature = "json5")),
            allow(unused_variables),
        )]

        match self {
            #[cfg(feature = "toml")]
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),

            #[cfg(feature = "yaml")]
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),

            #[cfg(feature = "json5")]
            Self::Json5 => json5::from_str(content).map_err(|e| e.to_string()),
        }
    }
}
