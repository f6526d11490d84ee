//! Which ingestion backends this build carries, and dispatch to them.
use std::fmt;
use std::path::Path;

use crate::data::Data;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Json,
    Yaml,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Json, Backend::Yaml];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Json => "JSON",
            Backend::Yaml => "YAML",
        }
    }

    /// Whether the backend was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Json => cfg!(feature = "json"),
            Backend::Yaml => cfg!(feature = "yaml"),
        }
    }

    /// Guess from a file extension (`.json`, `.yaml`, `.yml`; case-insensitive).
    pub fn from_extension(path: &Path) -> Option<Backend> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Backend::Json),
            "yaml" | "yml" => Some(Backend::Yaml),
            _ => None,
        }
    }

    pub fn ingest(self, text: &str) -> Result<Data> {
        match self {
            Backend::Json => Data::from_json(text),
            Backend::Yaml => Data::from_yaml(text),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn available() -> Vec<Backend> {
    Backend::ALL.into_iter().filter(|b| b.is_available()).collect()
}

// ----------------------------- Entry points ------------------------------- //

impl Data {
    /// Build a fresh tree from JSON text.
    ///
    /// `null`, `false` and `""` all become an empty `String`; `true` becomes
    /// `"true"`; numbers keep serde_json's textual rendering.
    pub fn from_json(text: &str) -> Result<Data> {
        #[cfg(feature = "json")]
        {
            crate::json::from_str(text)
        }
        #[cfg(not(feature = "json"))]
        {
            let _ = text;
            Err(crate::error::Error::FeatureDisabled(Backend::Json))
        }
    }

    /// Build a fresh tree from the first document of a YAML stream.
    ///
    /// Scalars are kept verbatim, with no boolean or null coercion.
    pub fn from_yaml(text: &str) -> Result<Data> {
        #[cfg(feature = "yaml")]
        {
            crate::yaml::from_str(text)
        }
        #[cfg(not(feature = "yaml"))]
        {
            let _ = text;
            Err(crate::error::Error::FeatureDisabled(Backend::Yaml))
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
