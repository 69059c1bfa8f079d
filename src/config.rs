//! # Configuration
//!
//! Settings are read from YAML. Every section and field has a default, so an
//! empty document is a valid configuration:
//!
//! ```yaml
//! logger:
//!   enable: true
//!   level: debug
//!   format: json
//! ontology:
//!   namespace: https://hqdmtop.github.io/hqdm#
//!   kinds:
//!     - kind: http://example.org/kind_of_employee
//!       component: https://hqdmtop.github.io/hqdm#person
//! graph:
//!   referential_integrity: true
//! ```

use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    model::vocabulary::{HQDM_NAMESPACE, RDF_TYPE},
    Result,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logger: Logger,
    pub ontology: OntologySettings,
    pub graph: GraphSettings,
}

impl Config {
    /// # Errors
    ///
    /// Returns [`crate::Error::YAML`] for a document that does not describe a
    /// configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::IO`] when the file cannot be read, otherwise
    /// see [`Self::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Logger {
    /// Install a subscriber at all.
    pub enable: bool,

    pub level: LogLevel,

    pub format: Format,

    /// Filter directives used verbatim instead of `level` and `RUST_LOG`,
    /// e.g. `hqdm_rdf=trace,warn`.
    pub override_filter: Option<String>,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            enable: false,
            level: LogLevel::default(),
            format: Format::default(),
            override_filter: None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(level)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Ontology namespace and extra kind declarations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OntologySettings {
    pub namespace: String,
    pub rdf_type: String,
    /// Kinds registered on top of the built-in `kind_of_*` ones.
    pub kinds: Vec<KindDeclaration>,
}

impl Default for OntologySettings {
    fn default() -> Self {
        Self {
            namespace: HQDM_NAMESPACE.to_string(),
            rdf_type: RDF_TYPE.to_string(),
            kinds: Vec::new(),
        }
    }
}

/// A kind whose members are of `component` type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KindDeclaration {
    pub kind: String,
    pub component: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Reject commits that leave references to identifiers absent from the graph.
    pub referential_integrity: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            referential_integrity: true,
        }
    }
}
