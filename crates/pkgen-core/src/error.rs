//! Unified error types for pkgen.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause carried by errors that wrap heterogeneous failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// How a template was looked up, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateLookup {
    /// Lookup by name in the built-in bundle.
    Name(String),
    /// Lookup of a custom template file on disk.
    File(PathBuf),
}

impl fmt::Display for TemplateLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "no built-in template named '{name}'"),
            Self::File(path) => write!(f, "custom template file {}", path.display()),
        }
    }
}

/// All errors that can occur during a pkgen run.
#[derive(Error, Debug)]
pub enum PkgenError {
    // --- Configuration ---

    /// A config file named explicitly with `-config` does not exist.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file exists but could not be read.
    #[error("failed to read config at {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file exists but is not valid YAML for the config schema.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The `templates` value has a shape that cannot be turned into references.
    #[error("malformed template configs: {0}")]
    MalformedTemplateReferences(String),

    /// A permission literal such as `-mod 0o9` could not be parsed.
    #[error("invalid file mode '{0}' (expected e.g. 0o644, 0O644 or 644)")]
    InvalidFileMode(String),

    // --- Discovery ---

    /// A required external tool (the `go` command) is not installed.
    #[error("required tool '{name}' not found; install: {install}")]
    MissingTool { name: String, install: String },

    /// The package loader itself failed.
    #[error("package discovery failed: {0}")]
    Discovery(String),

    // --- Templates ---

    /// A template reference could not be resolved to a compiled template.
    #[error("template not found: {lookup}")]
    TemplateNotFound {
        lookup: TemplateLookup,
        #[source]
        source: Option<BoxError>,
    },

    // --- Generation ---

    /// A template failed to execute against a package.
    #[error("template '{template}' failed to render: {message}")]
    TemplateRender { template: String, message: String },

    /// The output file name template failed to compile or render.
    #[error("output name template failed: {0}")]
    OutputName(String),

    /// The generated file could not be written.
    #[error("failed to write {path}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PkgenError {
    pub(crate) fn template_not_found(lookup: TemplateLookup, source: impl Into<BoxError>) -> Self {
        Self::TemplateNotFound {
            lookup,
            source: Some(source.into()),
        }
    }

    /// Whether this error belongs to the configuration category.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigRead { .. }
                | Self::ConfigParse { .. }
                | Self::MalformedTemplateReferences(_)
                | Self::InvalidFileMode(_)
        )
    }
}

/// Alias for `Result<T, PkgenError>`.
pub type Result<T> = std::result::Result<T, PkgenError>;
