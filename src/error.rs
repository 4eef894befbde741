//! Domain-specific error types for the component installer.
//!
//! The resolution pipeline returns typed errors built with [`thiserror`];
//! task and command code converts them to [`anyhow::Error`] at the CLI
//! boundary via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotfilesError
//! ├── Schema(SchemaError)         : manifest fails structural validation
//! ├── Resolution(ResolutionError) : a component cannot be resolved
//! ├── Config(ConfigError)         : environment precondition unmet
//! ├── Catalog(CatalogError)       : the source root is unusable
//! └── Platform(PlatformError)     : machine detection failed
//! ```

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the component installer.
#[derive(Error, Debug)]
pub enum DotfilesError {
    /// A manifest document failed validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A component could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// An environment precondition was not met.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The component catalog could not be built.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Machine detection failed.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// What is wrong with a single manifest field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required field is absent.
    Missing,
    /// The field holds a value of the wrong type.
    WrongType {
        /// Expected type name (e.g. `"string"`).
        expected: &'static str,
    },
    /// The field holds a value outside its allowed set.
    InvalidValue {
        /// The rejected value.
        value: String,
        /// Human-readable description of the accepted values.
        expected: String,
    },
}

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the field, e.g. `configs[1].method`.
    pub field: String,
    /// The kind of violation.
    pub kind: ViolationKind,
}

impl Violation {
    /// Create a violation for `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "missing required field `{}`", self.field),
            ViolationKind::WrongType { expected } => {
                write!(f, "field `{}` must be a {expected}", self.field)
            }
            ViolationKind::InvalidValue { value, expected } => {
                write!(
                    f,
                    "field `{}` has invalid value '{value}' (expected {expected})",
                    self.field
                )
            }
        }
    }
}

/// A manifest document failed structural, type, or enum validation.
///
/// Carries every violation found, never just the first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid manifest: {}", join_violations(.violations))]
pub struct SchemaError {
    /// All violated field constraints, in document order.
    pub violations: Vec<Violation>,
}

impl SchemaError {
    /// Whether any violation concerns `field`.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a component failed to resolve.
#[derive(Error, Debug)]
pub enum ResolutionCause {
    /// No manifest file in the component directory.
    #[error("manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    /// The manifest exists but could not be read.
    #[error("cannot read manifest {}: {source}", .path.display())]
    Unreadable {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest is not a well-formed document.
    #[error("malformed manifest: {0}")]
    Malformed(String),

    /// The document failed schema validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The component directory is missing or not a directory.
    #[error("missing src directory: {}", .0.display())]
    MissingSrc(PathBuf),

    /// A `configs[].from` path does not exist.
    #[error("source path not found: '{from}' ({})", .path.display())]
    SourceNotFound {
        /// The `from` value as written in the manifest.
        from: String,
        /// The path that was checked.
        path: PathBuf,
    },

    /// A `configs[].from` path leaves the component directory.
    #[error("source path escapes component directory: '{from}'")]
    SourceOutsideComponent {
        /// The `from` value as written in the manifest.
        from: String,
    },

    /// The component path could not be made absolute.
    #[error("invalid component path: {0}")]
    InvalidPath(#[source] std::io::Error),

    /// The requested name is not a single directory name under the root.
    #[error("not a component directory name")]
    InvalidName,
}

/// A component could not be resolved from its directory.
#[derive(Error, Debug)]
#[error("component '{component}': {cause}")]
pub struct ResolutionError {
    /// Directory name of the component.
    pub component: String,
    /// The specific cause.
    #[source]
    pub cause: ResolutionCause,
}

impl ResolutionError {
    /// Create a resolution error for `component`.
    #[must_use]
    pub fn new(component: impl Into<String>, cause: ResolutionCause) -> Self {
        Self {
            component: component.into(),
            cause,
        }
    }
}

/// An environment precondition for path resolution was not met.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `~` expansion was requested but no home directory is configured.
    #[error("home not set")]
    HomeNotSet,

    /// The path could not be made absolute (empty path or unreadable cwd).
    #[error("cannot make '{path}' absolute: {source}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// The source root cannot be used to build a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The source root does not exist.
    #[error("source directory does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The source root exists but cannot be listed.
    #[error("cannot read source directory {}: {source}", .path.display())]
    Unreadable {
        /// The source root.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise while identifying the current machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The identifier is not one of the supported machines.
    #[error("unknown machine identifier '{0}'")]
    UnknownMachine(String),

    /// Detection failed (e.g. missing system identification file).
    #[error("Platform detection failed: {0}")]
    DetectionFailed(String),
}
