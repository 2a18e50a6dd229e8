//! Runtime error types.

use comphost_schema::GenerateError;
use std::path::PathBuf;

/// Failure raised by a component constructor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ConstructError {
    pub message: String,
}

impl ConstructError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors of locating, loading and instantiating components.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// No component class with this name in the source
    #[error("Component {component} not found in {}", .directory.display())]
    ComponentNotFound { component: String, directory: PathBuf },

    /// No runtime module is available for a unit
    #[error("No runtime module for {}", .path.display())]
    ModuleNotFound { path: PathBuf },

    /// The loaded module does not export the component class
    #[error("Component class {component} not found in module {}", .module.display())]
    ExportNotFound { component: String, module: PathBuf },

    /// The component constructor failed
    #[error("Failed to instantiate component {component}: {source}")]
    ConstructFailed {
        component: String,
        #[source]
        source: ConstructError,
    },
}

/// Errors of the provider lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A call that needs a session arrived before `parameterize`
    #[error("parameterize must be called before {operation}")]
    NotParameterized { operation: &'static str },

    /// Type token without a `<package>:<module>:<Name>` shape
    #[error("Invalid type token '{0}': expected <package>:<module>:<Name>")]
    InvalidTypeToken(String),

    /// The directory could not be made absolute
    #[error("Invalid directory {}: {source}", .directory.display())]
    InvalidDirectory {
        directory: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema generation failed while parameterizing
    #[error("Failed to parameterize {}: {source}", .directory.display())]
    Parameterize {
        directory: PathBuf,
        #[source]
        source: GenerateError,
    },

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Failed to serialize schema: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Parameter that does not decode to a directory
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
