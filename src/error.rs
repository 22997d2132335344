//! Error types shared by the compiler, the engine and the host capabilities.

use thiserror::Error;

/// Failures raised while decoding, compiling or playing a script.
#[derive(Error, Debug)]
pub enum DirectorError {
    /// The entry names an operation that is not registered.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Wrong number or shape of arguments, or a violated precondition.
    #[error("Compile error in '{operation}': {message}")]
    Compile { operation: String, message: String },

    /// The script document is not valid YAML.
    #[error("Failed to parse script: {0}")]
    Script(#[from] serde_yaml::Error),

    /// The bound source document contains no playable block.
    #[error("Could not find any script block in the source")]
    EmptySource,

    /// A host capability failed during playback.
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

impl DirectorError {
    pub(crate) fn compile(operation: impl Into<String>, message: impl Into<String>) -> Self {
        DirectorError::Compile {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Failures reported by the host editor behind a [`Target`](crate::host::Target).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("{0} is unavailable")]
    Unavailable(String),

    #[error("Command '{name}' failed: {message}")]
    CommandFailed { name: String, message: String },
}

pub type Result<T, E = DirectorError> = std::result::Result<T, E>;
