//! Per-network registry configuration.
//!
//! [`DeployOptions`] is the declarative table a router deployment reads
//! once: which adapters to register, in which order, and which tokens may
//! serve as intermediate hops.

mod deploy_options;

pub use deploy_options::{DeployOptions, NetworkOptions};

/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {message}")]
    FileRead {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        message: String,
    },

    /// The TOML document could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A value failed validation.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Reason.
        message: String,
    },

    /// No section for the requested network.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
