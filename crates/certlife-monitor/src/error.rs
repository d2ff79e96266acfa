use thiserror::Error;

/// Result type alias for pipeline operations
pub type MonitorResult<T> = std::result::Result<T, MonitorError>;

/// Errors raised by the probe pipeline
#[derive(Error, Debug)]
pub enum MonitorError {
    /// No zone source is enabled, nothing can ever be discovered
    #[error("all DNS providers are disabled")]
    NoSourcesEnabled,

    /// An exclusion pattern failed to compile
    #[error("invalid exclusion pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// Pattern text as configured
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// The metrics listener could not be bound
    #[error("failed to bind metrics listener on {addr}: {source}")]
    Bind {
        /// Requested bind address
        addr: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Invalid runtime setting
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Peer certificate could not be parsed
    #[error("certificate parse error: {0}")]
    Certificate(String),

    /// Network I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
