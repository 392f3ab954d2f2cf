//! Error types for the Linux GPIO ISP port

use thiserror::Error;

/// Linux GPIO ISP specific errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to request GPIO lines
    #[error("failed to request GPIO lines: {0}")]
    LineRequestFailed(#[source] gpiocdev::Error),

    /// GPIO chip or device not specified
    #[error("no GPIO chip specified; use dev=/dev/gpiochipN or gpiochip=N")]
    NoDevice,

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing required parameter
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Result type for Linux GPIO ISP operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
