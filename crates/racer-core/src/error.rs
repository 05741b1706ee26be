//! Error types for session operations.

use std::fmt;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A race was started with no track segments placed.
    ///
    /// The user has already been notified when this is returned.
    EmptyTrack,
    /// The run loop's cancellation token has been triggered.
    Cancelled,
    /// A configuration value is out of range.
    InvalidConfig {
        /// The offending field.
        field: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
    /// The configuration file could not be parsed.
    ConfigParse {
        /// The parser's error message.
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyTrack => write!(f, "cannot start a race without track segments"),
            Error::Cancelled => write!(f, "run loop cancelled"),
            Error::InvalidConfig { field, detail } => {
                write!(f, "invalid config value for {field}: {detail}")
            }
            Error::ConfigParse { message } => write!(f, "failed to parse config: {message}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::ConfigParse {
            message: e.to_string(),
        }
    }
}
