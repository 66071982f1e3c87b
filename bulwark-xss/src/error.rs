//! Error types for XSS protection
//!
//! Sanitizing, encoding and escaping are total over every `&str` and have no
//! error path. Errors only arise at the edges: loading configuration and
//! serializing output documents.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XssError {
    #[error("Invalid XSS configuration: {0}")]
    Config(String),

    #[error("Failed to parse XSS configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl XssError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

impl From<XssError> for bulwark_core::Error {
    fn from(err: XssError) -> Self {
        match err {
            XssError::Serialization(e) => bulwark_core::Error::Serialization(e.to_string()),
            XssError::Io(e) => bulwark_core::Error::Io(e),
            other => bulwark_core::Error::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, XssError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = XssError::config("unknown rule set 'frames'");
        assert_eq!(
            err.to_string(),
            "Invalid XSS configuration: unknown rule set 'frames'"
        );
    }

    #[test]
    fn test_into_core_error() {
        let core: bulwark_core::Error = XssError::config("bad").into();
        assert!(matches!(core, bulwark_core::Error::Internal(_)));
        assert_eq!(core.status_code(), 500);

        let json_err = serde_json::from_str::<u8>("x").unwrap_err();
        let core: bulwark_core::Error = XssError::from(json_err).into();
        assert!(matches!(core, bulwark_core::Error::Serialization(_)));
    }
}
