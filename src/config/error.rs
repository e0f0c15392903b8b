//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading `toc.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read TOC config `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    /// Syntax errors and unknown keys, with the toml location.
    #[error("invalid TOC config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A well-formed value the component cannot work with.
    #[error("unusable TOC setting {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("toc.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert_eq!(display, "cannot read TOC config `toc.toml`");

        let validation_err = ConfigError::Validation("[toc.levels] must not be empty".to_string());
        assert_eq!(
            format!("{validation_err}"),
            "unusable TOC setting [toc.levels] must not be empty"
        );
    }

    #[test]
    fn test_toml_error_converts() {
        let err = toml::from_str::<toml::Value>("[toc").unwrap_err();
        let config_err: ConfigError = err.into();
        assert!(matches!(config_err, ConfigError::Toml(_)));
        assert!(format!("{config_err}").starts_with("invalid TOC config: "));
    }
}
