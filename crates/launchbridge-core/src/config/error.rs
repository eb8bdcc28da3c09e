use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error during operation '{operation}' on path '{path}': {source}", path = .path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format for path: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Deserialization from '{format}' failed: {source}")]
    Deserialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn deserialization<E>(format: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::Deserialization {
            format: format.to_string(),
            source: Box::new(source),
        }
    }
}
