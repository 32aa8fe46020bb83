use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{what} not found at: {}", path.display())]
    NotFound { what: String, path: PathBuf },
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid value for {key}: expected {expected}, got `{value}`")]
    Parse {
        key: String,
        value: String,
        expected: &'static str,
    },
    #[error("no matching configuration keys found to update")]
    NoKeysUpdated,
    #[error("network error: {0}")]
    Network(String),
    #[error("request to {url} failed with status: {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("archive error: {0}")]
    Archive(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("process error: {0}")]
    Process(String),
}

impl CoreError {
    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        CoreError::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    pub fn parse(key: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        CoreError::Parse {
            key: key.into(),
            value: value.into(),
            expected,
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Network(err.to_string())
    }
}

impl From<zip::result::ZipError> for CoreError {
    fn from(err: zip::result::ZipError) -> Self {
        CoreError::Archive(err.to_string())
    }
}

/// Attaches the failed action and path to a bare `io::Error`.
pub trait IoContext<T> {
    fn io_context(self, action: &'static str, path: &Path) -> CoreResult<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context(self, action: &'static str, path: &Path) -> CoreResult<T> {
        self.map_err(|source| CoreError::Io {
            action,
            path: path.to_path_buf(),
            source,
        })
    }
}
