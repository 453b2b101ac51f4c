use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

/// Various error types
#[derive(Debug, Error)]
pub enum BuildError {
    /// The `solc` invocation itself failed
    #[error("solc error: {0}")]
    Solc(String),
    /// The compiler reported at least one error-severity diagnostic
    #[error("compiler reported {} error(s)", .0.iter().filter(|e| e.severity.is_error()).count())]
    Diagnostics(Vec<crate::artifacts::Error>),
    #[error("failed to create build directory \"{}\": {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    SemverError(#[from] semver::Error),
    /// Deserialization error
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    /// Filesystem IO error
    #[error(transparent)]
    Io(#[from] SolcIoError),
    /// General purpose message
    #[error("{0}")]
    Message(String),
}

impl BuildError {
    pub(crate) fn io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        SolcIoError::new(err, path).into()
    }
    pub(crate) fn solc(msg: impl Into<String>) -> Self {
        BuildError::Solc(msg.into())
    }
    pub(crate) fn msg(msg: impl Into<String>) -> Self {
        BuildError::Message(msg.into())
    }
}

#[derive(Debug, Error)]
#[error("\"{}\": {io}", self.path.display())]
pub struct SolcIoError {
    io: io::Error,
    path: PathBuf,
}

impl SolcIoError {
    pub fn new(io: io::Error, path: impl Into<PathBuf>) -> Self {
        Self { io, path: path.into() }
    }

    /// The path the operation failed on
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl From<SolcIoError> for io::Error {
    fn from(err: SolcIoError) -> Self {
        err.io
    }
}
