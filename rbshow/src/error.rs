use std::fmt::Display;
use std::io;

use log::SetLoggerError;

/// A simple wrapper around the different sources of errors that can happen.
#[derive(Debug)]
pub enum Error {
    /// Reading a script or writing a tree dump failed.
    Io(io::Error),
    /// A script line could not be understood. `line` is 1-based.
    Parse { line: usize, message: String },
    /// The logger could not be installed.
    Log(SetLoggerError),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<SetLoggerError> for Error {
    fn from(e: SetLoggerError) -> Self {
        Self::Log(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => e.fmt(f),
            Self::Parse { line, message } => write!(f, "line {line}: {message}"),
            Self::Log(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse { .. } => None,
            Self::Log(e) => Some(e),
        }
    }
}
