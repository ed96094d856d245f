use std::error::Error;
use std::fmt;
use std::io;

/// Errors raised while following a run
#[derive(Debug)]
pub enum ProgressError {
    /// The hub was dropped before the run reached a terminal state
    Closed,
    /// Writing a rendered line failed
    Io(io::Error),
}

impl fmt::Display for ProgressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressError::Closed => write!(f, "Progress stream closed before the run finished"),
            ProgressError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl Error for ProgressError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProgressError::Io(err) => Some(err),
            ProgressError::Closed => None,
        }
    }
}

impl From<io::Error> for ProgressError {
    fn from(err: io::Error) -> Self {
        ProgressError::Io(err)
    }
}
