// src/errors.rs

// dependencies
use std::fmt;
use std::io;

// reasons a request path could not be turned into a file under the mount root
#[derive(Debug)]
pub enum ResolveError {
    OutsideRoot,
    InvalidEncoding,
    InvalidSegment(char),
    Io(io::Error),
}

// implement the Display trait for the ResolveError type
impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::OutsideRoot => write!(f, "path escapes the mount root"),
            ResolveError::InvalidEncoding => {
                write!(f, "path is not valid UTF-8 after percent-decoding")
            }
            ResolveError::InvalidSegment(c) => {
                write!(f, "path segment contains invalid character {:?}", c)
            }
            ResolveError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

// implement the Error trait for the ResolveError type
impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ResolveError {
    fn from(err: io::Error) -> Self {
        ResolveError::Io(err)
    }
}
