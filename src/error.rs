use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::hash::RttiId;

#[derive(Debug)]
pub enum RttiError {
    /// Reference-form cast to a class the object does not derive from
    TypeMismatch { from: &'static str, to: &'static str },
    /// Two distinct classes hash to the same id
    IdCollision {
        id: RttiId,
        existing: String,
        incoming: String,
    },
    Config {
        path: Option<PathBuf>,
        message: String,
    },
    Io(io::Error),
}

impl RttiError {
    pub fn type_mismatch(from: &'static str, to: &'static str) -> Self {
        Self::TypeMismatch { from, to }
    }

    pub fn config(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path,
            message: message.into(),
        }
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}

impl fmt::Display for RttiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { from, to } => {
                write!(f, "Type mismatch: {} is not a {}", from, to)
            }
            Self::IdCollision { id, existing, incoming } => {
                write!(
                    f,
                    "Type id collision {:#010x}: {} and {}",
                    id, existing, incoming
                )
            }
            Self::Config { path: Some(path), message } => {
                write!(f, "Invalid config {}: {}", path.display(), message)
            }
            Self::Config { path: None, message } => {
                write!(f, "Invalid config: {}", message)
            }
            Self::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for RttiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RttiError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, RttiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display() {
        let err = RttiError::type_mismatch("zoo::Penguin", "zoo::Rock");
        assert!(err.is_type_mismatch());
        assert_eq!(err.to_string(), "Type mismatch: zoo::Penguin is not a zoo::Rock");

        let err = RttiError::IdCollision {
            id: 0xdead_beef,
            existing: "a::X".to_string(),
            incoming: "b::Y".to_string(),
        };
        assert_eq!(err.to_string(), "Type id collision 0xdeadbeef: a::X and b::Y");

        let err = RttiError::config(Some(PathBuf::from("rtti.toml")), "bad policy");
        assert_eq!(err.to_string(), "Invalid config rtti.toml: bad policy");
    }

    #[test]
    fn test_io_source() {
        let err: RttiError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
        assert!(!err.is_type_mismatch());
    }
}
