//! Error taxonomy for a conversion run.
//!
//! Schema, resource, template and layout errors are fatal: the run stops before
//! anything else is written. Naming collisions and bad user input never reach
//! this type, they are resolved interactively.

use crate::buffer::BufferError;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConvertError {
    /// A project file or header lacks an anchor the editor relies on
    Schema { path: PathBuf, message: String },
    /// A required file could not be opened, read or written
    Resource {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Template and substitutions disagree (unresolved placeholder)
    Template(String),
    /// The API header name could not be made unique
    Naming(String),
    /// A directory mixes contents in a way no template covers
    Layout { path: PathBuf, message: String },
    /// An edit plan did not fit the buffer it was applied to
    Buffer(BufferError),
}

impl ConvertError {
    pub fn schema(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConvertError::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Resource {
            path: path.into(),
            source,
        }
    }

    pub fn layout(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConvertError::Layout {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::Schema { path, message } => {
                write!(f, "unsupported file layout in {}: {}", path.display(), message)
            }
            ConvertError::Resource { path, source } => {
                write!(f, "cannot access {}: {}", path.display(), source)
            }
            ConvertError::Template(msg) => write!(f, "template error: {}", msg),
            ConvertError::Naming(msg) => write!(f, "naming error: {}", msg),
            ConvertError::Layout { path, message } => {
                write!(f, "unsupported directory {}: {}", path.display(), message)
            }
            ConvertError::Buffer(e) => write!(f, "edit error: {}", e),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Resource { source, .. } => Some(source),
            ConvertError::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BufferError> for ConvertError {
    fn from(e: BufferError) -> Self {
        ConvertError::Buffer(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_message_names_file() {
        let err = ConvertError::schema("proj.vcxproj", "line 12 has no ';'");
        let msg = err.to_string();
        assert!(msg.contains("proj.vcxproj"));
        assert!(msg.contains("line 12"));
    }

    #[test]
    fn test_buffer_error_converts() {
        let err: ConvertError = BufferError::OutOfBounds { offset: 9, len: 3 }.into();
        assert!(matches!(err, ConvertError::Buffer(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
