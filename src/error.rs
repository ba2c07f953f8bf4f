use std::fmt;

/// Result type for Theia operations
pub type Result<T> = std::result::Result<T, TheiaError>;

/// Main error type for the Theia library
///
/// Builders report missing or unusable hyperparameters through this type.
/// Shape mismatches inside a forward pass are not validated here; they
/// surface as ndarray panics at the point the tensors disagree.
#[derive(Debug, Clone)]
pub enum TheiaError {
    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },
}

impl fmt::Display for TheiaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TheiaError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
        }
    }
}

impl std::error::Error for TheiaError {}
