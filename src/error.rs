use crate::RefactorError;
use std::fmt::{Display, Formatter};

impl RefactorError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RefactorError::InvalidArgument(message.into())
    }
    pub fn out_of_memory(message: impl Into<String>) -> Self {
        RefactorError::OutOfMemory(message.into())
    }
    pub fn internal_invariant(message: impl Into<String>) -> Self {
        RefactorError::InternalInvariant(message.into())
    }

    pub fn is_internal(&self) -> bool {
        match self {
            RefactorError::InternalInvariant(_) => true,
            _ => false,
        }
    }
}

impl Display for RefactorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RefactorError::InvalidArgument(message) => {
                write!(f, "InvalidArgument: {}", message)
            }
            RefactorError::OutOfMemory(message) => write!(f, "OutOfMemory: {}", message),
            RefactorError::InternalInvariant(message) => {
                write!(f, "InternalInvariant: {}", message)
            }
        }
    }
}

impl std::error::Error for RefactorError {}
