//! Identity error types and the shared error taxonomy.

use crate::types::IdentityId;
use thiserror::Error;

/// Coarse classification every turnstile error maps onto
///
/// Callers (the transport layer, the scheduler) branch on the kind rather
/// than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Entity absent
    NotFound,
    /// Duplicate unique key; surfaced as a conflict, never retried
    AlreadyExists,
    /// Malformed request or an inactive/expired credential
    Invalid,
    /// The biometric capability failed on the presented input
    ProcessingFault,
    /// Stored data violates an invariant (e.g. identity without template)
    IntegrityFault,
    /// Backing store unavailable or timed out
    Unavailable,
}

impl ErrorKind {
    /// Whether the caller may retry the same request
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::ProcessingFault | ErrorKind::Unavailable)
    }
}

/// Identity errors
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Identity not found
    #[error("Identity not found: {0}")]
    NotFound(IdentityId),

    /// Contact already registered to another identity
    #[error("Contact already registered: {0}")]
    ContactAlreadyRegistered(String),

    /// Request failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Every id up to `u32::MAX` is taken
    #[error("Identity id space exhausted")]
    IdSpaceExhausted,

    /// Allocation kept colliding with concurrently inserted ids
    #[error("Identity allocation conflict after {attempts} attempts")]
    AllocationConflict { attempts: u32 },

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] turnstile_storage::StorageError),
}

impl IdentityError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::NotFound(_) => ErrorKind::NotFound,
            IdentityError::ContactAlreadyRegistered(_) => ErrorKind::AlreadyExists,
            IdentityError::InvalidRequest(_) => ErrorKind::Invalid,
            IdentityError::IdSpaceExhausted => ErrorKind::IntegrityFault,
            IdentityError::AllocationConflict { .. } | IdentityError::Storage(_) => {
                ErrorKind::Unavailable
            }
        }
    }
}

/// Result type for identity operations
pub type Result<T> = std::result::Result<T, IdentityError>;
