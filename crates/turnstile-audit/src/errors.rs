use thiserror::Error;
use turnstile_identity::ErrorKind;

/// Audit log errors
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Invalid report filter: {0}")]
    InvalidFilter(String),

    #[error("Storage error: {0}")]
    Storage(#[from] turnstile_storage::StorageError),
}

impl AuditError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuditError::InvalidFilter(_) => ErrorKind::Invalid,
            AuditError::Storage(_) => ErrorKind::Unavailable,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
