use thiserror::Error;
use turnstile_identity::{ErrorKind, IdentityError, IdentityId};

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Identity not found: {0}")]
    IdentityNotFound(IdentityId),

    #[error("Identity {0} already holds an active credential")]
    ActiveCredentialExists(IdentityId),

    #[error("No active credential for identity {0}")]
    NoActiveCredential(IdentityId),

    #[error("Invalid validity period: {0}")]
    InvalidValidity(String),

    #[error("Identity error: {0}")]
    IdentityError(#[from] IdentityError),

    #[error("Storage error: {0}")]
    StorageError(#[from] turnstile_storage::StorageError),
}

impl CredentialError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CredentialError::IdentityNotFound(_) | CredentialError::NoActiveCredential(_) => {
                ErrorKind::NotFound
            }
            CredentialError::ActiveCredentialExists(_) => ErrorKind::AlreadyExists,
            CredentialError::InvalidValidity(_) => ErrorKind::Invalid,
            CredentialError::IdentityError(err) => err.kind(),
            CredentialError::StorageError(_) => ErrorKind::Unavailable,
        }
    }
}

pub type Result<T> = std::result::Result<T, CredentialError>;
