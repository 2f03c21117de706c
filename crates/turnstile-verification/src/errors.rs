//! Verification errors.
//!
//! Every fault below the engine is mapped onto an [`ErrorKind`] here. None of
//! them is itself an access decision; callers treat any error as "no entry".

use crate::biometric::BiometricError;
use std::time::Duration;
use thiserror::Error;
use turnstile_audit::AuditError;
use turnstile_credentials::CredentialError;
use turnstile_identity::{ErrorKind, IdentityError, IdentityId};

/// Message shown to the person at the gate for every refusal
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied";

/// Message shown when the captured image holds no face
pub const NO_FACE_MESSAGE: &str = "No face detected";

/// Message shown when the attempt may simply be repeated
pub const RETRY_MESSAGE: &str = "Verification unavailable, please try again";

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Identity not found: {0}")]
    IdentityNotFound(IdentityId),

    #[error("No face detected in enrollment image")]
    NoFaceDetected,

    #[error("Biometric processing failed: {0}")]
    ProcessingFault(#[from] BiometricError),

    #[error("Feature extraction timed out after {0:?}")]
    ExtractionTimeout(Duration),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Audit log unavailable: {0}")]
    AuditUnavailable(#[from] AuditError),
}

impl VerificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerificationError::InvalidRequest(_) | VerificationError::NoFaceDetected => {
                ErrorKind::Invalid
            }
            VerificationError::IdentityNotFound(_) => ErrorKind::NotFound,
            VerificationError::ProcessingFault(_) | VerificationError::ExtractionTimeout(_) => {
                ErrorKind::ProcessingFault
            }
            VerificationError::Credential(e) => e.kind(),
            VerificationError::Identity(e) => e.kind(),
            VerificationError::AuditUnavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Stable, non-leaky text for the person at the gate
    pub fn public_message(&self) -> &'static str {
        match self {
            VerificationError::NoFaceDetected => NO_FACE_MESSAGE,
            _ if self.is_retryable() => RETRY_MESSAGE,
            _ => ACCESS_DENIED_MESSAGE,
        }
    }
}

pub type Result<T> = std::result::Result<T, VerificationError>;
