use std::time::Duration;
use turnstile_audit::DecisionReason;
use turnstile_credentials::{Credential, InvalidReason, DEFAULT_CREDENTIAL_VALIDITY};
use turnstile_identity::{Identity, IdentityId};

/// Default bound on one feature extraction
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Engine settings
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// An extraction still running after this is abandoned as a processing fault
    pub extraction_timeout: Duration,

    /// Lifetime of the credential issued at enrollment; `None` never expires
    pub credential_validity: Option<Duration>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
            credential_validity: Some(DEFAULT_CREDENTIAL_VALIDITY),
        }
    }
}

/// Enrollment request as captured at the registration desk
#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub display_name: String,
    pub contact: String,
    /// Base64 image, bare or as a `data:` URL
    pub image_payload: String,
}

/// A newly enrolled identity with its first credential
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub identity: Identity,
    pub credential: Credential,
}

/// Stage 1 outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCheck {
    Resolved(IdentityId),
    Rejected(DecisionReason),
}

/// Stage 2 outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricCheck {
    Granted,
    Denied,
    /// Identity has no stored template; audited as a denial
    NoTemplate,
    /// Sample contained no face; not audited
    NoFaceDetected,
}

/// Outcome of the one-shot 1:N mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identification {
    Identified(IdentityId),
    NotIdentified,
    NoFaceDetected,
}

/// Final answer of the two-stage flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(IdentityId),
    Denied,
    /// Nothing was decided; the person should present their face again
    NoFaceDetected,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted(_))
    }
}

pub(crate) fn rejection_reason(reason: InvalidReason) -> DecisionReason {
    match reason {
        InvalidReason::NotFound => DecisionReason::NotFound,
        InvalidReason::Inactive => DecisionReason::Inactive,
        InvalidReason::Expired => DecisionReason::Expired,
    }
}
