use serde::{Deserialize, Serialize};
use std::time::Duration;
use turnstile_identity::IdentityId;
use uuid::Uuid;

pub use turnstile_identity::current_timestamp;

/// Default credential lifetime: four weeks
pub const DEFAULT_CREDENTIAL_VALIDITY: Duration = Duration::from_secs(4 * 7 * 24 * 60 * 60);

/// QR credential record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub credential_id: Uuid,
    pub identity_id: IdentityId,
    /// Opaque lookup key encoded into the QR image
    pub token: String,
    pub issued_at: u64,
    /// `None` never expires
    pub expires_at: Option<u64>,
    pub active: bool,
    pub deactivated_at: Option<u64>,
}

impl Credential {
    /// Whether the credential is past its expiry at `now`
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }
}

/// Why a presented token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidReason {
    /// No credential carries this token
    NotFound,
    /// The credential was revoked, rotated out or already expired
    Inactive,
    /// The credential expired and was deactivated by this validation
    Expired,
}

/// Outcome of validating a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialValidation {
    Valid(IdentityId),
    Invalid(InvalidReason),
}

impl CredentialValidation {
    pub fn identity_id(&self) -> Option<IdentityId> {
        match self {
            CredentialValidation::Valid(identity_id) => Some(*identity_id),
            CredentialValidation::Invalid(_) => None,
        }
    }
}

/// Result of rotating one identity's credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationResult {
    pub identity_id: IdentityId,
    /// Credentials deactivated by the rotation
    pub retired: Vec<Uuid>,
    /// The new active credential
    pub credential: Credential,
}

/// Index entry value in `CF_CREDENTIALS_BY_IDENTITY`
pub(crate) type IdentityIndexEntry = (Uuid, [u8; 32]);
