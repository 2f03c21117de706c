use crate::{Credential, CredentialValidation, Result, RotationResult};
use async_trait::async_trait;
use std::time::Duration;
use turnstile_identity::IdentityId;

/// Credential lifecycle operations
///
/// `valid_for = None` issues a credential that never expires.
#[async_trait]
pub trait CredentialLifecycle: Send + Sync {
    /// Issue a new active credential; refuses if one is already active
    async fn issue(&self, identity_id: IdentityId, valid_for: Option<Duration>)
        -> Result<Credential>;

    /// Atomically deactivate every active credential and issue a new one
    async fn rotate(
        &self,
        identity_id: IdentityId,
        valid_for: Option<Duration>,
    ) -> Result<RotationResult>;

    /// Deactivate all active credentials, returning how many changed
    async fn revoke(&self, identity_id: IdentityId) -> Result<usize>;

    /// Resolve a presented token
    async fn validate(&self, token: &str) -> Result<CredentialValidation>;

    /// Rotate every identity holding an active expired credential
    async fn sweep_expired(&self, valid_for: Option<Duration>) -> Result<Vec<RotationResult>>;

    /// Delete every inactive credential
    async fn purge_inactive(&self) -> Result<usize>;

    /// The identity's current active credential
    async fn active_credential(&self, identity_id: IdentityId) -> Result<Credential>;

    /// Every stored credential of the identity, oldest first
    async fn list_credentials(&self, identity_id: IdentityId) -> Result<Vec<Credential>>;
}
