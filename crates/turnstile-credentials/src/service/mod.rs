//! Credential lifecycle service implementation.

mod lifecycle;
mod sweep;
mod tokens;
mod validation;

use crate::{errors::*, traits::*, types::*};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use turnstile_identity::{IdentityId, IdentityStore};
use turnstile_storage::{
    column_families::*, Batch, BatchExt, RowLocks, Storage,
};
use uuid::Uuid;

pub use tokens::{base64_url_encode, generate_random_bytes, generate_token, sha256};

/// Credential lifecycle service
///
/// Every transition of a credential's `active` flag runs under the owning
/// identity's row lock, shared with the identity service.
pub struct CredentialService<S: Storage, I: IdentityStore> {
    pub(super) storage: Arc<S>,
    pub(super) identities: Arc<I>,
    pub(super) row_locks: Arc<RowLocks<IdentityId>>,
}

impl<S: Storage, I: IdentityStore> CredentialService<S, I> {
    /// Create a new credential service
    ///
    /// `row_locks` must be the registry used by the identity service.
    pub fn new(storage: Arc<S>, identities: Arc<I>, row_locks: Arc<RowLocks<IdentityId>>) -> Self {
        Self {
            storage,
            identities,
            row_locks,
        }
    }

    pub(super) async fn get_credential(&self, credential_id: Uuid) -> Result<Option<Credential>> {
        Ok(self.storage.get(CF_CREDENTIALS, &credential_id).await?)
    }

    /// All credentials of an identity, oldest first
    pub(super) async fn load_credentials(&self, identity_id: IdentityId) -> Result<Vec<Credential>> {
        let entries: Vec<(Vec<u8>, IdentityIndexEntry)> = self
            .storage
            .get_by_prefix(CF_CREDENTIALS_BY_IDENTITY, &identity_id)
            .await?;

        let mut credentials = Vec::with_capacity(entries.len());
        for (_, (credential_id, _)) in entries {
            if let Some(credential) = self.get_credential(credential_id).await? {
                credentials.push(credential);
            }
        }
        credentials.sort_by_key(|credential| credential.issued_at);

        Ok(credentials)
    }

    pub(super) async fn ensure_identity(&self, identity_id: IdentityId) -> Result<()> {
        if self.identities.identity_exists(identity_id).await? {
            Ok(())
        } else {
            Err(CredentialError::IdentityNotFound(identity_id))
        }
    }
}

/// Expiry timestamp for a credential issued at `now`
pub(super) fn expiry_from(now: u64, valid_for: Option<Duration>) -> Result<Option<u64>> {
    match valid_for {
        None => Ok(None),
        Some(duration) => now
            .checked_add(duration.as_secs())
            .map(Some)
            .ok_or_else(|| {
                CredentialError::InvalidValidity(format!("{}s overflows", duration.as_secs()))
            }),
    }
}

/// Write a credential and both of its index rows
pub(super) fn stage_credential(batch: &mut dyn Batch, credential: &Credential) -> Result<()> {
    let token_hash = sha256(credential.token.as_bytes());

    batch.put(CF_CREDENTIALS, &credential.credential_id, credential)?;
    batch.put(CF_CREDENTIALS_BY_TOKEN_HASH, &token_hash, &credential.credential_id)?;
    batch.put(
        CF_CREDENTIALS_BY_IDENTITY,
        &(credential.identity_id, credential.credential_id),
        &(credential.credential_id, token_hash),
    )?;

    Ok(())
}

/// Delete a credential and both of its index rows
pub(super) fn unstage_credential(batch: &mut dyn Batch, credential: &Credential) -> Result<()> {
    let token_hash = sha256(credential.token.as_bytes());

    batch.delete(CF_CREDENTIALS, &credential.credential_id)?;
    batch.delete(CF_CREDENTIALS_BY_TOKEN_HASH, &token_hash)?;
    batch.delete(
        CF_CREDENTIALS_BY_IDENTITY,
        &(credential.identity_id, credential.credential_id),
    )?;

    Ok(())
}

#[async_trait]
impl<S, I> CredentialLifecycle for CredentialService<S, I>
where
    S: Storage + 'static,
    I: IdentityStore + 'static,
{
    async fn issue(
        &self,
        identity_id: IdentityId,
        valid_for: Option<Duration>,
    ) -> Result<Credential> {
        self.issue_internal(identity_id, valid_for).await
    }

    async fn rotate(
        &self,
        identity_id: IdentityId,
        valid_for: Option<Duration>,
    ) -> Result<RotationResult> {
        self.rotate_internal(identity_id, valid_for).await
    }

    async fn revoke(&self, identity_id: IdentityId) -> Result<usize> {
        self.revoke_internal(identity_id).await
    }

    async fn validate(&self, token: &str) -> Result<CredentialValidation> {
        self.validate_internal(token).await
    }

    async fn sweep_expired(&self, valid_for: Option<Duration>) -> Result<Vec<RotationResult>> {
        self.sweep_expired_internal(valid_for).await
    }

    async fn purge_inactive(&self) -> Result<usize> {
        self.purge_inactive_internal().await
    }

    async fn active_credential(&self, identity_id: IdentityId) -> Result<Credential> {
        self.load_credentials(identity_id)
            .await?
            .into_iter()
            .rev()
            .find(|credential| credential.active)
            .ok_or(CredentialError::NoActiveCredential(identity_id))
    }

    async fn list_credentials(&self, identity_id: IdentityId) -> Result<Vec<Credential>> {
        self.load_credentials(identity_id).await
    }
}
