//! Credential lifecycle operations: issue, rotate, revoke.

use crate::{errors::*, types::*};
use std::time::Duration;
use tracing::{debug, info};
use turnstile_identity::{IdentityId, IdentityStore};
use turnstile_storage::{Batch, BatchExt, Storage, CF_CREDENTIALS};
use uuid::Uuid;

use super::{
    expiry_from, generate_token, stage_credential, tokens::token_prefix, CredentialService,
};

impl<S: Storage + 'static, I: IdentityStore + 'static> CredentialService<S, I> {
    /// Issue a credential for an identity with no active credential
    pub(crate) async fn issue_internal(
        &self,
        identity_id: IdentityId,
        valid_for: Option<Duration>,
    ) -> Result<Credential> {
        let _row = self.row_locks.lock(identity_id).await;

        self.ensure_identity(identity_id).await?;

        let existing = self.load_credentials(identity_id).await?;
        if existing.iter().any(|credential| credential.active) {
            return Err(CredentialError::ActiveCredentialExists(identity_id));
        }

        let now = current_timestamp();
        let credential = new_credential(identity_id, now, expiry_from(now, valid_for)?);

        let mut batch = self.storage.batch();
        stage_credential(batch.as_mut(), &credential)?;
        batch.commit().await?;

        info!(
            identity_id,
            credential_id = %credential.credential_id,
            token = token_prefix(&credential.token),
            expires_at = ?credential.expires_at,
            "Credential issued"
        );

        Ok(credential)
    }

    pub(crate) async fn rotate_internal(
        &self,
        identity_id: IdentityId,
        valid_for: Option<Duration>,
    ) -> Result<RotationResult> {
        let _row = self.row_locks.lock(identity_id).await;

        self.ensure_identity(identity_id).await?;

        let now = current_timestamp();
        let expires_at = expiry_from(now, valid_for)?;
        let existing = self.load_credentials(identity_id).await?;

        self.rotate_locked(identity_id, existing, now, expires_at)
            .await
    }

    /// Deactivate every active credential and issue a replacement in one batch
    ///
    /// Caller must hold the identity's row lock.
    pub(super) async fn rotate_locked(
        &self,
        identity_id: IdentityId,
        existing: Vec<Credential>,
        now: u64,
        expires_at: Option<u64>,
    ) -> Result<RotationResult> {
        let mut batch = self.storage.batch();

        let mut retired = Vec::new();
        for credential in existing.into_iter().filter(|c| c.active) {
            retired.push(deactivate(batch.as_mut(), credential, now)?);
        }

        let credential = new_credential(identity_id, now, expires_at);
        stage_credential(batch.as_mut(), &credential)?;
        batch.commit().await?;

        info!(
            identity_id,
            retired = retired.len(),
            credential_id = %credential.credential_id,
            "Credential rotated"
        );

        Ok(RotationResult {
            identity_id,
            retired,
            credential,
        })
    }

    pub(crate) async fn revoke_internal(&self, identity_id: IdentityId) -> Result<usize> {
        let _row = self.row_locks.lock(identity_id).await;

        let active: Vec<Credential> = self
            .load_credentials(identity_id)
            .await?
            .into_iter()
            .filter(|credential| credential.active)
            .collect();

        if active.is_empty() {
            debug!(identity_id, "Nothing to revoke");
            return Ok(0);
        }

        let now = current_timestamp();
        let mut batch = self.storage.batch();
        let count = active.len();
        for credential in active {
            deactivate(batch.as_mut(), credential, now)?;
        }
        batch.commit().await?;

        info!(identity_id, count, "Credentials revoked");
        Ok(count)
    }
}

fn new_credential(identity_id: IdentityId, now: u64, expires_at: Option<u64>) -> Credential {
    Credential {
        credential_id: Uuid::new_v4(),
        identity_id,
        token: generate_token(),
        issued_at: now,
        expires_at,
        active: true,
        deactivated_at: None,
    }
}

/// Stage the inactive version of `credential`
pub(super) fn deactivate(batch: &mut dyn Batch, mut credential: Credential, now: u64) -> Result<Uuid> {
    credential.active = false;
    credential.deactivated_at = Some(now);

    batch.put(CF_CREDENTIALS, &credential.credential_id, &credential)?;

    Ok(credential.credential_id)
}
