//! Background maintenance: expiry sweep and inactive purge.

use crate::{errors::*, types::*};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{debug, info, warn};
use turnstile_identity::{IdentityId, IdentityStore};
use turnstile_storage::{Storage, CF_CREDENTIALS};
use uuid::Uuid;

use super::{expiry_from, unstage_credential, CredentialService};

impl<S: Storage + 'static, I: IdentityStore + 'static> CredentialService<S, I> {
    /// Rotate every identity that holds an active, expired credential
    pub(crate) async fn sweep_expired_internal(
        &self,
        valid_for: Option<Duration>,
    ) -> Result<Vec<RotationResult>> {
        let now = current_timestamp();
        let expires_at = expiry_from(now, valid_for)?;

        let rows: Vec<(Vec<u8>, Credential)> = self.storage.scan_all(CF_CREDENTIALS).await?;
        let candidates: BTreeSet<IdentityId> = rows
            .into_iter()
            .map(|(_, credential)| credential)
            .filter(|credential| credential.active && credential.is_expired_at(now))
            .map(|credential| credential.identity_id)
            .collect();

        let mut results = Vec::with_capacity(candidates.len());
        let mut failed = 0usize;

        for identity_id in candidates {
            match self.sweep_identity(identity_id, now, expires_at).await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(e) => {
                    warn!(identity_id, error = %e, "Expired credential rotation failed");
                    failed += 1;
                }
            }
        }

        info!(
            rotated = results.len(),
            failed,
            "Expired credential sweep complete"
        );
        Ok(results)
    }

    /// Re-check one identity under its lock and rotate it if still expired
    async fn sweep_identity(
        &self,
        identity_id: IdentityId,
        now: u64,
        expires_at: Option<u64>,
    ) -> Result<Option<RotationResult>> {
        let _row = self.row_locks.lock(identity_id).await;

        let existing = self.load_credentials(identity_id).await?;
        if !existing
            .iter()
            .any(|credential| credential.active && credential.is_expired_at(now))
        {
            debug!(identity_id, "Expired credential already handled");
            return Ok(None);
        }

        if !self.identities.identity_exists(identity_id).await? {
            warn!(identity_id, "Expired credential without identity, skipping");
            return Ok(None);
        }

        self.rotate_locked(identity_id, existing, now, expires_at)
            .await
            .map(Some)
    }

    /// Delete every inactive credential with its index rows
    pub(crate) async fn purge_inactive_internal(&self) -> Result<usize> {
        let rows: Vec<(Vec<u8>, Credential)> = self.storage.scan_all(CF_CREDENTIALS).await?;

        let mut by_identity: BTreeMap<IdentityId, Vec<Uuid>> = BTreeMap::new();
        for (_, credential) in rows {
            if !credential.active {
                by_identity
                    .entry(credential.identity_id)
                    .or_default()
                    .push(credential.credential_id);
            }
        }

        let mut purged = 0;

        for (identity_id, credential_ids) in by_identity {
            let _row = self.row_locks.lock(identity_id).await;

            let mut batch = self.storage.batch();
            let mut staged = 0;
            for credential_id in credential_ids {
                match self.get_credential(credential_id).await? {
                    Some(credential) if !credential.active => {
                        unstage_credential(batch.as_mut(), &credential)?;
                        staged += 1;
                    }
                    _ => {}
                }
            }

            if staged == 0 {
                batch.rollback();
                continue;
            }

            batch.commit().await?;
            debug!(identity_id, count = staged, "Inactive credentials purged");
            purged += staged;
        }

        info!(count = purged, "Inactive credential purge complete");
        Ok(purged)
    }
}
