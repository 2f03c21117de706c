//! Token validation with lazy expiry.

use crate::{errors::*, types::*};
use tracing::{debug, info};
use turnstile_identity::IdentityStore;
use turnstile_storage::{Storage, CF_CREDENTIALS, CF_CREDENTIALS_BY_TOKEN_HASH};
use uuid::Uuid;

use super::{sha256, CredentialService};

impl<S: Storage + 'static, I: IdentityStore + 'static> CredentialService<S, I> {
    /// Resolve a token against the store
    ///
    /// An active credential found past its expiry is deactivated here, so
    /// the next validation of the same token reports `Inactive`.
    pub(crate) async fn validate_internal(&self, token: &str) -> Result<CredentialValidation> {
        let token_hash = sha256(token.as_bytes());

        let credential_id: Option<Uuid> = self
            .storage
            .get(CF_CREDENTIALS_BY_TOKEN_HASH, &token_hash)
            .await?;

        let credential = match credential_id {
            Some(credential_id) => self.get_credential(credential_id).await?,
            None => None,
        };

        let credential = match credential {
            Some(credential) => credential,
            None => return Ok(CredentialValidation::Invalid(InvalidReason::NotFound)),
        };

        if !credential.active {
            return Ok(CredentialValidation::Invalid(InvalidReason::Inactive));
        }

        let now = current_timestamp();
        if !credential.is_expired_at(now) {
            return Ok(CredentialValidation::Valid(credential.identity_id));
        }

        self.expire_lazily(credential, now).await
    }

    async fn expire_lazily(
        &self,
        observed: Credential,
        now: u64,
    ) -> Result<CredentialValidation> {
        let _row = self.row_locks.lock(observed.identity_id).await;

        // Re-read under the lock; another caller may have won the transition
        let current = match self.get_credential(observed.credential_id).await? {
            Some(current) => current,
            None => return Ok(CredentialValidation::Invalid(InvalidReason::NotFound)),
        };

        if !current.active {
            debug!(
                credential_id = %current.credential_id,
                "Credential already deactivated"
            );
            return Ok(CredentialValidation::Invalid(InvalidReason::Inactive));
        }

        let mut expired = current;
        expired.active = false;
        expired.deactivated_at = Some(now);
        self.storage
            .put(CF_CREDENTIALS, &expired.credential_id, &expired)
            .await?;

        info!(
            identity_id = expired.identity_id,
            credential_id = %expired.credential_id,
            expired_at = ?expired.expires_at,
            "Expired credential deactivated"
        );

        Ok(CredentialValidation::Invalid(InvalidReason::Expired))
    }
}
