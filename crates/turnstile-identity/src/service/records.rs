//! Identity lookup, listing and cascade deletion.

use crate::{errors::*, types::*};
use tracing::info;
use turnstile_storage::{
    traits::BatchExt, Storage, CF_BIOMETRIC_TEMPLATES, CF_CREDENTIALS, CF_CREDENTIALS_BY_IDENTITY,
    CF_CREDENTIALS_BY_TOKEN_HASH, CF_IDENTITIES, CF_IDENTITIES_BY_CONTACT,
};
use uuid::Uuid;

use super::IdentityService;

impl<S: Storage + 'static> IdentityService<S> {
    /// Get an identity by ID
    pub(crate) async fn get_identity_internal(&self, identity_id: IdentityId) -> Result<Identity> {
        self.storage
            .get(CF_IDENTITIES, &identity_id)
            .await?
            .ok_or(IdentityError::NotFound(identity_id))
    }

    pub(crate) async fn list_identities_internal(&self) -> Result<Vec<Identity>> {
        let rows: Vec<(Vec<u8>, Identity)> = self.storage.scan_all(CF_IDENTITIES).await?;

        let mut identities: Vec<Identity> = rows.into_iter().map(|(_, identity)| identity).collect();
        identities.sort_by_key(|identity| identity.identity_id);

        Ok(identities)
    }

    /// Delete an identity together with its template and credential rows
    ///
    /// Holds the identity's row lock so no credential transition can
    /// interleave with the cascade.
    pub(crate) async fn delete_identity_internal(
        &self,
        identity_id: IdentityId,
    ) -> Result<DeletionSummary> {
        let _row = self.row_locks.lock(identity_id).await;

        let identity = self.get_identity_internal(identity_id).await?;

        let credentials: Vec<(Vec<u8>, (Uuid, [u8; 32]))> = self
            .storage
            .get_by_prefix(CF_CREDENTIALS_BY_IDENTITY, &identity_id)
            .await?;
        let template_removed = self
            .storage
            .exists(CF_BIOMETRIC_TEMPLATES, &identity_id)
            .await?;

        let mut batch = self.storage.batch();
        batch.delete(CF_IDENTITIES, &identity_id)?;
        batch.delete(CF_IDENTITIES_BY_CONTACT, &identity.contact)?;
        batch.delete(CF_BIOMETRIC_TEMPLATES, &identity_id)?;

        for (index_key, (credential_id, token_hash)) in &credentials {
            batch.delete_raw(CF_CREDENTIALS_BY_IDENTITY, index_key.clone())?;
            batch.delete(CF_CREDENTIALS, credential_id)?;
            batch.delete(CF_CREDENTIALS_BY_TOKEN_HASH, token_hash)?;
        }

        batch.commit().await?;

        info!(
            identity_id,
            credentials_removed = credentials.len(),
            template_removed,
            "Identity deleted"
        );

        Ok(DeletionSummary {
            identity_id,
            template_removed,
            credentials_removed: credentials.len(),
        })
    }
}
