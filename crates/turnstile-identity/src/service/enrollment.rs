//! Enrollment: id allocation plus identity and template persistence.

use crate::{allocator::next_identity_id, errors::*, types::*};
use tracing::{info, warn};
use turnstile_storage::{
    traits::BatchExt, Storage, CF_BIOMETRIC_TEMPLATES, CF_IDENTITIES, CF_IDENTITIES_BY_CONTACT,
};

use super::IdentityService;

/// Upper bound on unique-constraint retries for one enrollment
pub(crate) const MAX_ALLOCATION_ATTEMPTS: u32 = 5;

impl<S: Storage + 'static> IdentityService<S> {
    /// Enroll a new identity with its biometric template
    ///
    /// Allocation and insert run under the allocation lock; a candidate id
    /// found already present is skipped and allocation retried.
    pub(crate) async fn enroll_internal(&self, request: NewIdentity) -> Result<Identity> {
        request.validate()?;

        let display_name = request.display_name.trim().to_string();
        let contact = request.contact.trim().to_string();

        let _allocation = self.allocation_lock.lock().await;

        if self
            .storage
            .exists(CF_IDENTITIES_BY_CONTACT, &contact)
            .await?
        {
            return Err(IdentityError::ContactAlreadyRegistered(contact));
        }

        let mut skipped: Vec<IdentityId> = Vec::new();

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let mut in_use = self.identity_ids().await?;
            in_use.extend(skipped.iter().copied());

            let identity_id = next_identity_id(in_use).ok_or(IdentityError::IdSpaceExhausted)?;

            let _row = self.row_locks.lock(identity_id).await;
            if self.storage.exists(CF_IDENTITIES, &identity_id).await? {
                warn!(identity_id, attempt, "Allocated identity id already taken, retrying");
                skipped.push(identity_id);
                continue;
            }

            let now = current_timestamp();
            let identity = Identity {
                identity_id,
                display_name: display_name.clone(),
                contact: contact.clone(),
                created_at: now,
            };
            let template = BiometricTemplate {
                identity_id,
                features: request.features.clone(),
                enrolled_at: now,
                updated_at: now,
            };

            self.persist_enrollment(&identity, &template).await?;

            info!(identity_id, "Identity enrolled");
            return Ok(identity);
        }

        Err(IdentityError::AllocationConflict {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }

    /// Ids of every stored identity
    pub(crate) async fn identity_ids(&self) -> Result<Vec<IdentityId>> {
        let rows: Vec<(Vec<u8>, Identity)> = self.storage.scan_all(CF_IDENTITIES).await?;
        Ok(rows.into_iter().map(|(_, identity)| identity.identity_id).collect())
    }

    async fn persist_enrollment(
        &self,
        identity: &Identity,
        template: &BiometricTemplate,
    ) -> Result<()> {
        let mut batch = self.storage.batch();

        batch.put(CF_IDENTITIES, &identity.identity_id, identity)?;
        batch.put(
            CF_IDENTITIES_BY_CONTACT,
            &identity.contact,
            &identity.identity_id,
        )?;
        batch.put(CF_BIOMETRIC_TEMPLATES, &identity.identity_id, template)?;

        batch.commit().await?;
        Ok(())
    }
}
