//! Biometric template storage.

use crate::{errors::*, types::*};
use tracing::info;
use turnstile_storage::{Storage, CF_BIOMETRIC_TEMPLATES, CF_IDENTITIES};

use super::IdentityService;

impl<S: Storage + 'static> IdentityService<S> {
    pub(crate) async fn get_template_internal(
        &self,
        identity_id: IdentityId,
    ) -> Result<Option<BiometricTemplate>> {
        Ok(self.storage.get(CF_BIOMETRIC_TEMPLATES, &identity_id).await?)
    }

    /// Store or replace a template; the original enrollment time is kept
    pub(crate) async fn store_template_internal(
        &self,
        identity_id: IdentityId,
        features: FeatureVector,
    ) -> Result<BiometricTemplate> {
        if features.is_empty() {
            return Err(IdentityError::InvalidRequest(
                "feature vector is empty".to_string(),
            ));
        }

        let _row = self.row_locks.lock(identity_id).await;

        if !self.storage.exists(CF_IDENTITIES, &identity_id).await? {
            return Err(IdentityError::NotFound(identity_id));
        }

        let now = current_timestamp();
        let enrolled_at = self
            .get_template_internal(identity_id)
            .await?
            .map(|existing| existing.enrolled_at)
            .unwrap_or(now);

        let template = BiometricTemplate {
            identity_id,
            features,
            enrolled_at,
            updated_at: now,
        };

        self.storage
            .put(CF_BIOMETRIC_TEMPLATES, &identity_id, &template)
            .await?;

        info!(identity_id, "Biometric template stored");
        Ok(template)
    }

    /// Templates ordered by enrollment time, ties broken by id
    pub(crate) async fn list_templates_internal(&self) -> Result<Vec<BiometricTemplate>> {
        let rows: Vec<(Vec<u8>, BiometricTemplate)> =
            self.storage.scan_all(CF_BIOMETRIC_TEMPLATES).await?;

        let mut templates: Vec<BiometricTemplate> =
            rows.into_iter().map(|(_, template)| template).collect();
        templates.sort_by_key(|template| (template.enrolled_at, template.identity_id));

        Ok(templates)
    }
}
