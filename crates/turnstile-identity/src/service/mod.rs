//! Identity service implementation.

mod enrollment;
mod records;
mod templates;


use crate::{errors::*, traits::*, types::*};
use async_trait::async_trait;
use std::sync::Arc;
use turnstile_storage::{RowLocks, Storage};

/// Identity registry backed by a [`Storage`] implementation
pub struct IdentityService<S: Storage> {
    pub(super) storage: Arc<S>,
    pub(super) row_locks: Arc<RowLocks<IdentityId>>,
    pub(super) allocation_lock: tokio::sync::Mutex<()>,
}

impl<S: Storage> IdentityService<S> {
    /// Create a new identity service with its own row lock registry
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_row_locks(storage, Arc::new(RowLocks::new()))
    }

    /// Create a new identity service sharing an existing row lock registry
    ///
    /// The credential service must use the same registry so cascade deletes
    /// and credential transitions for one identity are serialized.
    pub fn with_row_locks(storage: Arc<S>, row_locks: Arc<RowLocks<IdentityId>>) -> Self {
        Self {
            storage,
            row_locks,
            allocation_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Per-identity lock registry
    pub fn row_locks(&self) -> Arc<RowLocks<IdentityId>> {
        Arc::clone(&self.row_locks)
    }
}

#[async_trait]
impl<S: Storage + 'static> IdentityStore for IdentityService<S> {
    async fn enroll(&self, request: NewIdentity) -> Result<Identity> {
        self.enroll_internal(request).await
    }

    async fn get_identity(&self, identity_id: IdentityId) -> Result<Identity> {
        self.get_identity_internal(identity_id).await
    }

    async fn identity_exists(&self, identity_id: IdentityId) -> Result<bool> {
        Ok(self
            .storage
            .exists(turnstile_storage::CF_IDENTITIES, &identity_id)
            .await?)
    }

    async fn list_identities(&self) -> Result<Vec<Identity>> {
        self.list_identities_internal().await
    }

    async fn count_identities(&self) -> Result<usize> {
        Ok(self.list_identities_internal().await?.len())
    }

    async fn delete_identity(&self, identity_id: IdentityId) -> Result<DeletionSummary> {
        self.delete_identity_internal(identity_id).await
    }
}

#[async_trait]
impl<S: Storage + 'static> BiometricStore for IdentityService<S> {
    async fn get_template(&self, identity_id: IdentityId) -> Result<Option<BiometricTemplate>> {
        self.get_template_internal(identity_id).await
    }

    async fn store_template(
        &self,
        identity_id: IdentityId,
        features: FeatureVector,
    ) -> Result<BiometricTemplate> {
        self.store_template_internal(identity_id, features).await
    }

    async fn list_templates(&self) -> Result<Vec<BiometricTemplate>> {
        self.list_templates_internal().await
    }
}
