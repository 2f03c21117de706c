//! Identity trait definitions.

use crate::{errors::Result, types::*};
use async_trait::async_trait;

/// Registry of enrolled identities
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Allocate an id and persist identity plus template as one unit
    async fn enroll(&self, request: NewIdentity) -> Result<Identity>;

    /// Get identity by ID
    async fn get_identity(&self, identity_id: IdentityId) -> Result<Identity>;

    /// Check whether an identity exists
    async fn identity_exists(&self, identity_id: IdentityId) -> Result<bool>;

    /// List all identities in ascending id order
    async fn list_identities(&self) -> Result<Vec<Identity>>;

    /// Number of enrolled identities
    async fn count_identities(&self) -> Result<usize>;

    /// Delete identity, template and every credential row atomically
    async fn delete_identity(&self, identity_id: IdentityId) -> Result<DeletionSummary>;
}

/// Storage of biometric templates
#[async_trait]
pub trait BiometricStore: Send + Sync {
    /// Get the template for an identity, if enrollment completed
    async fn get_template(&self, identity_id: IdentityId) -> Result<Option<BiometricTemplate>>;

    /// Store or replace the template of an existing identity
    async fn store_template(
        &self,
        identity_id: IdentityId,
        features: FeatureVector,
    ) -> Result<BiometricTemplate>;

    /// All templates in enrollment order
    async fn list_templates(&self) -> Result<Vec<BiometricTemplate>>;
}
