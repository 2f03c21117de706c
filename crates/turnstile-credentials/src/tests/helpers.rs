//! Test helpers for credential service tests.

use crate::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use turnstile_identity::{FeatureVector, IdentityId, IdentityService, IdentityStore, NewIdentity};
use turnstile_storage::{
    RocksDbStorage, Storage, CF_CREDENTIALS, CF_CREDENTIALS_BY_IDENTITY,
    CF_CREDENTIALS_BY_TOKEN_HASH,
};
use uuid::Uuid;

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

pub type TestIdentityService = IdentityService<RocksDbStorage>;
pub type TestCredentialService = CredentialService<RocksDbStorage, TestIdentityService>;

pub struct TestContext {
    pub storage: Arc<RocksDbStorage>,
    pub identities: Arc<TestIdentityService>,
    pub credentials: Arc<TestCredentialService>,
    _temp_dir: TempDir,
}

/// Storage, identity and credential services sharing one row lock registry
pub fn create_test_context() -> TestContext {
    let (storage, temp_dir) = RocksDbStorage::open_temporary().unwrap();
    let storage = Arc::new(storage);
    let identities = Arc::new(IdentityService::new(Arc::clone(&storage)));
    let credentials = Arc::new(CredentialService::new(
        Arc::clone(&storage),
        Arc::clone(&identities),
        identities.row_locks(),
    ));

    TestContext {
        storage,
        identities,
        credentials,
        _temp_dir: temp_dir,
    }
}

pub async fn enroll(ctx: &TestContext, contact: &str) -> IdentityId {
    ctx.identities
        .enroll(NewIdentity {
            display_name: format!("Badge holder {}", contact),
            contact: contact.to_string(),
            features: FeatureVector::new(vec![0.5; 4]),
        })
        .await
        .unwrap()
        .identity_id
}

/// Write an active credential that expired `seconds_ago`, bypassing the service
pub async fn insert_expired_credential(
    ctx: &TestContext,
    identity_id: IdentityId,
    seconds_ago: u64,
) -> Credential {
    let now = current_timestamp();
    let credential = Credential {
        credential_id: Uuid::new_v4(),
        identity_id,
        token: generate_token(),
        issued_at: now - seconds_ago - 60,
        expires_at: Some(now - seconds_ago),
        active: true,
        deactivated_at: None,
    };
    insert_credential(ctx, &credential).await;
    credential
}

pub async fn insert_credential(ctx: &TestContext, credential: &Credential) {
    let token_hash = sha256(credential.token.as_bytes());

    ctx.storage
        .put(CF_CREDENTIALS, &credential.credential_id, credential)
        .await
        .unwrap();
    ctx.storage
        .put(
            CF_CREDENTIALS_BY_TOKEN_HASH,
            &token_hash,
            &credential.credential_id,
        )
        .await
        .unwrap();
    ctx.storage
        .put(
            CF_CREDENTIALS_BY_IDENTITY,
            &(credential.identity_id, credential.credential_id),
            &(credential.credential_id, token_hash),
        )
        .await
        .unwrap();
}

pub async fn active_count(ctx: &TestContext, identity_id: IdentityId) -> usize {
    ctx.credentials
        .list_credentials(identity_id)
        .await
        .unwrap()
        .iter()
        .filter(|credential| credential.active)
        .count()
}
