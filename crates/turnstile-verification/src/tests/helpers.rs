//! Test helpers: storage-backed services and a scripted biometric capability.

use crate::*;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use turnstile_audit::{
    AccessAttempt, AttemptId, AuditError, AuditLog, AuditService, DailyStats, DecisionReason,
    Factor, Outcome, ReportFilter,
};
use turnstile_credentials::{
    Credential, CredentialError, CredentialLifecycle, CredentialService, CredentialValidation,
    RotationResult,
};
use turnstile_identity::{FeatureVector, IdentityId, IdentityService, IdentityStore, NewIdentity};
use turnstile_storage::{
    RocksDbStorage, Storage, StorageError, CF_BIOMETRIC_TEMPLATES, CF_IDENTITIES,
};

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

pub const FACE_A: [f64; 4] = [0.1, 0.2, 0.3, 0.4];
pub const FACE_A_FRESH: [f64; 4] = [0.12, 0.21, 0.29, 0.41];
pub const FACE_B: [f64; 4] = [0.9, 0.8, 0.7, 0.6];

pub type TestIdentities = IdentityService<RocksDbStorage>;
pub type TestCredentials = CredentialService<RocksDbStorage, TestIdentities>;
pub type TestAudit = AuditService<RocksDbStorage>;
pub type TestEngine<A = TestAudit> = VerificationEngine<TestCredentials, TestIdentities, A>;

/// Extractor driven by the image bytes
///
/// `face:<f64>,<f64>,...` yields that vector, `noface` yields nothing,
/// `corrupt` fails and `slow` never finishes within a test timeout.
pub struct ScriptedExtractor;

#[async_trait]
impl FeatureExtractor for ScriptedExtractor {
    async fn extract_features(
        &self,
        image: &ImageSample,
    ) -> std::result::Result<Option<FeatureVector>, BiometricError> {
        let text = String::from_utf8_lossy(image.as_bytes()).to_string();

        match text.as_str() {
            "noface" => Ok(None),
            "corrupt" => Err(BiometricError::Extraction("unreadable frame".to_string())),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(None)
            }
            _ => {
                let values = text
                    .strip_prefix("face:")
                    .ok_or_else(|| BiometricError::Extraction(format!("unknown image {}", text)))?
                    .split(',')
                    .map(|value| value.parse::<f64>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| BiometricError::Extraction(e.to_string()))?;
                Ok(Some(FeatureVector::new(values)))
            }
        }
    }
}

/// Audit log whose store is down
pub struct OfflineAudit;

#[async_trait]
impl AuditLog for OfflineAudit {
    async fn record_detailed(
        &self,
        _identity_id: Option<IdentityId>,
        _factor: Factor,
        _outcome: Outcome,
        _reason: Option<DecisionReason>,
    ) -> turnstile_audit::Result<AttemptId> {
        Err(AuditError::Storage(StorageError::Database(
            "audit store offline".to_string(),
        )))
    }

    async fn recent(&self, _limit: usize) -> turnstile_audit::Result<Vec<AccessAttempt>> {
        Ok(Vec::new())
    }

    async fn daily_stats(&self, _since: u64) -> turnstile_audit::Result<DailyStats> {
        Ok(DailyStats::default())
    }

    async fn report(&self, _filter: ReportFilter) -> turnstile_audit::Result<Vec<AccessAttempt>> {
        Ok(Vec::new())
    }
}

/// Credential lifecycle whose store is down
pub struct OfflineCredentials;

fn credential_store_offline() -> CredentialError {
    CredentialError::StorageError(StorageError::Database(
        "credential store offline".to_string(),
    ))
}

#[async_trait]
impl CredentialLifecycle for OfflineCredentials {
    async fn issue(
        &self,
        _identity_id: IdentityId,
        _valid_for: Option<Duration>,
    ) -> turnstile_credentials::Result<Credential> {
        Err(credential_store_offline())
    }

    async fn rotate(
        &self,
        _identity_id: IdentityId,
        _valid_for: Option<Duration>,
    ) -> turnstile_credentials::Result<RotationResult> {
        Err(credential_store_offline())
    }

    async fn revoke(&self, _identity_id: IdentityId) -> turnstile_credentials::Result<usize> {
        Err(credential_store_offline())
    }

    async fn validate(&self, _token: &str) -> turnstile_credentials::Result<CredentialValidation> {
        Err(credential_store_offline())
    }

    async fn sweep_expired(
        &self,
        _valid_for: Option<Duration>,
    ) -> turnstile_credentials::Result<Vec<RotationResult>> {
        Err(credential_store_offline())
    }

    async fn purge_inactive(&self) -> turnstile_credentials::Result<usize> {
        Err(credential_store_offline())
    }

    async fn active_credential(
        &self,
        _identity_id: IdentityId,
    ) -> turnstile_credentials::Result<Credential> {
        Err(credential_store_offline())
    }

    async fn list_credentials(
        &self,
        _identity_id: IdentityId,
    ) -> turnstile_credentials::Result<Vec<Credential>> {
        Err(credential_store_offline())
    }
}

/// Base64 payload of a scripted image, as a capture client would send it
pub fn payload(image: &str) -> String {
    STANDARD.encode(image.as_bytes())
}

pub fn face_payload(values: &[f64]) -> String {
    STANDARD.encode(face(values).as_bytes())
}

pub fn face(values: &[f64]) -> ImageSample {
    let joined: Vec<String> = values.iter().map(|value| value.to_string()).collect();
    ImageSample::new(format!("face:{}", joined.join(",")).into_bytes())
}

pub fn sample(text: &str) -> ImageSample {
    ImageSample::new(text.as_bytes().to_vec())
}

pub struct TestContext {
    pub storage: Arc<RocksDbStorage>,
    pub identities: Arc<TestIdentities>,
    pub credentials: Arc<TestCredentials>,
    pub audit: Arc<TestAudit>,
    pub engine: TestEngine,
    _temp_dir: TempDir,
}

pub fn test_config() -> VerificationConfig {
    VerificationConfig {
        extraction_timeout: Duration::from_millis(100),
        credential_validity: Some(DAY),
    }
}

pub fn build_engine<A: AuditLog>(
    credentials: &Arc<TestCredentials>,
    identities: &Arc<TestIdentities>,
    audit: Arc<A>,
) -> TestEngine<A> {
    engine_over(Arc::clone(credentials), identities, audit)
}

/// Engine over any credential lifecycle, sharing the context's identities
pub fn engine_over<C: CredentialLifecycle, A: AuditLog>(
    credentials: Arc<C>,
    identities: &Arc<TestIdentities>,
    audit: Arc<A>,
) -> VerificationEngine<C, TestIdentities, A> {
    VerificationEngine::new(
        credentials,
        Arc::clone(identities),
        audit,
        Arc::new(ScriptedExtractor),
        Arc::new(EuclideanMatcher::default()),
        test_config(),
    )
}

pub async fn create_test_context() -> TestContext {
    let (storage, temp_dir) = RocksDbStorage::open_temporary().unwrap();
    let storage = Arc::new(storage);

    let identities = Arc::new(IdentityService::new(Arc::clone(&storage)));
    let credentials = Arc::new(CredentialService::new(
        Arc::clone(&storage),
        Arc::clone(&identities),
        identities.row_locks(),
    ));
    let audit = Arc::new(AuditService::open(Arc::clone(&storage)).await.unwrap());
    let engine = build_engine(&credentials, &identities, Arc::clone(&audit));

    TestContext {
        storage,
        identities,
        credentials,
        audit,
        engine,
        _temp_dir: temp_dir,
    }
}

pub async fn enroll(ctx: &TestContext, contact: &str, features: &[f64]) -> IdentityId {
    ctx.identities
        .enroll(NewIdentity {
            display_name: contact.to_string(),
            contact: contact.to_string(),
            features: FeatureVector::new(features.to_vec()),
        })
        .await
        .unwrap()
        .identity_id
}

/// Remove the identity row only, leaving its credentials and template behind
pub async fn orphan_identity(ctx: &TestContext, identity_id: IdentityId) {
    ctx.storage
        .delete(CF_IDENTITIES, &identity_id)
        .await
        .unwrap();
}

/// Remove the stored template only
pub async fn drop_template(ctx: &TestContext, identity_id: IdentityId) {
    ctx.storage
        .delete(CF_BIOMETRIC_TEMPLATES, &identity_id)
        .await
        .unwrap();
}

/// Every audit record, oldest first
pub async fn audit_records(ctx: &TestContext) -> Vec<AccessAttempt> {
    let mut records = ctx.audit.recent(usize::MAX).await.unwrap();
    records.reverse();
    records
}
