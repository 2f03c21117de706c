use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use turnstile_audit::AuditService;
use turnstile_credentials::CredentialService;
use turnstile_identity::{FeatureVector, IdentityService};
use turnstile_storage::RocksDbStorage;
use turnstile_verification::{
    BiometricError, EuclideanMatcher, FeatureExtractor, ImageSample, VerificationConfig,
    VerificationEngine,
};

use crate::config::Config;

pub type Identities = IdentityService<RocksDbStorage>;
pub type Credentials = CredentialService<RocksDbStorage, Identities>;
pub type Audit = AuditService<RocksDbStorage>;
pub type Engine = VerificationEngine<Credentials, Identities, Audit>;

/// Extractor used until a biometric backend is plugged in
///
/// Every extraction is a processing fault, so face checks are refused and
/// never audited as decisions.
pub struct UnconfiguredExtractor;

#[async_trait]
impl FeatureExtractor for UnconfiguredExtractor {
    async fn extract_features(
        &self,
        _image: &ImageSample,
    ) -> std::result::Result<Option<FeatureVector>, BiometricError> {
        Err(BiometricError::Extraction(
            "no biometric backend configured".to_string(),
        ))
    }
}

/// Services shared by the process
pub struct AppState {
    pub config: Config,
    pub identities: Arc<Identities>,
    pub credentials: Arc<Credentials>,
    pub audit: Arc<Audit>,
    /// Gate-facing verifier; driven by the device integration
    #[allow(dead_code)]
    pub engine: Arc<Engine>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_extractor(config, Arc::new(UnconfiguredExtractor)).await
    }

    pub async fn with_extractor(
        config: Config,
        extractor: Arc<dyn FeatureExtractor>,
    ) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let storage = Arc::new(RocksDbStorage::open(&config.database_path)?);

        let identities = Arc::new(IdentityService::new(Arc::clone(&storage)));
        let credentials = Arc::new(CredentialService::new(
            Arc::clone(&storage),
            Arc::clone(&identities),
            identities.row_locks(),
        ));
        let audit = Arc::new(AuditService::open(Arc::clone(&storage)).await?);

        let engine = Arc::new(VerificationEngine::new(
            Arc::clone(&credentials),
            Arc::clone(&identities),
            Arc::clone(&audit),
            extractor,
            Arc::new(EuclideanMatcher::new(config.match_tolerance)),
            VerificationConfig {
                extraction_timeout: config.biometric_timeout,
                credential_validity: Some(config.credential_validity),
            },
        ));

        Ok(AppState {
            config,
            identities,
            credentials,
            audit,
            engine,
        })
    }
}
