//! Verification engine implementation.

mod biometric_stage;
mod credential_stage;
mod enrollment;
mod identify;

use crate::{
    biometric::{FaceMatcher, FeatureExtractor, ImageSample},
    errors::*,
    traits::AccessVerifier,
    types::*,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};
use turnstile_audit::{AttemptId, AuditLog, DecisionReason, Factor, Outcome};
use turnstile_credentials::CredentialLifecycle;
use turnstile_identity::{BiometricStore, FeatureVector, IdentityId, IdentityStore};

/// Two-factor verification engine
///
/// Generic over the credential lifecycle, the identity registry and the audit
/// log; the biometric capability is injected as trait objects.
pub struct VerificationEngine<C, I, A>
where
    C: CredentialLifecycle,
    I: IdentityStore + BiometricStore,
    A: AuditLog,
{
    pub(super) credentials: Arc<C>,
    pub(super) identities: Arc<I>,
    pub(super) audit: Arc<A>,
    pub(super) extractor: Arc<dyn FeatureExtractor>,
    pub(super) matcher: Arc<dyn FaceMatcher>,
    pub(super) config: VerificationConfig,
}

impl<C, I, A> VerificationEngine<C, I, A>
where
    C: CredentialLifecycle,
    I: IdentityStore + BiometricStore,
    A: AuditLog,
{
    pub fn new(
        credentials: Arc<C>,
        identities: Arc<I>,
        audit: Arc<A>,
        extractor: Arc<dyn FeatureExtractor>,
        matcher: Arc<dyn FaceMatcher>,
        config: VerificationConfig,
    ) -> Self {
        Self {
            credentials,
            identities,
            audit,
            extractor,
            matcher,
            config,
        }
    }

    /// Append one audit record
    ///
    /// A failed append is returned as an error; the caller must then refuse
    /// entry, whatever the decision was.
    pub(super) async fn append_audit(
        &self,
        identity_id: Option<IdentityId>,
        factor: Factor,
        outcome: Outcome,
        reason: Option<DecisionReason>,
    ) -> Result<AttemptId> {
        self.audit
            .record_detailed(identity_id, factor, outcome, reason)
            .await
            .map_err(|e| {
                error!(
                    identity_id = ?identity_id,
                    factor = ?factor,
                    outcome = ?outcome,
                    error = %e,
                    "Audit append failed, refusing entry"
                );
                VerificationError::AuditUnavailable(e)
            })
    }

    /// Run the extractor under the configured timeout
    pub(super) async fn extract(&self, sample: &ImageSample) -> Result<Option<FeatureVector>> {
        let timeout = self.config.extraction_timeout;

        match tokio::time::timeout(timeout, self.extractor.extract_features(sample)).await {
            Ok(Ok(features)) => Ok(features),
            Ok(Err(e)) => {
                warn!(error = %e, "Feature extraction failed");
                Err(VerificationError::ProcessingFault(e))
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Feature extraction timed out");
                Err(VerificationError::ExtractionTimeout(timeout))
            }
        }
    }
}

#[async_trait]
impl<C, I, A> AccessVerifier for VerificationEngine<C, I, A>
where
    C: CredentialLifecycle + 'static,
    I: IdentityStore + BiometricStore + 'static,
    A: AuditLog + 'static,
{
    async fn enroll(&self, request: NewEnrollment) -> Result<Enrollment> {
        self.enroll_internal(request).await
    }

    async fn check_credential(&self, token: &str) -> Result<CredentialCheck> {
        self.check_credential_internal(token).await
    }

    async fn check_biometric(
        &self,
        identity_id: IdentityId,
        sample: &ImageSample,
    ) -> Result<BiometricCheck> {
        self.check_biometric_internal(identity_id, sample).await
    }

    async fn verify_access(&self, token: &str, sample: &ImageSample) -> Result<AccessDecision> {
        let identity_id = match self.check_credential_internal(token).await? {
            CredentialCheck::Resolved(identity_id) => identity_id,
            CredentialCheck::Rejected(_) => return Ok(AccessDecision::Denied),
        };

        let decision = match self.check_biometric_internal(identity_id, sample).await? {
            BiometricCheck::Granted => AccessDecision::Granted(identity_id),
            BiometricCheck::Denied | BiometricCheck::NoTemplate => AccessDecision::Denied,
            BiometricCheck::NoFaceDetected => AccessDecision::NoFaceDetected,
        };

        Ok(decision)
    }

    async fn identify(&self, sample: &ImageSample) -> Result<Identification> {
        self.identify_internal(sample).await
    }

    async fn record_manual_decision(
        &self,
        identity_id: Option<IdentityId>,
        factor: Factor,
        outcome: Outcome,
    ) -> Result<AttemptId> {
        if let Some(identity_id) = identity_id {
            if !self.identities.identity_exists(identity_id).await? {
                return Err(VerificationError::IdentityNotFound(identity_id));
            }
        }

        let attempt_id = self
            .append_audit(identity_id, factor, outcome, Some(DecisionReason::Manual))
            .await?;

        info!(
            attempt_id,
            identity_id = ?identity_id,
            outcome = ?outcome,
            "Manual access decision recorded"
        );

        Ok(attempt_id)
    }
}
