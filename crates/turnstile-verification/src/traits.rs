use crate::{
    AccessDecision, BiometricCheck, CredentialCheck, Enrollment, Identification, ImageSample,
    NewEnrollment, Result,
};
use async_trait::async_trait;
use turnstile_audit::{AttemptId, Factor, Outcome};
use turnstile_identity::IdentityId;

/// Access verification operations
#[async_trait]
pub trait AccessVerifier: Send + Sync {
    /// Enroll from a captured image and issue the first credential; not audited
    async fn enroll(&self, request: NewEnrollment) -> Result<Enrollment>;

    /// Stage 1: resolve a QR token; audited once when decided
    async fn check_credential(&self, token: &str) -> Result<CredentialCheck>;

    /// Stage 2: compare a fresh sample with the identity's template
    async fn check_biometric(
        &self,
        identity_id: IdentityId,
        sample: &ImageSample,
    ) -> Result<BiometricCheck>;

    /// Stage 1 then stage 2
    async fn verify_access(&self, token: &str, sample: &ImageSample) -> Result<AccessDecision>;

    /// One-shot 1:N identification
    async fn identify(&self, sample: &ImageSample) -> Result<Identification>;

    /// Record an administrative grant or denial
    async fn record_manual_decision(
        &self,
        identity_id: Option<IdentityId>,
        factor: Factor,
        outcome: Outcome,
    ) -> Result<AttemptId>;
}
