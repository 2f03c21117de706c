//! Stage 2: face check against the stored template.

use crate::{biometric::ImageSample, errors::*, types::*};
use tracing::{debug, info};
use turnstile_audit::{AuditLog, DecisionReason, Factor, Outcome};
use turnstile_credentials::CredentialLifecycle;
use turnstile_identity::{BiometricStore, IdentityId, IdentityStore};

use super::VerificationEngine;

impl<C, I, A> VerificationEngine<C, I, A>
where
    C: CredentialLifecycle + 'static,
    I: IdentityStore + BiometricStore + 'static,
    A: AuditLog + 'static,
{
    /// Template lookup, then extraction, then comparison
    ///
    /// Only a missing template, a match or a mismatch is audited. No face in
    /// the sample and capability faults end the stage without a record.
    pub(crate) async fn check_biometric_internal(
        &self,
        identity_id: IdentityId,
        sample: &ImageSample,
    ) -> Result<BiometricCheck> {
        let template = match self.identities.get_template(identity_id).await? {
            Some(template) => template,
            None => {
                info!(identity_id, "No biometric template on file");
                self.append_audit(
                    Some(identity_id),
                    Factor::Biometric,
                    Outcome::Denied,
                    Some(DecisionReason::NoTemplate),
                )
                .await?;
                return Ok(BiometricCheck::NoTemplate);
            }
        };

        let features = match self.extract(sample).await? {
            Some(features) => features,
            None => {
                debug!(identity_id, "No face detected in sample");
                return Ok(BiometricCheck::NoFaceDetected);
            }
        };

        if self.matcher.is_match(&template.features, &features) {
            self.append_audit(Some(identity_id), Factor::Biometric, Outcome::Granted, None)
                .await?;
            info!(identity_id, "Access granted");
            Ok(BiometricCheck::Granted)
        } else {
            self.append_audit(
                Some(identity_id),
                Factor::Biometric,
                Outcome::Denied,
                Some(DecisionReason::Mismatch),
            )
            .await?;
            info!(identity_id, "Face mismatch, access denied");
            Ok(BiometricCheck::Denied)
        }
    }
}
