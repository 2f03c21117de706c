//! One-shot 1:N identification.

use crate::{biometric::ImageSample, errors::*, types::*};
use tracing::{debug, info};
use turnstile_audit::{AuditLog, DecisionReason, Factor, Outcome};
use turnstile_credentials::CredentialLifecycle;
use turnstile_identity::{BiometricStore, IdentityStore};

use super::VerificationEngine;

impl<C, I, A> VerificationEngine<C, I, A>
where
    C: CredentialLifecycle + 'static,
    I: IdentityStore + BiometricStore + 'static,
    A: AuditLog + 'static,
{
    /// Extract once and scan templates in enrollment order; first match wins
    pub(crate) async fn identify_internal(&self, sample: &ImageSample) -> Result<Identification> {
        let features = match self.extract(sample).await? {
            Some(features) => features,
            None => {
                debug!("No face detected in identification sample");
                return Ok(Identification::NoFaceDetected);
            }
        };

        let templates = self.identities.list_templates().await?;
        let scanned = templates.len();

        let matched = templates
            .into_iter()
            .find(|template| self.matcher.is_match(&template.features, &features))
            .map(|template| template.identity_id);

        match matched {
            Some(identity_id) => {
                self.append_audit(Some(identity_id), Factor::Biometric, Outcome::Granted, None)
                    .await?;
                info!(identity_id, scanned, "Identified by face");
                Ok(Identification::Identified(identity_id))
            }
            None => {
                self.append_audit(
                    None,
                    Factor::Biometric,
                    Outcome::Denied,
                    Some(DecisionReason::Mismatch),
                )
                .await?;
                info!(scanned, "No enrolled face matched");
                Ok(Identification::NotIdentified)
            }
        }
    }
}
