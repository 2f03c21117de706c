//! Enrollment from a captured image.

use crate::{biometric::ImageSample, errors::*, types::*};
use tracing::{debug, error, info};
use turnstile_audit::AuditLog;
use turnstile_credentials::CredentialLifecycle;
use turnstile_identity::{BiometricStore, IdentityStore, NewIdentity};

use super::VerificationEngine;

impl<C, I, A> VerificationEngine<C, I, A>
where
    C: CredentialLifecycle + 'static,
    I: IdentityStore + BiometricStore + 'static,
    A: AuditLog + 'static,
{
    /// Decode, extract once, store identity and template, issue a credential
    ///
    /// If the credential cannot be issued the new identity is deleted again,
    /// so a caller never sees an identity without a credential.
    pub(crate) async fn enroll_internal(&self, request: NewEnrollment) -> Result<Enrollment> {
        if request.display_name.trim().is_empty() || request.contact.trim().is_empty() {
            return Err(VerificationError::InvalidRequest(
                "display_name and contact are required".to_string(),
            ));
        }

        let sample = ImageSample::from_payload(&request.image_payload)?;
        let features = match self.extract(&sample).await? {
            Some(features) => features,
            None => {
                debug!("No face detected in enrollment image");
                return Err(VerificationError::NoFaceDetected);
            }
        };

        let identity = self
            .identities
            .enroll(NewIdentity {
                display_name: request.display_name,
                contact: request.contact,
                features,
            })
            .await?;
        let identity_id = identity.identity_id;

        let credential = match self
            .credentials
            .issue(identity_id, self.config.credential_validity)
            .await
        {
            Ok(credential) => credential,
            Err(e) => {
                error!(identity_id, error = %e, "First credential not issued, removing identity");
                if let Err(cleanup) = self.identities.delete_identity(identity_id).await {
                    error!(identity_id, error = %cleanup, "Failed to remove half-enrolled identity");
                }
                return Err(e.into());
            }
        };

        info!(identity_id, "Identity enrolled with first credential");

        Ok(Enrollment {
            identity,
            credential,
        })
    }
}
