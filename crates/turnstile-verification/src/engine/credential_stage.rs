//! Stage 1: QR credential check.

use crate::{errors::*, types::*};
use tracing::{debug, warn};
use turnstile_audit::{AuditLog, DecisionReason, Factor, Outcome};
use turnstile_credentials::{CredentialLifecycle, CredentialValidation};
use turnstile_identity::{BiometricStore, IdentityStore};

use super::VerificationEngine;

impl<C, I, A> VerificationEngine<C, I, A>
where
    C: CredentialLifecycle + 'static,
    I: IdentityStore + BiometricStore + 'static,
    A: AuditLog + 'static,
{
    /// Resolve a token to an identity, appending exactly one credential record
    ///
    /// A store fault while resolving decides nothing and is returned without a
    /// record, like a biometric capability fault.
    pub(crate) async fn check_credential_internal(&self, token: &str) -> Result<CredentialCheck> {
        let token = token.trim();
        if token.is_empty() {
            return Err(VerificationError::InvalidRequest(
                "credential token is empty".to_string(),
            ));
        }

        let validation = self.credentials.validate(token).await.map_err(|e| {
            warn!(error = %e, "Credential lookup failed");
            VerificationError::from(e)
        })?;

        let identity_id = match validation {
            CredentialValidation::Valid(identity_id) => identity_id,
            CredentialValidation::Invalid(reason) => {
                let reason = rejection_reason(reason);
                debug!(reason = ?reason, "Credential rejected");
                self.append_audit(None, Factor::Credential, Outcome::Denied, Some(reason))
                    .await?;
                return Ok(CredentialCheck::Rejected(reason));
            }
        };

        let exists = self
            .identities
            .identity_exists(identity_id)
            .await
            .map_err(|e| {
                warn!(identity_id, error = %e, "Identity lookup failed");
                VerificationError::from(e)
            })?;

        if !exists {
            warn!(identity_id, "Valid credential for missing identity");
            self.append_audit(
                Some(identity_id),
                Factor::Credential,
                Outcome::Denied,
                Some(DecisionReason::IdentityMissing),
            )
            .await?;
            return Ok(CredentialCheck::Rejected(DecisionReason::IdentityMissing));
        }

        self.append_audit(Some(identity_id), Factor::Credential, Outcome::Granted, None)
            .await?;
        debug!(identity_id, "Credential resolved");

        Ok(CredentialCheck::Resolved(identity_id))
    }
}
