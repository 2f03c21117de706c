//! Identity type definitions.

use crate::errors::{IdentityError, Result};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Numeric identity id, doubling as the human-facing badge number
pub type IdentityId = u32;

/// Identity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub identity_id: IdentityId,
    pub display_name: String,
    pub contact: String,
    pub created_at: u64,
}

/// Face feature vector produced by the biometric extractor
///
/// Opaque to the core apart from equality and exact storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Stored biometric template, at most one per identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiometricTemplate {
    pub identity_id: IdentityId,
    pub features: FeatureVector,
    pub enrolled_at: u64,
    pub updated_at: u64,
}

/// Enrollment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIdentity {
    pub display_name: String,
    pub contact: String,
    pub features: FeatureVector,
}

impl NewIdentity {
    /// Reject requests with missing fields before they reach storage
    pub fn validate(&self) -> Result<()> {
        if self.display_name.trim().is_empty() {
            return Err(IdentityError::InvalidRequest(
                "display_name is required".to_string(),
            ));
        }
        if self.contact.trim().is_empty() {
            return Err(IdentityError::InvalidRequest(
                "contact is required".to_string(),
            ));
        }
        if self.features.is_empty() {
            return Err(IdentityError::InvalidRequest(
                "feature vector is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// What a cascade delete removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionSummary {
    pub identity_id: IdentityId,
    pub template_removed: bool,
    pub credentials_removed: usize,
}

/// Returns the current Unix timestamp in seconds.
///
/// A clock set before the epoch yields 0 rather than panicking.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
