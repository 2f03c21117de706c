//! Biometric capability seams and the reference comparator.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use turnstile_identity::FeatureVector;

/// Euclidean distance at or under which two faces are the same person
pub const DEFAULT_MATCH_TOLERANCE: f64 = 0.6;

/// Failure of the biometric capability itself
#[derive(Debug, Error)]
pub enum BiometricError {
    #[error("Image payload could not be decoded: {0}")]
    InvalidImage(String),

    #[error("Feature extraction failed: {0}")]
    Extraction(String),
}

/// Raw image bytes presented for a face check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample(Vec<u8>);

impl ImageSample {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode a base64 payload, optionally carrying a data URL header
    pub fn from_payload(payload: &str) -> Result<Self, BiometricError> {
        decode_image_payload(payload).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ImageSample {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Decode `data:image/jpeg;base64,<data>` or bare base64
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, BiometricError> {
    let data = match payload.split_once(',') {
        Some((header, data)) if header.starts_with("data:") => data,
        _ => payload,
    };

    let data = data.trim();
    if data.is_empty() {
        return Err(BiometricError::InvalidImage("payload is empty".to_string()));
    }

    STANDARD
        .decode(data)
        .map_err(|e| BiometricError::InvalidImage(e.to_string()))
}

/// Turns an image into a feature vector
///
/// `Ok(None)` means the image was processed but contains no face.
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    async fn extract_features(
        &self,
        image: &ImageSample,
    ) -> Result<Option<FeatureVector>, BiometricError>;
}

/// Decides whether two feature vectors belong to the same person
pub trait FaceMatcher: Send + Sync {
    fn is_match(&self, known: &FeatureVector, candidate: &FeatureVector) -> bool;
}

/// Distance-threshold comparator
#[derive(Debug, Clone, Copy)]
pub struct EuclideanMatcher {
    tolerance: f64,
}

impl EuclideanMatcher {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Default for EuclideanMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_TOLERANCE)
    }
}

impl FaceMatcher for EuclideanMatcher {
    fn is_match(&self, known: &FeatureVector, candidate: &FeatureVector) -> bool {
        euclidean_distance(known, candidate).is_some_and(|distance| distance <= self.tolerance)
    }
}

/// `None` when the vectors have different lengths
pub fn euclidean_distance(a: &FeatureVector, b: &FeatureVector) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }

    let sum: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();

    Some(sum.sqrt())
}
