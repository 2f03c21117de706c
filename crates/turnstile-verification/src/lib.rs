//! # turnstile-verification
//!
//! Two-factor access verification.
//!
//! Stage 1 resolves a QR token to an identity through the credential
//! lifecycle. Stage 2 compares a fresh face sample with the identity's stored
//! template. Each stage appends exactly one audit record when it reaches a
//! decision. A sample with no detectable face, a failure of the biometric
//! capability and a store fault decide nothing and are never recorded.
//!
//! Enrollment extracts the face once from the captured image, stores the
//! identity with its template and issues the first credential.
//!
//! A one-shot 1:N identification mode scans every template in enrollment
//! order; it is a fallback for sites without QR readers.

#![warn(clippy::all)]

pub mod biometric;
pub mod engine;
pub mod errors;
pub mod traits;
pub mod types;


pub use biometric::{
    decode_image_payload, euclidean_distance, BiometricError, EuclideanMatcher, FaceMatcher,
    FeatureExtractor, ImageSample, DEFAULT_MATCH_TOLERANCE,
};
pub use engine::VerificationEngine;
pub use errors::{
    Result, VerificationError, ACCESS_DENIED_MESSAGE, NO_FACE_MESSAGE, RETRY_MESSAGE,
};
pub use traits::AccessVerifier;
pub use types::*;
