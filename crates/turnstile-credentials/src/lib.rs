//! # turnstile-credentials
//!
//! QR credential lifecycle for the turnstile access core.
//!
//! A credential moves `ACTIVE -> INACTIVE -> deleted`. It becomes inactive
//! on revocation, on expiry (lazily at validation or by the sweep) or when
//! superseded by rotation, and is deleted only by the purge. At most one
//! credential per identity is active at any instant.
//!
//! The [`CleanupScheduler`] runs the sweep and then the purge on a fixed
//! interval as a single owned background task.

#![warn(clippy::all)]

pub mod errors;
pub mod scheduler;
mod service;
pub mod traits;
pub mod types;


pub use errors::*;
pub use scheduler::{CleanupReport, CleanupScheduler, SchedulerHandle, CLEANUP_INTERVAL};
pub use service::{
    base64_url_encode, generate_random_bytes, generate_token, sha256, CredentialService,
};
pub use traits::*;
pub use types::*;
