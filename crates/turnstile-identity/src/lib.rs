//! # turnstile-identity
//!
//! Identity registry for the turnstile access core.
//!
//! This crate is responsible for:
//! - Enrollment of identities together with their biometric template
//! - Gap-filling allocation of the numeric identity (badge) id
//! - Biometric template storage and lookup
//! - Atomic cascade deletion of an identity, its template and credentials

#![warn(clippy::all)]

pub mod allocator;
pub mod errors;
pub mod service;
pub mod traits;
pub mod types;

pub use allocator::next_identity_id;
pub use errors::{ErrorKind, IdentityError, Result};
pub use service::IdentityService;
pub use traits::{BiometricStore, IdentityStore};
pub use types::*;
