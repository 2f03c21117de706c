//! # turnstile-audit
//!
//! Append-only record of every access decision.
//!
//! Each verification stage appends exactly one [`AccessAttempt`]. Records are
//! never updated or deleted; attempt ids increase with insertion order and
//! timestamps never go backwards.

#![warn(clippy::all)]

pub mod errors;
pub mod service;
pub mod traits;
pub mod types;

pub use errors::{AuditError, Result};
pub use service::AuditService;
pub use traits::AuditLog;
pub use types::*;
