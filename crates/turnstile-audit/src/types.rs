use serde::{Deserialize, Serialize};
use turnstile_identity::IdentityId;

pub use turnstile_identity::current_timestamp;

/// Sequential access attempt identifier, starting at 1
pub type AttemptId = u64;

/// Number of records returned by `recent` when the caller has no preference
pub const DEFAULT_RECENT_LIMIT: usize = 10;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Which verification stage produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Factor {
    Credential,
    Biometric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Granted,
    Denied,
}

/// Why a decision was taken; visible only in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionReason {
    /// Token matched no credential
    NotFound,
    /// Credential revoked or rotated out
    Inactive,
    /// Credential expired
    Expired,
    /// Valid credential whose identity no longer exists
    IdentityMissing,
    /// Identity has no biometric template
    NoTemplate,
    /// Fresh sample did not match
    Mismatch,
    /// Administrative decision
    Manual,
}

/// One audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessAttempt {
    pub attempt_id: AttemptId,
    pub identity_id: Option<IdentityId>,
    pub factor: Factor,
    pub outcome: Outcome,
    pub reason: Option<DecisionReason>,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
}

/// Counters over a time window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyStats {
    pub attempts: usize,
    pub granted: usize,
    pub denied: usize,
}

/// Report query; every field set narrows the result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Inclusive lower bound on `timestamp`
    pub from: Option<u64>,
    /// Inclusive upper bound on `timestamp`
    pub to: Option<u64>,
    pub outcome: Option<Outcome>,
    pub identity_id: Option<IdentityId>,
}

impl ReportFilter {
    pub fn matches(&self, attempt: &AccessAttempt) -> bool {
        self.from.map_or(true, |from| attempt.timestamp >= from)
            && self.to.map_or(true, |to| attempt.timestamp <= to)
            && self.outcome.map_or(true, |outcome| attempt.outcome == outcome)
            && self
                .identity_id
                .map_or(true, |identity_id| attempt.identity_id == Some(identity_id))
    }
}

/// Midnight (UTC) of the day containing `timestamp`
pub fn start_of_day(timestamp: u64) -> u64 {
    timestamp - timestamp % SECONDS_PER_DAY
}
