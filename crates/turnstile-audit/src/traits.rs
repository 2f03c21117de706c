use crate::{
    AccessAttempt, AttemptId, DailyStats, DecisionReason, Factor, Outcome, ReportFilter, Result,
};
use async_trait::async_trait;
use turnstile_identity::IdentityId;

/// Append-only audit log
///
/// Records cannot be updated or deleted through this interface.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one decision
    async fn record(
        &self,
        identity_id: Option<IdentityId>,
        factor: Factor,
        outcome: Outcome,
    ) -> Result<AttemptId> {
        self.record_detailed(identity_id, factor, outcome, None).await
    }

    /// Append one decision with its reason
    async fn record_detailed(
        &self,
        identity_id: Option<IdentityId>,
        factor: Factor,
        outcome: Outcome,
        reason: Option<DecisionReason>,
    ) -> Result<AttemptId>;

    /// Most recent records, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<AccessAttempt>>;

    /// Counters over every record at or after `since`
    async fn daily_stats(&self, since: u64) -> Result<DailyStats>;

    /// Records matching `filter`, newest first
    async fn report(&self, filter: ReportFilter) -> Result<Vec<AccessAttempt>>;
}
