//! RocksDB-backed audit log.

use crate::{errors::*, traits::AuditLog, types::*};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use turnstile_identity::IdentityId;
use turnstile_storage::{Storage, CF_ACCESS_ATTEMPTS};

/// Position of the append cursor
#[derive(Debug)]
struct AppendState {
    next_id: AttemptId,
    last_timestamp: u64,
}

/// Audit log backed by a [`Storage`] implementation
///
/// Appends are serialized so attempt ids and timestamps are both monotonic
/// in insertion order. Records are keyed by the big-endian attempt id, so a
/// forward scan returns them oldest first.
pub struct AuditService<S: Storage> {
    storage: Arc<S>,
    append: Mutex<AppendState>,
}

impl<S: Storage + 'static> AuditService<S> {
    /// Open the log, resuming after the last stored record
    pub async fn open(storage: Arc<S>) -> Result<Self> {
        let existing = load_all(storage.as_ref()).await?;

        let state = match existing.last() {
            Some(last) => AppendState {
                next_id: last.attempt_id + 1,
                last_timestamp: last.timestamp,
            },
            None => AppendState {
                next_id: 1,
                last_timestamp: 0,
            },
        };

        info!(
            records = existing.len(),
            next_id = state.next_id,
            "Audit log opened"
        );

        Ok(Self {
            storage,
            append: Mutex::new(state),
        })
    }

    async fn newest_first(&self) -> Result<Vec<AccessAttempt>> {
        let mut attempts = load_all(self.storage.as_ref()).await?;
        attempts.reverse();
        Ok(attempts)
    }
}

async fn load_all<S: Storage>(storage: &S) -> Result<Vec<AccessAttempt>> {
    let rows: Vec<(Vec<u8>, AccessAttempt)> = storage.scan_all(CF_ACCESS_ATTEMPTS).await?;
    Ok(rows.into_iter().map(|(_, attempt)| attempt).collect())
}

#[async_trait]
impl<S: Storage + 'static> AuditLog for AuditService<S> {
    async fn record_detailed(
        &self,
        identity_id: Option<IdentityId>,
        factor: Factor,
        outcome: Outcome,
        reason: Option<DecisionReason>,
    ) -> Result<AttemptId> {
        let mut state = self.append.lock().await;

        let attempt = AccessAttempt {
            attempt_id: state.next_id,
            identity_id,
            factor,
            outcome,
            reason,
            timestamp: current_timestamp().max(state.last_timestamp),
        };

        self.storage
            .put(
                CF_ACCESS_ATTEMPTS,
                &attempt.attempt_id.to_be_bytes(),
                &attempt,
            )
            .await?;

        // Advance only after the write landed so a failed append leaves no gap
        state.next_id += 1;
        state.last_timestamp = attempt.timestamp;

        debug!(
            attempt_id = attempt.attempt_id,
            identity_id = ?identity_id,
            factor = ?factor,
            outcome = ?outcome,
            reason = ?reason,
            "Access attempt recorded"
        );

        Ok(attempt.attempt_id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AccessAttempt>> {
        let mut attempts = self.newest_first().await?;
        attempts.truncate(limit);
        Ok(attempts)
    }

    async fn daily_stats(&self, since: u64) -> Result<DailyStats> {
        let attempts = load_all(self.storage.as_ref()).await?;

        Ok(attempts
            .iter()
            .filter(|attempt| attempt.timestamp >= since)
            .fold(DailyStats::default(), |mut stats, attempt| {
                stats.attempts += 1;
                match attempt.outcome {
                    Outcome::Granted => stats.granted += 1,
                    Outcome::Denied => stats.denied += 1,
                }
                stats
            }))
    }

    async fn report(&self, filter: ReportFilter) -> Result<Vec<AccessAttempt>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(AuditError::InvalidFilter(format!(
                    "from {} is after to {}",
                    from, to
                )));
            }
        }

        Ok(self
            .newest_first()
            .await?
            .into_iter()
            .filter(|attempt| filter.matches(attempt))
            .collect())
    }
}
