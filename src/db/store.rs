use std::future::Future;

use chrono::{DateTime, Utc};

use super::claim::ClaimRecord;

/// Append-only log of successful claims.
pub trait ClaimsStore: Send + Sync {
    /// Latest `claimed_at` recorded for `fid`, if any.
    fn most_recent_claim(
        &self,
        fid: u64,
    ) -> impl Future<Output = eyre::Result<Option<DateTime<Utc>>>> + Send;

    fn append(&self, record: ClaimRecord) -> impl Future<Output = eyre::Result<()>> + Send;
}
