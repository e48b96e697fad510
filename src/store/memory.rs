//! In-memory sink: keeps inserted records in a Vec.
//!
//! Used for dry runs (nothing leaves the process) and as a test double that
//! counts inserts and can be told to fail.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::intake::model::ProfileRecord;
use crate::store::traits::{ProfileSink, RecordId};

/// Sink that stores records in memory.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<(RecordId, ProfileRecord)>>,
    attempts: AtomicUsize,
    /// Number of upcoming inserts that should fail as unavailable.
    fail_next: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next `n` inserts fail with `DatabaseError::Unavailable`.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Total insert calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Records stored so far.
    pub async fn records(&self) -> Vec<(RecordId, ProfileRecord)> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl ProfileSink for MemorySink {
    async fn insert(&self, record: &ProfileRecord) -> Result<RecordId, DatabaseError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(DatabaseError::Unavailable("memory sink told to fail".into()));
        }

        // Yield so concurrent callers interleave the way a network sink would.
        tokio::task::yield_now().await;

        let id = RecordId(Uuid::new_v4().to_string());
        self.records.lock().await.push((id.clone(), record.clone()));
        tracing::debug!(id = %id, "Profile stored in memory");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::model::{CandidateProfile, ProfileVariant};

    #[tokio::test]
    async fn stores_and_counts() {
        let sink = MemorySink::new();
        let record = CandidateProfile::new(ProfileVariant::Basic).to_record();
        let id = sink.insert(&record).await.unwrap();
        let stored = sink.records().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, id);
        assert_eq!(sink.attempts(), 1);
    }

    #[tokio::test]
    async fn fails_on_request_then_recovers() {
        let sink = MemorySink::new();
        sink.fail_next(1);
        let record = CandidateProfile::new(ProfileVariant::Basic).to_record();
        assert!(matches!(
            sink.insert(&record).await,
            Err(DatabaseError::Unavailable(_))
        ));
        assert!(sink.insert(&record).await.is_ok());
        assert_eq!(sink.attempts(), 2);
        assert_eq!(sink.records().await.len(), 1);
    }
}
