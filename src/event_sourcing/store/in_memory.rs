use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::client::{
    EventData, ExpectedVersion, RecordedEvent, StoreClient, StoreError, StoreTransaction,
    StreamSlice, WriteResult, STREAM_CREATED_POSITION,
};

// ============================================================================
// In-Memory Store Client
// ============================================================================
//
// A complete, process-local implementation of the store contract:
// 1. The first write to a stream lays down the creation marker at position 0
// 2. Appends are all-or-nothing and checked against the expected version
// 3. Transaction pages stay invisible until commit
// 4. Re-sending an already written batch (same event ids, same expected
//    version) succeeds without writing twice
// 5. Deleted streams are tombstoned and reject reads and writes
//
// ============================================================================

/// Event type of the creation marker at position 0.
pub const STREAM_CREATED_EVENT_TYPE: &str = "$stream-created";

#[derive(Debug)]
struct StreamState {
    /// `events[0]` is always the creation marker.
    events: Vec<RecordedEvent>,
    deleted: bool,
}

impl StreamState {
    fn create(stream: &str) -> Self {
        let marker = RecordedEvent {
            stream: stream.to_string(),
            position: STREAM_CREATED_POSITION,
            event_id: Uuid::new_v4(),
            event_type: STREAM_CREATED_EVENT_TYPE.to_string(),
            payload: Vec::new(),
            metadata: Vec::new(),
            created_at: Utc::now(),
        };
        Self {
            events: vec![marker],
            deleted: false,
        }
    }

    fn current_version(&self) -> u64 {
        (self.events.len() - 1) as u64
    }

    /// Whether `events` already sit right after `after`, in order.
    fn already_written(&self, after: u64, events: &[EventData]) -> bool {
        let start = after as usize + 1;
        let end = start + events.len();
        if events.is_empty() || end > self.events.len() {
            return false;
        }
        self.events[start..end]
            .iter()
            .zip(events)
            .all(|(stored, proposed)| stored.event_id == proposed.event_id)
    }
}

/// Write counters, for inspecting how the repository drove the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub appends: u64,
    pub transactions_started: u64,
    pub transaction_pages: u64,
    pub transactions_committed: u64,
    pub events_written: u64,
}

#[derive(Debug, Default)]
struct Inner {
    streams: HashMap<String, StreamState>,
    stats: StoreStats,
}

impl Inner {
    fn append(
        &mut self,
        stream: &str,
        expected: ExpectedVersion,
        events: Vec<EventData>,
    ) -> Result<WriteResult, StoreError> {
        let current = match self.streams.get(stream) {
            Some(state) if state.deleted => {
                return Err(StoreError::StreamDeleted {
                    stream: stream.to_string(),
                })
            }
            Some(state) => Some(state.current_version()),
            None => None,
        };

        let accepted = match expected {
            ExpectedVersion::Any => true,
            ExpectedVersion::NoStream => current.is_none(),
            ExpectedVersion::Exact(version) => current == Some(version),
        };

        if !accepted {
            let retried_from = match expected {
                ExpectedVersion::NoStream => Some(STREAM_CREATED_POSITION),
                ExpectedVersion::Exact(version) => Some(version),
                ExpectedVersion::Any => None,
            };
            if let (Some(after), Some(state)) = (retried_from, self.streams.get(stream)) {
                if state.already_written(after, &events) {
                    tracing::debug!(
                        stream = %stream,
                        event_count = events.len(),
                        "Batch already written, acknowledging idempotent retry"
                    );
                    return Ok(WriteResult {
                        next_expected_version: after + events.len() as u64,
                    });
                }
            }

            return Err(StoreError::WrongExpectedVersion {
                stream: stream.to_string(),
                expected,
                current,
            });
        }

        let state = self
            .streams
            .entry(stream.to_string())
            .or_insert_with(|| StreamState::create(stream));

        let now = Utc::now();
        let mut position = state.current_version();
        let written = events.len() as u64;
        for event in events {
            position += 1;
            state.events.push(RecordedEvent {
                stream: stream.to_string(),
                position,
                event_id: event.event_id,
                event_type: event.event_type,
                payload: event.payload,
                metadata: event.metadata,
                created_at: now,
            });
        }

        self.stats.events_written += written;

        Ok(WriteResult {
            next_expected_version: position,
        })
    }
}

/// Process-local event store. Cloning shares the same streams.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStoreClient {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStoreClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tombstone a stream. Later reads and writes fail with `StreamDeleted`.
    pub async fn delete_stream(
        &self,
        stream: &str,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let state = inner
            .streams
            .get_mut(stream)
            .ok_or_else(|| StoreError::StreamNotFound {
                stream: stream.to_string(),
            })?;

        if state.deleted {
            return Err(StoreError::StreamDeleted {
                stream: stream.to_string(),
            });
        }

        let current = state.current_version();
        let accepted = match expected {
            ExpectedVersion::Any => true,
            ExpectedVersion::NoStream => false,
            ExpectedVersion::Exact(version) => version == current,
        };
        if !accepted {
            return Err(StoreError::WrongExpectedVersion {
                stream: stream.to_string(),
                expected,
                current: Some(current),
            });
        }

        state.deleted = true;
        state.events.truncate(1);
        tracing::info!(stream = %stream, "🗑️ Stream tombstoned");
        Ok(())
    }

    /// Current version of a live stream, `None` if missing or deleted.
    pub async fn stream_version(&self, stream: &str) -> Option<u64> {
        let inner = self.inner.read().await;
        inner
            .streams
            .get(stream)
            .filter(|state| !state.deleted)
            .map(StreamState::current_version)
    }

    pub async fn stats(&self) -> StoreStats {
        self.inner.read().await.stats
    }
}

#[async_trait]
impl StoreClient for InMemoryStoreClient {
    async fn read_stream_forward(
        &self,
        stream: &str,
        start: u64,
        count: u64,
        _resolve_link_tos: bool,
    ) -> Result<StreamSlice, StoreError> {
        let inner = self.inner.read().await;
        let state = inner
            .streams
            .get(stream)
            .ok_or_else(|| StoreError::StreamNotFound {
                stream: stream.to_string(),
            })?;

        if state.deleted {
            return Err(StoreError::StreamDeleted {
                stream: stream.to_string(),
            });
        }

        let last_position = state.current_version();
        let from = start.min(last_position + 1);
        let end = from.saturating_add(count).min(last_position + 1);
        let events = state.events[from as usize..end as usize].to_vec();

        Ok(StreamSlice {
            stream: stream.to_string(),
            from_position: start,
            events,
            next_position: end,
            last_position,
            is_end_of_stream: end > last_position,
        })
    }

    async fn append_to_stream(
        &self,
        stream: &str,
        expected: ExpectedVersion,
        events: Vec<EventData>,
    ) -> Result<WriteResult, StoreError> {
        let mut inner = self.inner.write().await;
        inner.stats.appends += 1;
        inner.append(stream, expected, events)
    }

    async fn start_transaction(
        &self,
        stream: &str,
        expected: ExpectedVersion,
    ) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.streams.get(stream).is_some_and(|state| state.deleted) {
            return Err(StoreError::StreamDeleted {
                stream: stream.to_string(),
            });
        }
        inner.stats.transactions_started += 1;

        Ok(Box::new(InMemoryTransaction {
            inner: Arc::clone(&self.inner),
            stream: stream.to_string(),
            expected,
            pending: Vec::new(),
            committed: false,
        }))
    }
}

/// Buffers pages locally and applies them in one atomic append on commit.
struct InMemoryTransaction {
    inner: Arc<RwLock<Inner>>,
    stream: String,
    expected: ExpectedVersion,
    pending: Vec<EventData>,
    committed: bool,
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    fn stream(&self) -> &str {
        &self.stream
    }

    async fn write(&mut self, events: Vec<EventData>) -> Result<(), StoreError> {
        if self.committed {
            return Err(StoreError::TransactionClosed {
                stream: self.stream.clone(),
            });
        }
        self.inner.write().await.stats.transaction_pages += 1;
        self.pending.extend(events);
        Ok(())
    }

    async fn commit(&mut self) -> Result<WriteResult, StoreError> {
        if self.committed {
            return Err(StoreError::TransactionClosed {
                stream: self.stream.clone(),
            });
        }

        let mut inner = self.inner.write().await;
        let events = std::mem::take(&mut self.pending);
        // A failed commit still closes the transaction
        self.committed = true;
        let result = inner.append(&self.stream, self.expected, events)?;
        inner.stats.transactions_committed += 1;
        Ok(result)
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if !self.committed && !self.pending.is_empty() {
            tracing::debug!(
                stream = %self.stream,
                discarded = self.pending.len(),
                "Transaction dropped before commit, discarding pages"
            );
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
