use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Store Client Contract
// ============================================================================
//
// The repository talks to the event store only through these traits. The
// store guarantees ordered, append-only writes per stream with an optimistic
// concurrency check; the repository never re-implements those guarantees.
//
// Positions are 1-based. Position 0 of every stream is the implicit creation
// marker written by the store itself.
//
// ============================================================================

/// Position of the implicit stream-creation marker.
pub const STREAM_CREATED_POSITION: u64 = 0;

/// First position holding a domain event.
pub const FIRST_EVENT_POSITION: u64 = 1;

/// Expected current version of a stream for an optimistic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Accept any current stream version (no concurrency check).
    Any,
    /// The stream must not exist yet (first write).
    NoStream,
    /// The stream must currently end at exactly this position.
    Exact(u64),
}

impl fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::NoStream => f.write_str("no stream"),
            Self::Exact(version) => write!(f, "{version}"),
        }
    }
}

/// An event ready to be written, already encoded by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventData {
    /// Fresh id per event, used by the store to deduplicate retried writes.
    pub event_id: Uuid,
    pub event_type: String,
    pub payload: Vec<u8>,
    pub metadata: Vec<u8>,
}

/// An event as read back from a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub stream: String,
    pub position: u64,
    pub event_id: Uuid,
    pub event_type: String,
    pub payload: Vec<u8>,
    pub metadata: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// One page of a forward read.
#[derive(Debug, Clone)]
pub struct StreamSlice {
    pub stream: String,
    pub from_position: u64,
    pub events: Vec<RecordedEvent>,
    /// Where the next page should start.
    pub next_position: u64,
    /// Position of the last event in the stream at read time.
    pub last_position: u64,
    pub is_end_of_stream: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResult {
    /// Stream version after the write; pass as `Exact` for the next write.
    pub next_expected_version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("stream `{stream}` not found")]
    StreamNotFound { stream: String },

    #[error("stream `{stream}` has been deleted")]
    StreamDeleted { stream: String },

    #[error(
        "wrong expected version for stream `{stream}`: expected {expected}, current {}",
        describe_version(.current)
    )]
    WrongExpectedVersion {
        stream: String,
        expected: ExpectedVersion,
        current: Option<u64>,
    },

    #[error("transaction on stream `{stream}` was already committed")]
    TransactionClosed { stream: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Renders a stream's current version, `None` meaning the stream does not exist.
pub fn describe_version(version: &Option<u64>) -> String {
    match version {
        Some(version) => version.to_string(),
        None => "no stream".to_string(),
    }
}

/// A multi-page write to a single stream.
///
/// Pages written before `commit` are invisible to readers. Dropping the
/// transaction without committing discards them.
#[async_trait]
pub trait StoreTransaction: Send {
    fn stream(&self) -> &str;

    async fn write(&mut self, events: Vec<EventData>) -> Result<(), StoreError>;

    async fn commit(&mut self) -> Result<WriteResult, StoreError>;
}

/// Boundary to the event-store service.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Read up to `count` events starting at `start`, in position order.
    ///
    /// Fails with `StreamNotFound` / `StreamDeleted` for missing or
    /// tombstoned streams.
    async fn read_stream_forward(
        &self,
        stream: &str,
        start: u64,
        count: u64,
        resolve_link_tos: bool,
    ) -> Result<StreamSlice, StoreError>;

    /// Atomically append `events` if the stream is at `expected`.
    async fn append_to_stream(
        &self,
        stream: &str,
        expected: ExpectedVersion,
        events: Vec<EventData>,
    ) -> Result<WriteResult, StoreError>;

    /// Open a transaction whose pages become visible only on commit.
    ///
    /// The expected version is checked when the transaction commits.
    async fn start_transaction(
        &self,
        stream: &str,
        expected: ExpectedVersion,
    ) -> Result<Box<dyn StoreTransaction>, StoreError>;
}
