// ============================================================================
// Event Sourcing Store - Client-side boundary to the event store
// ============================================================================
//
// The store contract the repository consumes, plus an in-memory client that
// honours it end to end.
//
// ============================================================================

pub mod client;
pub mod in_memory;

pub use client::{
    describe_version, EventData, ExpectedVersion, RecordedEvent, StoreClient, StoreError, StoreTransaction,
    StreamSlice, WriteResult, FIRST_EVENT_POSITION, STREAM_CREATED_POSITION,
};
pub use in_memory::{InMemoryStoreClient, StoreStats, STREAM_CREATED_EVENT_TYPE};
