// ============================================================================
// Event Sourcing Core - Generic Infrastructure Abstractions
// ============================================================================
//
// This module contains GENERIC, reusable event sourcing abstractions that
// work with ANY domain aggregate:
// - The aggregate contract and its replay factory
// - Event type traits and the tag → decoder registry
// - Commit headers stamped on every persisted event
//
// No domain-specific code lives here.
//
// ============================================================================

pub mod aggregate;
pub mod event;
pub mod headers;

// Re-export core types for convenience
pub use aggregate::{
    Aggregate, AggregateFactory, ConstructionError, FnFactory, ReplayConstructor, ReplayFactory,
};
pub use event::{DomainEvent, EventRegistry, SerializableEvent};
pub use headers::{
    CommitHeaders, Headers, AGGREGATE_TYPE_HEADER, COMMIT_ID_HEADER, EVENT_TYPE_HEADER,
};
