use std::fmt;
use uuid::Uuid;

use super::event::SerializableEvent;

// ============================================================================
// Aggregate Root Pattern - Event Sourcing Core
// ============================================================================
//
// Key Principles:
// 1. State is derived from events (not stored directly)
// 2. Domain operations raise events; raising applies them and buffers them
//    as uncommitted until the repository persists them
// 3. `version` counts every event applied since construction
// 4. Replay starts from a bare instance built by a replay constructor, so
//    no creation side effects run twice
//
// ============================================================================

/// Generic Aggregate trait - all event-sourced aggregates implement this
///
/// Type Parameters:
/// - `Event`: The union of events this aggregate raises and replays
/// - `Error`: The error type for events that cannot be applied
pub trait Aggregate: Sized + Send + Sync {
    type Event: SerializableEvent;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Stable type tag, stored in commit headers and used for stream naming.
    fn aggregate_type() -> &'static str;

    fn id(&self) -> Uuid;

    /// Number of events applied since construction.
    fn version(&self) -> u64;

    /// Apply one event, advancing `version` by one.
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Events raised since the last successful save, oldest first.
    fn uncommitted_events(&self) -> &[Self::Event];

    fn clear_uncommitted_events(&mut self);

    /// Apply a batch of historical events in order.
    fn replay<'a, I>(&mut self, events: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = &'a Self::Event>,
        Self::Event: 'a,
    {
        for event in events {
            self.apply_event(event)?;
        }
        Ok(())
    }
}

/// Explicit capability to build a bare, zero-version instance for replay.
pub trait ReplayConstructor: Aggregate {
    fn replay_new() -> Self;
}

// ============================================================================
// Aggregate Factory
// ============================================================================

/// Why a factory could not produce a replay instance.
///
/// The repository adds the stream and aggregate type when it surfaces one.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("missing dependency `{0}`")]
    MissingDependency(&'static str),

    #[error("{0}")]
    Unavailable(String),
}

/// Produces the zero-version instance a replay starts from.
pub trait AggregateFactory<A: Aggregate>: Send + Sync {
    fn construct(&self) -> Result<A, ConstructionError>;
}

/// Factory backed by the aggregate's own `ReplayConstructor`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayFactory;

impl<A: ReplayConstructor> AggregateFactory<A> for ReplayFactory {
    fn construct(&self) -> Result<A, ConstructionError> {
        Ok(A::replay_new())
    }
}

/// Factory backed by a closure, for aggregates that need injected state.
pub struct FnFactory<F> {
    construct: F,
}

impl<F> FnFactory<F> {
    pub fn new(construct: F) -> Self {
        Self { construct }
    }
}

impl<F> fmt::Debug for FnFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory").finish_non_exhaustive()
    }
}

impl<A, F> AggregateFactory<A> for FnFactory<F>
where
    A: Aggregate,
    F: Fn() -> Result<A, ConstructionError> + Send + Sync,
{
    fn construct(&self) -> Result<A, ConstructionError> {
        (self.construct)()
    }
}
