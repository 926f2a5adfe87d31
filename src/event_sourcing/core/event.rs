use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::event_sourcing::codec::DecodeError;

// ============================================================================
// Domain Event Traits
// ============================================================================
//
// Individual event structs implement `DomainEvent` and carry a stable type
// tag. The per-aggregate union enum implements `SerializableEvent` so the
// codec can pick the tag and payload of whichever variant it holds.
//
// ============================================================================

/// A single concrete event type with a stable, stored type tag.
pub trait DomainEvent: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn event_type() -> &'static str
    where
        Self: Sized;
}

/// The union of events an aggregate can raise.
///
/// `event_type` must return the tag the matching `DomainEvent` registers
/// under, otherwise stored events cannot be resolved on replay.
pub trait SerializableEvent: Clone + Send + Sync + 'static {
    fn event_type(&self) -> &'static str;

    /// Serialize the variant's field data (without the tag).
    fn payload(&self) -> serde_json::Result<Vec<u8>>;
}

// ============================================================================
// Event Registry - explicit tag → decoder mapping
// ============================================================================

type DecodeFn<E> = Box<dyn Fn(&[u8]) -> serde_json::Result<E> + Send + Sync>;

/// Resolves stored type tags to decoders for the union event type `E`.
///
/// Populated once at startup by the host application:
///
/// ```ignore
/// let registry = EventRegistry::new()
///     .register::<OrderCreated, _>(OrderEvent::Created)
///     .register::<OrderConfirmed, _>(OrderEvent::Confirmed);
/// ```
pub struct EventRegistry<E> {
    decoders: HashMap<&'static str, DecodeFn<E>>,
}

impl<E: 'static> EventRegistry<E> {
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register `T` under `T::event_type()`, wrapping decoded values with `wrap`.
    ///
    /// Registering the same tag twice keeps the latest decoder.
    pub fn register<T, F>(mut self, wrap: F) -> Self
    where
        T: DomainEvent + 'static,
        F: Fn(T) -> E + Send + Sync + 'static,
    {
        let tag = T::event_type();
        let decoder: DecodeFn<E> =
            Box::new(move |payload: &[u8]| serde_json::from_slice::<T>(payload).map(&wrap));

        if self.decoders.insert(tag, decoder).is_some() {
            tracing::warn!(event_type = tag, "Event type registered twice, keeping latest decoder");
        }
        self
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.decoders.contains_key(event_type)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Registered tags, sorted.
    pub fn event_types(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.decoders.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    pub(crate) fn decode(&self, event_type: &str, payload: &[u8]) -> Result<E, DecodeError> {
        let decoder = self
            .decoders
            .get(event_type)
            .ok_or_else(|| DecodeError::UnknownEventType(event_type.to_string()))?;

        decoder(payload).map_err(|source| DecodeError::InvalidPayload {
            event_type: event_type.to_string(),
            source,
        })
    }
}

impl<E: 'static> Default for EventRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.decoders.keys().collect();
        tags.sort_unstable();
        f.debug_struct("EventRegistry")
            .field("event_types", &tags)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
