use serde_json::Value;
use uuid::Uuid;

use super::core::{CommitHeaders, EventRegistry, Headers, SerializableEvent, EVENT_TYPE_HEADER};
use super::store::EventData;

// ============================================================================
// Event Envelope Codec
// ============================================================================
//
// payload  = the event's field data as JSON
// metadata = the commit headers plus `EventTypeName`, as a JSON object
//
// Decoding only relies on `EventTypeName`; any other metadata keys are
// carried through untouched so newer writers never break older readers.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("event metadata is not valid JSON: {0}")]
    InvalidMetadata(#[source] serde_json::Error),

    #[error("event metadata is not a JSON object")]
    MetadataNotAnObject,

    #[error("event metadata has no string `EventTypeName` header")]
    MissingEventType,

    #[error("no event type registered for tag `{0}`")]
    UnknownEventType(String),

    #[error("payload of `{event_type}` could not be deserialized: {source}")]
    InvalidPayload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("event `{event_type}` could not be serialized: {source}")]
pub struct EncodeError {
    pub event_type: String,
    #[source]
    pub source: serde_json::Error,
}

/// Encode one event with the commit headers into a store-ready envelope.
///
/// Each call stamps a fresh event id.
pub fn encode_event<E: SerializableEvent>(
    event: &E,
    headers: &CommitHeaders,
) -> Result<EventData, EncodeError> {
    let event_type = event.event_type();
    let encode_error = |source| EncodeError {
        event_type: event_type.to_string(),
        source,
    };

    let payload = event.payload().map_err(encode_error)?;
    let metadata = serde_json::to_vec(&headers.for_event(event_type)).map_err(encode_error)?;

    Ok(EventData {
        event_id: Uuid::new_v4(),
        event_type: event_type.to_string(),
        payload,
        metadata,
    })
}

/// Decode a stored envelope back into the aggregate's event type.
pub fn decode_event<E: 'static>(
    registry: &EventRegistry<E>,
    metadata: &[u8],
    payload: &[u8],
) -> Result<E, DecodeError> {
    let headers = decode_headers(metadata)?;
    let event_type = headers
        .get(EVENT_TYPE_HEADER)
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingEventType)?;

    registry.decode(event_type, payload)
}

/// Recover the full header map (commit id, type tags, custom headers).
pub fn decode_headers(metadata: &[u8]) -> Result<Headers, DecodeError> {
    match serde_json::from_slice::<Value>(metadata).map_err(DecodeError::InvalidMetadata)? {
        Value::Object(headers) => Ok(headers),
        _ => Err(DecodeError::MetadataNotAnObject),
    }
}

// ============================================================================
// Tests
// ============================================================================
