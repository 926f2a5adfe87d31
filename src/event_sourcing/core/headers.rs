use serde_json::{Map, Value};
use uuid::Uuid;

// ============================================================================
// Commit Headers
// ============================================================================
//
// Every event written by one `save` call carries the same header map. The
// repository seeds it with the commit id and aggregate type; callers may add
// their own headers through the mutation hook but can never replace or remove
// the reserved ones.
//
// ============================================================================

pub const COMMIT_ID_HEADER: &str = "CommitId";
pub const AGGREGATE_TYPE_HEADER: &str = "AggregateTypeName";
pub const EVENT_TYPE_HEADER: &str = "EventTypeName";

const RESERVED_HEADERS: [&str; 3] = [COMMIT_ID_HEADER, AGGREGATE_TYPE_HEADER, EVENT_TYPE_HEADER];

/// Header map as stored in event metadata.
pub type Headers = Map<String, Value>;

/// Headers shared by all events of a single commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitHeaders {
    headers: Headers,
}

impl CommitHeaders {
    pub fn new(commit_id: Uuid, aggregate_type: &str) -> Self {
        let mut headers = Headers::new();
        headers.insert(COMMIT_ID_HEADER.to_string(), Value::String(commit_id.to_string()));
        headers.insert(
            AGGREGATE_TYPE_HEADER.to_string(),
            Value::String(aggregate_type.to_string()),
        );
        Self { headers }
    }

    pub fn is_reserved(key: &str) -> bool {
        RESERVED_HEADERS.contains(&key)
    }

    /// Add or replace a custom header.
    ///
    /// Returns `false` and leaves the map untouched when `key` is reserved.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if Self::is_reserved(&key) {
            tracing::warn!(header = %key, "Refusing to overwrite reserved commit header");
            return false;
        }
        self.headers.insert(key, value.into());
        true
    }

    /// Remove a custom header. Reserved headers cannot be removed.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if Self::is_reserved(key) {
            tracing::warn!(header = %key, "Refusing to remove reserved commit header");
            return None;
        }
        self.headers.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.headers.get(key)
    }

    pub fn commit_id(&self) -> Option<Uuid> {
        self.headers
            .get(COMMIT_ID_HEADER)
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn as_map(&self) -> &Headers {
        &self.headers
    }

    /// The commit headers merged with one event's type tag.
    pub(crate) fn for_event(&self, event_type: &str) -> Headers {
        let mut headers = self.headers.clone();
        headers.insert(
            EVENT_TYPE_HEADER.to_string(),
            Value::String(event_type.to_string()),
        );
        headers
    }
}
