use std::sync::Arc;
use uuid::Uuid;

/// Maps `(aggregate type, id)` to a stream name. Must be pure and stable
/// across restarts, since stored streams are found through it.
pub type StreamNaming = Arc<dyn Fn(&str, Uuid) -> String + Send + Sync>;

/// `Order` + `3f2a…` → `order-3f2a…` (id as 32 hex digits, no hyphens).
pub fn default_stream_name(aggregate_type: &str, id: Uuid) -> String {
    let mut chars = aggregate_type.chars();
    let prefix: String = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{prefix}-{}", id.simple())
}

pub fn default_naming() -> StreamNaming {
    Arc::new(default_stream_name)
}
