// ============================================================================
// Event-Sourced Aggregate Repository
// ============================================================================
//
// - event_sourcing: aggregate contract, envelope codec, store client
//                   boundary and the paginated repository
// - domain:         the Order aggregate built on top of it
// - config:         page sizes, from defaults or the environment
// - metrics:        Prometheus counters for loads and saves
// - utils:          reload-and-retry on concurrency conflicts
//
// ============================================================================

pub mod config;
pub mod domain;
pub mod event_sourcing;
pub mod metrics;
pub mod utils;

pub use config::{ConfigError, RepositoryConfig};
pub use event_sourcing::{Repository, RepositoryError};
pub use metrics::RepositoryMetrics;
