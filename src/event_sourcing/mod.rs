// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic, reusable event sourcing infrastructure.
// Domain-specific code is in src/domain/
//
// ============================================================================

// Core abstractions (GENERIC - works with any aggregate)
pub mod codec;
pub mod core;
pub mod error;
pub mod repository;
pub mod store;

// Re-export core infrastructure
pub use codec::{decode_event, decode_headers, encode_event, DecodeError, EncodeError};
pub use self::core::*;
pub use error::RepositoryError;
pub use repository::{
    default_stream_name, expected_version_for, Repository, StreamNaming, WritePath,
};
pub use store::*;
