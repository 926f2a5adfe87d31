use uuid::Uuid;

use super::codec::{DecodeError, EncodeError};
use super::core::ConstructionError;
use super::store::{describe_version, ExpectedVersion, StoreError};
use crate::config::ConfigError;
use crate::utils::IsTransient;

// ============================================================================
// Repository Errors
// ============================================================================
//
// Store failures map one-to-one: not-found / deleted / wrong-expected-version
// get their own variants, everything else passes through as `Store`.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{aggregate_type} {id} not found")]
    AggregateNotFound {
        id: Uuid,
        aggregate_type: &'static str,
    },

    #[error("{aggregate_type} {id} has been deleted")]
    AggregateDeleted {
        id: Uuid,
        aggregate_type: &'static str,
    },

    #[error("{aggregate_type} {id} has no version {requested} (replay reached version {actual})")]
    VersionNotFound {
        id: Uuid,
        aggregate_type: &'static str,
        requested: u64,
        actual: u64,
    },

    #[error(
        "concurrency conflict on stream `{stream}`: expected {expected}, current {}",
        describe_version(.actual)
    )]
    ConcurrencyConflict {
        stream: String,
        expected: ExpectedVersion,
        actual: Option<u64>,
    },

    #[error("failed to decode {aggregate_type} event at `{stream}`@{position}: {source}")]
    Decode {
        stream: String,
        aggregate_type: &'static str,
        position: u64,
        #[source]
        source: DecodeError,
    },

    #[error("failed to apply {aggregate_type} event at `{stream}`@{position}: {source}")]
    Apply {
        stream: String,
        aggregate_type: &'static str,
        position: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to encode {aggregate_type} event for `{stream}`: {source}")]
    Encode {
        stream: String,
        aggregate_type: &'static str,
        #[source]
        source: EncodeError,
    },

    #[error("failed to construct {aggregate_type} for replay of `{stream}`: {source}")]
    Construction {
        stream: String,
        aggregate_type: &'static str,
        #[source]
        source: ConstructionError,
    },

    #[error("invalid repository configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("store returned no progress reading `{stream}` at position {position}")]
    StalledRead { stream: String, position: u64 },

    #[error("event store error: {0}")]
    Store(#[from] StoreError),
}

impl RepositoryError {
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AggregateNotFound { .. } | Self::AggregateDeleted { .. }
        )
    }
}

/// Only conflicts are worth a reload-and-retry; everything else is permanent.
impl IsTransient for RepositoryError {
    fn is_transient(&self) -> bool {
        self.is_concurrency_conflict()
    }
}
