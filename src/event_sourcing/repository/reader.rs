use uuid::Uuid;

use crate::event_sourcing::codec::decode_event;
use crate::event_sourcing::core::{Aggregate, EventRegistry};
use crate::event_sourcing::error::RepositoryError;
use crate::event_sourcing::store::{StoreClient, StoreError, FIRST_EVENT_POSITION};
use crate::metrics::RepositoryMetrics;

// ============================================================================
// Paginated Reader
// ============================================================================
//
// Replays a stream forward in pages of at most `page_size` events, starting
// at position 1. With a target version, every request is clamped so no
// event past the target is ever fetched, and the loop stops once the cursor
// passes the target.
//
// A stream holding only its creation marker replays to version 0. Only the
// store's `StreamNotFound` means the aggregate does not exist.
//
// ============================================================================

pub(super) struct StreamReader<'a, A: Aggregate, C: ?Sized> {
    pub client: &'a C,
    pub registry: &'a EventRegistry<A::Event>,
    pub metrics: Option<&'a RepositoryMetrics>,
    pub stream: &'a str,
    pub id: Uuid,
    pub page_size: u64,
}

impl<A, C> StreamReader<'_, A, C>
where
    A: Aggregate,
    C: StoreClient + ?Sized,
{
    /// Apply every event up to `target` (or the end of the stream) to `aggregate`.
    pub async fn replay_into(
        &self,
        aggregate: &mut A,
        target: Option<u64>,
    ) -> Result<(), RepositoryError> {
        let mut next = FIRST_EVENT_POSITION;
        let mut pages = 0u64;

        loop {
            let count = match target {
                Some(version) => self.page_size.min(version - next + 1),
                None => self.page_size,
            };

            let slice = self
                .client
                .read_stream_forward(self.stream, next, count, false)
                .await
                .map_err(|err| self.map_read_error(err))?;

            pages += 1;
            if let Some(metrics) = self.metrics {
                metrics.record_page_read(slice.events.len());
            }
            tracing::debug!(
                stream = %self.stream,
                from = next,
                requested = count,
                received = slice.events.len(),
                end_of_stream = slice.is_end_of_stream,
                "Read stream page"
            );

            for recorded in &slice.events {
                if recorded.position < FIRST_EVENT_POSITION {
                    continue;
                }
                if target.is_some_and(|version| recorded.position > version) {
                    break;
                }

                let event = decode_event(self.registry, &recorded.metadata, &recorded.payload)
                    .map_err(|source| RepositoryError::Decode {
                        stream: self.stream.to_string(),
                        aggregate_type: A::aggregate_type(),
                        position: recorded.position,
                        source,
                    })?;

                aggregate
                    .apply_event(&event)
                    .map_err(|source| RepositoryError::Apply {
                        stream: self.stream.to_string(),
                        aggregate_type: A::aggregate_type(),
                        position: recorded.position,
                        source: Box::new(source),
                    })?;
            }

            if slice.is_end_of_stream {
                break;
            }
            if slice.next_position <= next {
                return Err(RepositoryError::StalledRead {
                    stream: self.stream.to_string(),
                    position: next,
                });
            }
            next = slice.next_position;
            if target.is_some_and(|version| next > version) {
                break;
            }
        }

        if let Some(version) = target {
            if aggregate.version() != version {
                return Err(RepositoryError::VersionNotFound {
                    id: self.id,
                    aggregate_type: A::aggregate_type(),
                    requested: version,
                    actual: aggregate.version(),
                });
            }
        }

        tracing::debug!(
            stream = %self.stream,
            version = aggregate.version(),
            pages = pages,
            "Replay finished"
        );
        Ok(())
    }

    fn map_read_error(&self, err: StoreError) -> RepositoryError {
        match err {
            StoreError::StreamNotFound { .. } => RepositoryError::AggregateNotFound {
                id: self.id,
                aggregate_type: A::aggregate_type(),
            },
            StoreError::StreamDeleted { .. } => RepositoryError::AggregateDeleted {
                id: self.id,
                aggregate_type: A::aggregate_type(),
            },
            other => RepositoryError::Store(other),
        }
    }
}
