use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::codec::encode_event;
use super::core::{
    Aggregate, AggregateFactory, CommitHeaders, EventRegistry, ReplayConstructor, ReplayFactory,
};
use super::error::RepositoryError;
use super::store::{EventData, StoreClient, StoreError};
use crate::config::RepositoryConfig;
use crate::metrics::RepositoryMetrics;

mod naming;
mod reader;
mod writer;

pub use naming::{default_naming, default_stream_name, StreamNaming};
pub use writer::{expected_version_for, WritePath};

use reader::StreamReader;

// ============================================================================
// Aggregate Repository
// ============================================================================
//
// Loads aggregates by replaying their stream and saves their uncommitted
// events under optimistic concurrency.
//
// Type Parameters:
// - `A`: The aggregate type
// - `C`: The store client (may be `dyn StoreClient`)
//
// The repository holds no mutable state. Clones share the client, registry
// and factory, so one instance can serve many concurrent loads and saves.
//
// ============================================================================

pub struct Repository<A: Aggregate, C: StoreClient + ?Sized> {
    client: Arc<C>,
    registry: Arc<EventRegistry<A::Event>>,
    factory: Arc<dyn AggregateFactory<A>>,
    config: RepositoryConfig,
    naming: StreamNaming,
    metrics: Option<Arc<RepositoryMetrics>>,
}

impl<A, C> Repository<A, C>
where
    A: ReplayConstructor,
    C: StoreClient + ?Sized,
{
    /// Repository replaying through `A::replay_new()`.
    pub fn new(client: Arc<C>, registry: EventRegistry<A::Event>) -> Self {
        Self::with_factory(client, registry, ReplayFactory)
    }
}

impl<A, C> Repository<A, C>
where
    A: Aggregate,
    C: StoreClient + ?Sized,
{
    pub fn with_factory<F>(client: Arc<C>, registry: EventRegistry<A::Event>, factory: F) -> Self
    where
        F: AggregateFactory<A> + 'static,
    {
        Self {
            client,
            registry: Arc::new(registry),
            factory: Arc::new(factory),
            config: RepositoryConfig::default(),
            naming: naming::default_naming(),
            metrics: None,
        }
    }

    /// Page sizes are checked before every load and save; an invalid config
    /// fails each call with `InvalidConfig` before the store is touched.
    pub fn with_config(mut self, config: RepositoryConfig) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "Repository configured with invalid page sizes");
        }
        self.config = config;
        self
    }

    pub fn with_stream_naming(mut self, naming: StreamNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<RepositoryMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn stream_name(&self, id: Uuid) -> String {
        (self.naming)(A::aggregate_type(), id)
    }

    /// Reconstruct the aggregate from its full stream.
    pub async fn get_by_id(&self, id: Uuid) -> Result<A, RepositoryError> {
        self.load(id, None).await
    }

    /// Reconstruct the aggregate as it was after the event at `version`.
    ///
    /// Version 0 is the stream-creation marker and never names an aggregate
    /// state, so it is rejected with `VersionNotFound`.
    pub async fn get_by_id_at_version(&self, id: Uuid, version: u64) -> Result<A, RepositoryError> {
        if version == 0 {
            return Err(RepositoryError::VersionNotFound {
                id,
                aggregate_type: A::aggregate_type(),
                requested: 0,
                actual: 0,
            });
        }
        self.load(id, Some(version)).await
    }

    async fn load(&self, id: Uuid, target: Option<u64>) -> Result<A, RepositoryError> {
        self.config.validate()?;
        let started = Instant::now();
        let stream = self.stream_name(id);
        let mut aggregate = self
            .factory
            .construct()
            .map_err(|source| RepositoryError::Construction {
                stream: stream.clone(),
                aggregate_type: A::aggregate_type(),
                source,
            })?;

        let reader: StreamReader<'_, A, C> = StreamReader {
            client: self.client.as_ref(),
            registry: self.registry.as_ref(),
            metrics: self.metrics.as_deref(),
            stream: &stream,
            id,
            page_size: self.config.read_page_size,
        };
        reader.replay_into(&mut aggregate, target).await?;

        if let Some(metrics) = &self.metrics {
            metrics.observe_load(started.elapsed());
        }
        tracing::info!(
            stream = %stream,
            aggregate_type = A::aggregate_type(),
            version = aggregate.version(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Loaded aggregate"
        );

        Ok(aggregate)
    }

    /// Persist the aggregate's uncommitted events under `commit_id`.
    ///
    /// Returns the stream version after the save.
    pub async fn save(&self, aggregate: &mut A, commit_id: Uuid) -> Result<u64, RepositoryError> {
        self.save_with_headers(aggregate, commit_id, |_| {}).await
    }

    /// Like `save`, letting `update_headers` add custom headers to the commit.
    ///
    /// `CommitId` and `AggregateTypeName` cannot be overwritten or removed.
    /// On a concurrency conflict the uncommitted events stay buffered and
    /// the caller must reload before retrying.
    pub async fn save_with_headers<F>(
        &self,
        aggregate: &mut A,
        commit_id: Uuid,
        update_headers: F,
    ) -> Result<u64, RepositoryError>
    where
        F: FnOnce(&mut CommitHeaders) + Send,
    {
        self.config.validate()?;

        let pending_count = aggregate.uncommitted_events().len();
        if pending_count == 0 {
            tracing::debug!(
                aggregate_id = %aggregate.id(),
                aggregate_type = A::aggregate_type(),
                "Nothing to save"
            );
            return Ok(aggregate.version());
        }

        let stream = self.stream_name(aggregate.id());

        let mut headers = CommitHeaders::new(commit_id, A::aggregate_type());
        update_headers(&mut headers);

        let events = aggregate
            .uncommitted_events()
            .iter()
            .map(|event| encode_event(event, &headers))
            .collect::<Result<Vec<EventData>, _>>()
            .map_err(|source| RepositoryError::Encode {
                stream: stream.clone(),
                aggregate_type: A::aggregate_type(),
                source,
            })?;

        let expected = expected_version_for(aggregate.version(), pending_count);

        let (path, result) = match writer::write_events(
            self.client.as_ref(),
            &stream,
            expected,
            events,
            self.config.write_page_size,
        )
        .await
        {
            Ok(written) => written,
            Err(StoreError::WrongExpectedVersion {
                stream,
                expected,
                current,
            }) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_conflict();
                }
                tracing::warn!(
                    stream = %stream,
                    expected = %expected,
                    current = ?current,
                    pending = pending_count,
                    "⚠️ Concurrency conflict, uncommitted events kept"
                );
                return Err(RepositoryError::ConcurrencyConflict {
                    stream,
                    expected,
                    actual: current,
                });
            }
            Err(StoreError::StreamDeleted { .. }) => {
                return Err(RepositoryError::AggregateDeleted {
                    id: aggregate.id(),
                    aggregate_type: A::aggregate_type(),
                });
            }
            Err(other) => return Err(other.into()),
        };

        aggregate.clear_uncommitted_events();

        if let Some(metrics) = &self.metrics {
            metrics.record_save(path.as_str(), pending_count);
        }
        tracing::info!(
            stream = %stream,
            commit_id = %commit_id,
            path = %path,
            event_count = pending_count,
            new_version = result.next_expected_version,
            "✅ Saved aggregate"
        );

        Ok(result.next_expected_version)
    }
}

impl<A, C> Clone for Repository<A, C>
where
    A: Aggregate,
    C: StoreClient + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            registry: Arc::clone(&self.registry),
            factory: Arc::clone(&self.factory),
            config: self.config,
            naming: Arc::clone(&self.naming),
            metrics: self.metrics.clone(),
        }
    }
}
