use uuid::Uuid;

use crate::event_sourcing::{CommitHeaders, Repository, StoreClient};
use crate::utils::{retry_on_transient, RetryConfig};

use super::aggregate::OrderAggregate;
use super::commands::OrderCommand;
use super::errors::CommandError;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Repository
//
// Commands against existing orders run as load → execute → save, and the
// whole cycle is retried on concurrency conflicts.
//
// ============================================================================

pub const COMMAND_HEADER: &str = "Command";

pub struct OrderCommandHandler<C: StoreClient + ?Sized> {
    repository: Repository<OrderAggregate, C>,
    retry: RetryConfig,
}

impl<C: StoreClient + ?Sized> OrderCommandHandler<C> {
    pub fn new(repository: Repository<OrderAggregate, C>) -> Self {
        Self {
            repository,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn repository(&self) -> &Repository<OrderAggregate, C> {
        &self.repository
    }

    /// Handle a command and persist resulting events
    ///
    /// Returns the order's stream version after the save.
    pub async fn handle(
        &self,
        aggregate_id: Uuid,
        command: OrderCommand,
        commit_id: Uuid,
    ) -> Result<u64, CommandError> {
        tracing::debug!(
            aggregate_id = %aggregate_id,
            command = command.name(),
            "Handling order command"
        );

        if let OrderCommand::CreateOrder { customer_id, items, .. } = &command {
            let mut order = OrderAggregate::create(aggregate_id, *customer_id, items.clone())?;
            let version = self
                .repository
                .save_with_headers(&mut order, commit_id, stamp(&command))
                .await?;
            return Ok(version);
        }

        let command = &command;
        retry_on_transient(self.retry.clone(), |attempt| async move {
            let mut order = self.repository.get_by_id(aggregate_id).await?;
            order.execute(command)?;

            if attempt > 1 {
                tracing::info!(
                    aggregate_id = %aggregate_id,
                    attempt = attempt,
                    "Re-applied command on reloaded order"
                );
            }

            let version = self
                .repository
                .save_with_headers(&mut order, commit_id, stamp(command))
                .await?;
            Ok::<_, CommandError>(version)
        })
        .await
        .into_result()
    }
}

fn stamp(command: &OrderCommand) -> impl FnOnce(&mut CommitHeaders) + Send {
    let name = command.name();
    move |headers| {
        headers.insert(COMMAND_HEADER, name);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
