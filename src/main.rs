use anyhow::Context;
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use aggregate_repository::domain::order::{
    OrderAggregate, OrderCommand, OrderCommandHandler, OrderEvent, OrderItem,
};
use aggregate_repository::event_sourcing::{Aggregate, InMemoryStoreClient, Repository, StoreClient};
use aggregate_repository::{RepositoryConfig, RepositoryMetrics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,aggregate_repository=debug")),
        )
        .init();

    tracing::info!("🚀 Starting event-sourced repository demo");

    // === 1. Configuration and metrics ===
    let config = RepositoryConfig::from_env().context("failed to load repository configuration")?;
    let metrics = Arc::new(RepositoryMetrics::new().context("failed to create metrics registry")?);
    tracing::info!(
        read_page_size = config.read_page_size,
        write_page_size = config.write_page_size,
        "📊 Repository configured"
    );

    // === 2. Store client and repository ===
    let client: Arc<dyn StoreClient> = Arc::new(InMemoryStoreClient::new());
    let repository: Repository<OrderAggregate, dyn StoreClient> =
        Repository::new(client, OrderEvent::registry())
            .with_config(config)
            .with_metrics(metrics.clone());
    let handler = OrderCommandHandler::new(repository.clone());

    // === 3. Order lifecycle ===
    tracing::info!("📝 Demonstrating order lifecycle");
    let order_id = Uuid::now_v7();
    let commands = vec![
        OrderCommand::CreateOrder {
            order_id,
            customer_id: Uuid::new_v4(),
            items: vec![
                OrderItem {
                    product_id: Uuid::new_v4(),
                    quantity: 2,
                },
                OrderItem {
                    product_id: Uuid::new_v4(),
                    quantity: 1,
                },
            ],
        },
        OrderCommand::UpdateItems {
            items: vec![OrderItem {
                product_id: Uuid::new_v4(),
                quantity: 5,
            }],
            reason: Some("Customer changed basket".to_string()),
        },
        OrderCommand::ConfirmOrder,
        OrderCommand::ShipOrder {
            tracking_number: "TRACK-0001".to_string(),
            carrier: "DHL".to_string(),
        },
    ];

    for command in commands {
        let name = command.name();
        let version = handler
            .handle(order_id, command, Uuid::now_v7())
            .await
            .with_context(|| format!("{name} failed"))?;
        tracing::info!(order_id = %order_id, version = version, "✅ {name} applied");
    }

    // === 4. Historical view ===
    let confirmed = repository
        .get_by_id_at_version(order_id, 3)
        .await
        .context("failed to load order at version 3")?;
    tracing::info!(
        order_id = %order_id,
        version = confirmed.version(),
        status = ?confirmed.status,
        "🕰️ Order as of version 3"
    );

    // === 5. Concurrent loads of many orders ===
    let mut order_ids = Vec::new();
    for _ in 0..8 {
        let id = Uuid::now_v7();
        let mut order = OrderAggregate::create(
            id,
            Uuid::new_v4(),
            vec![OrderItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
            }],
        )?;
        repository.save(&mut order, Uuid::now_v7()).await?;
        order_ids.push(id);
    }

    let loaded = try_join_all(order_ids.iter().map(|id| repository.get_by_id(*id))).await?;
    tracing::info!(count = loaded.len(), "📦 Loaded orders concurrently");

    // === 6. Metrics ===
    println!("{}", metrics.render()?);

    tracing::info!("🎉 Demo complete!");
    Ok(())
}
