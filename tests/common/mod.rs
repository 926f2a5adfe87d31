#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use aggregate_repository::event_sourcing::{
    Aggregate, DomainEvent, EventRegistry, InMemoryStoreClient, ReplayConstructor, Repository,
    SerializableEvent,
};
use aggregate_repository::RepositoryConfig;

// ============================================================================
// Test Aggregate
// ============================================================================
//
// Raises one `TestAggregateCreated` on construction, then any number of
// `SomethingHappened`. `applied_event_count` counts only the latter, so an
// aggregate loaded at version V reports V - 1.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TestAggregateCreated {
    pub id: Uuid,
}

impl DomainEvent for TestAggregateCreated {
    fn event_type() -> &'static str {
        "TestAggregateCreated"
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SomethingHappened {
    pub sequence: u64,
    pub note: String,
}

impl DomainEvent for SomethingHappened {
    fn event_type() -> &'static str {
        "SomethingHappened"
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TestEvent {
    Created(TestAggregateCreated),
    Happened(SomethingHappened),
}

impl SerializableEvent for TestEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::Created(_) => TestAggregateCreated::event_type(),
            Self::Happened(_) => SomethingHappened::event_type(),
        }
    }

    fn payload(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Self::Created(e) => serde_json::to_vec(e),
            Self::Happened(e) => serde_json::to_vec(e),
        }
    }
}

pub fn registry() -> EventRegistry<TestEvent> {
    EventRegistry::new()
        .register::<TestAggregateCreated, _>(TestEvent::Created)
        .register::<SomethingHappened, _>(TestEvent::Happened)
}

#[derive(Debug, thiserror::Error)]
pub enum TestAggregateError {
    #[error("event applied before the aggregate was created")]
    NotCreated,
    #[error("aggregate created twice")]
    CreatedTwice,
    #[error("expected sequence {expected}, got {actual}")]
    OutOfOrder { expected: u64, actual: u64 },
}

#[derive(Debug, Clone)]
pub struct TestAggregate {
    id: Uuid,
    created: bool,
    version: u64,
    applied_event_count: u64,
    pending: Vec<TestEvent>,
}

impl TestAggregate {
    pub fn create(id: Uuid) -> Self {
        let mut aggregate = Self::replay_new();
        aggregate.raise(TestEvent::Created(TestAggregateCreated { id }));
        aggregate
    }

    /// Raise `count` more `SomethingHappened` events.
    pub fn produce_events(&mut self, count: u64) {
        for _ in 0..count {
            let sequence = self.applied_event_count + 1;
            self.raise(TestEvent::Happened(SomethingHappened {
                sequence,
                note: format!("event #{sequence}"),
            }));
        }
    }

    pub fn applied_event_count(&self) -> u64 {
        self.applied_event_count
    }

    fn raise(&mut self, event: TestEvent) {
        self.apply_event(&event)
            .expect("raised events always apply to a live aggregate");
        self.pending.push(event);
    }
}

impl Aggregate for TestAggregate {
    type Event = TestEvent;
    type Error = TestAggregateError;

    fn aggregate_type() -> &'static str {
        "TestAggregate"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply_event(&mut self, event: &TestEvent) -> Result<(), TestAggregateError> {
        match event {
            TestEvent::Created(_) if self.created => return Err(TestAggregateError::CreatedTwice),
            TestEvent::Created(e) => {
                self.id = e.id;
                self.created = true;
            }
            TestEvent::Happened(_) if !self.created => return Err(TestAggregateError::NotCreated),
            TestEvent::Happened(e) => {
                let expected = self.applied_event_count + 1;
                if e.sequence != expected {
                    return Err(TestAggregateError::OutOfOrder {
                        expected,
                        actual: e.sequence,
                    });
                }
                self.applied_event_count += 1;
            }
        }
        self.version += 1;
        Ok(())
    }

    fn uncommitted_events(&self) -> &[TestEvent] {
        &self.pending
    }

    fn clear_uncommitted_events(&mut self) {
        self.pending.clear();
    }
}

impl ReplayConstructor for TestAggregate {
    fn replay_new() -> Self {
        Self {
            id: Uuid::nil(),
            created: false,
            version: 0,
            applied_event_count: 0,
            pending: Vec::new(),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn repository(client: &InMemoryStoreClient) -> Repository<TestAggregate, InMemoryStoreClient> {
    Repository::new(Arc::new(client.clone()), registry())
}

pub fn repository_with(
    client: &InMemoryStoreClient,
    config: RepositoryConfig,
) -> Repository<TestAggregate, InMemoryStoreClient> {
    repository(client).with_config(config)
}

/// Create an aggregate with `happened` events after its creation event and save it.
pub async fn seed(
    repository: &Repository<TestAggregate, InMemoryStoreClient>,
    happened: u64,
) -> Uuid {
    let id = Uuid::new_v4();
    let mut aggregate = TestAggregate::create(id);
    aggregate.produce_events(happened);
    repository
        .save(&mut aggregate, Uuid::new_v4())
        .await
        .expect("seeding save");
    id
}
