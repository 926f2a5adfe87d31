use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::event_sourcing::core::{DomainEvent, EventRegistry, SerializableEvent};
use super::value_objects::OrderItem;

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

/// Order Event - Union type for all order events
///
/// Stored untagged: the variant travels in the `EventTypeName` header and
/// the payload holds only the inner event's fields.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    Created(OrderCreated),
    ItemsUpdated(OrderItemsUpdated),
    Confirmed(OrderConfirmed),
    Shipped(OrderShipped),
    Delivered(OrderDelivered),
    Cancelled(OrderCancelled),
}

impl OrderEvent {
    /// Decoders for every order event type.
    pub fn registry() -> EventRegistry<Self> {
        EventRegistry::new()
            .register::<OrderCreated, _>(Self::Created)
            .register::<OrderItemsUpdated, _>(Self::ItemsUpdated)
            .register::<OrderConfirmed, _>(Self::Confirmed)
            .register::<OrderShipped, _>(Self::Shipped)
            .register::<OrderDelivered, _>(Self::Delivered)
            .register::<OrderCancelled, _>(Self::Cancelled)
    }
}

impl SerializableEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::Created(_) => OrderCreated::event_type(),
            Self::ItemsUpdated(_) => OrderItemsUpdated::event_type(),
            Self::Confirmed(_) => OrderConfirmed::event_type(),
            Self::Shipped(_) => OrderShipped::event_type(),
            Self::Delivered(_) => OrderDelivered::event_type(),
            Self::Cancelled(_) => OrderCancelled::event_type(),
        }
    }

    fn payload(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Self::Created(e) => serde_json::to_vec(e),
            Self::ItemsUpdated(e) => serde_json::to_vec(e),
            Self::Confirmed(e) => serde_json::to_vec(e),
            Self::Shipped(e) => serde_json::to_vec(e),
            Self::Delivered(e) => serde_json::to_vec(e),
            Self::Cancelled(e) => serde_json::to_vec(e),
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Order Created - Initial event in order lifecycle
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderCreated {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

impl DomainEvent for OrderCreated {
    fn event_type() -> &'static str { "OrderCreated" }
}

/// Order Items Updated - Order contents modified
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItemsUpdated {
    pub items: Vec<OrderItem>,
    pub reason: Option<String>,
}

impl DomainEvent for OrderItemsUpdated {
    fn event_type() -> &'static str { "OrderItemsUpdated" }
}

/// Order Cancelled - Order lifecycle ended
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderCancelled {
    pub reason: Option<String>,
    pub cancelled_by: Option<Uuid>,
}

impl DomainEvent for OrderCancelled {
    fn event_type() -> &'static str { "OrderCancelled" }
}

/// Order Confirmed - Order accepted for fulfillment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderConfirmed {
    pub confirmed_at: DateTime<Utc>,
}

impl DomainEvent for OrderConfirmed {
    fn event_type() -> &'static str { "OrderConfirmed" }
}

/// Order Shipped - Order dispatched to customer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderShipped {
    pub tracking_number: String,
    pub carrier: String,
    pub shipped_at: DateTime<Utc>,
}

impl DomainEvent for OrderShipped {
    fn event_type() -> &'static str { "OrderShipped" }
}

/// Order Delivered - Order successfully delivered
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderDelivered {
    pub delivered_at: DateTime<Utc>,
    pub signature: Option<String>,
}

impl DomainEvent for OrderDelivered {
    fn event_type() -> &'static str { "OrderDelivered" }
}

// ============================================================================
// Unit Tests
// ============================================================================
