use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::event_sourcing::core::{Aggregate, ReplayConstructor};
use super::value_objects::{OrderItem, OrderStatus};
use super::events::*;
use super::commands::OrderCommand;
use super::errors::OrderError;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// Commands are validated against current state and turned into events.
// Raising an event applies it and buffers it until the repository saves.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct OrderAggregate {
    // Identity
    id: Uuid,
    version: u64,

    // Current State (derived from events)
    pub customer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,

    // Audit Trail
    pub created_at: Option<DateTime<Utc>>,

    // Optional fields
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub cancelled_reason: Option<String>,

    uncommitted: Vec<OrderEvent>,
}

impl OrderAggregate {
    /// Start a new order, raising `OrderCreated`.
    pub fn create(
        order_id: Uuid,
        customer_id: Uuid,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        validate_items(&items)?;

        let mut order = Self::replay_new();
        order.raise(OrderEvent::Created(OrderCreated {
            order_id,
            customer_id,
            items,
            created_at: Utc::now(),
        }))?;
        Ok(order)
    }

    /// Validate `command` and raise the resulting events.
    pub fn execute(&mut self, command: &OrderCommand) -> Result<(), OrderError> {
        for event in self.handle_command(command)? {
            self.raise(event)?;
        }
        Ok(())
    }

    fn raise(&mut self, event: OrderEvent) -> Result<(), OrderError> {
        self.apply_event(&event)?;
        self.uncommitted.push(event);
        Ok(())
    }

    fn handle_command(&self, command: &OrderCommand) -> Result<Vec<OrderEvent>, OrderError> {
        if self.status == OrderStatus::Uninitialized {
            return match command {
                OrderCommand::CreateOrder { order_id, customer_id, items } => {
                    validate_items(items)?;
                    Ok(vec![OrderEvent::Created(OrderCreated {
                        order_id: *order_id,
                        customer_id: *customer_id,
                        items: items.clone(),
                        created_at: Utc::now(),
                    })])
                }
                _ => Err(OrderError::NotInitialized),
            };
        }

        match command {
            OrderCommand::CreateOrder { .. } => Err(OrderError::AlreadyCreated),

            OrderCommand::UpdateItems { items, reason } => {
                match self.status {
                    OrderStatus::Cancelled => return Err(OrderError::AlreadyCancelled),
                    OrderStatus::Created => {}
                    _ => return Err(OrderError::InvalidStatusTransition(self.status.clone())),
                }

                validate_items(items)?;

                Ok(vec![OrderEvent::ItemsUpdated(OrderItemsUpdated {
                    items: items.clone(),
                    reason: reason.clone(),
                })])
            }

            OrderCommand::ConfirmOrder => {
                match self.status {
                    OrderStatus::Created => {}
                    OrderStatus::Confirmed => return Err(OrderError::AlreadyConfirmed),
                    _ => return Err(OrderError::InvalidStatusTransition(self.status.clone())),
                }

                Ok(vec![OrderEvent::Confirmed(OrderConfirmed {
                    confirmed_at: Utc::now(),
                })])
            }

            OrderCommand::ShipOrder { tracking_number, carrier } => {
                match self.status {
                    OrderStatus::Confirmed => {}
                    OrderStatus::Created => return Err(OrderError::NotConfirmed),
                    _ => return Err(OrderError::InvalidStatusTransition(self.status.clone())),
                }

                Ok(vec![OrderEvent::Shipped(OrderShipped {
                    tracking_number: tracking_number.clone(),
                    carrier: carrier.clone(),
                    shipped_at: Utc::now(),
                })])
            }

            OrderCommand::DeliverOrder { signature } => {
                if self.status != OrderStatus::Shipped {
                    return Err(OrderError::NotShipped);
                }

                Ok(vec![OrderEvent::Delivered(OrderDelivered {
                    delivered_at: Utc::now(),
                    signature: signature.clone(),
                })])
            }

            OrderCommand::CancelOrder { reason, cancelled_by } => {
                if self.status == OrderStatus::Cancelled {
                    return Err(OrderError::AlreadyCancelled);
                }
                if !self.status.can_cancel() {
                    return Err(OrderError::InvalidStatusTransition(self.status.clone()));
                }

                Ok(vec![OrderEvent::Cancelled(OrderCancelled {
                    reason: reason.clone(),
                    cancelled_by: *cancelled_by,
                })])
            }
        }
    }
}

fn validate_items(items: &[OrderItem]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::EmptyItems);
    }

    for item in items {
        if item.quantity <= 0 {
            return Err(OrderError::InvalidQuantity(item.quantity));
        }
    }

    Ok(())
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderAggregate {
    type Event = OrderEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        let status = self.status.clone();
        match (event, status) {
            (OrderEvent::Created(e), OrderStatus::Uninitialized) => {
                self.id = e.order_id;
                self.customer_id = e.customer_id;
                self.items = e.items.clone();
                self.created_at = Some(e.created_at);
                self.status = OrderStatus::Created;
            }
            (OrderEvent::Created(_), _) => return Err(OrderError::AlreadyCreated),
            (_, OrderStatus::Uninitialized) => return Err(OrderError::NotInitialized),
            (OrderEvent::ItemsUpdated(e), _) => {
                self.items = e.items.clone();
            }
            (OrderEvent::Confirmed(_), _) => {
                self.status = OrderStatus::Confirmed;
            }
            (OrderEvent::Shipped(e), _) => {
                self.status = OrderStatus::Shipped;
                self.tracking_number = Some(e.tracking_number.clone());
                self.carrier = Some(e.carrier.clone());
            }
            (OrderEvent::Delivered(_), _) => {
                self.status = OrderStatus::Delivered;
            }
            (OrderEvent::Cancelled(e), _) => {
                self.status = OrderStatus::Cancelled;
                self.cancelled_reason = e.reason.clone();
            }
        }

        self.version += 1;
        Ok(())
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted.clear();
    }
}

impl ReplayConstructor for OrderAggregate {
    fn replay_new() -> Self {
        Self {
            id: Uuid::nil(),
            version: 0,
            customer_id: Uuid::nil(),
            items: Vec::new(),
            status: OrderStatus::Uninitialized,
            created_at: None,
            tracking_number: None,
            carrier: None,
            cancelled_reason: None,
            uncommitted: Vec::new(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<OrderItem> {
        vec![OrderItem {
            product_id: Uuid::new_v4(),
            quantity: 2,
        }]
    }

    fn new_order() -> OrderAggregate {
        OrderAggregate::create(Uuid::new_v4(), Uuid::new_v4(), items()).unwrap()
    }

    #[test]
    fn test_create_raises_created_event() {
        let order_id = Uuid::new_v4();
        let order = OrderAggregate::create(order_id, Uuid::new_v4(), items()).unwrap();

        assert_eq!(order.id(), order_id);
        assert_eq!(order.version(), 1);
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.uncommitted_events().len(), 1);
        assert!(matches!(order.uncommitted_events()[0], OrderEvent::Created(_)));
    }

    #[test]
    fn test_create_validates_items() {
        let err = OrderAggregate::create(Uuid::new_v4(), Uuid::new_v4(), vec![]).unwrap_err();
        assert!(matches!(err, OrderError::EmptyItems));

        let bad = vec![OrderItem {
            product_id: Uuid::new_v4(),
            quantity: 0,
        }];
        let err = OrderAggregate::create(Uuid::new_v4(), Uuid::new_v4(), bad).unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity(0)));
    }

    #[test]
    fn test_full_lifecycle() {
        let mut order = new_order();

        order.execute(&OrderCommand::ConfirmOrder).unwrap();
        order
            .execute(&OrderCommand::ShipOrder {
                tracking_number: "TRACK-123".to_string(),
                carrier: "UPS".to_string(),
            })
            .unwrap();
        order
            .execute(&OrderCommand::DeliverOrder { signature: None })
            .unwrap();

        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.version(), 4);
        assert_eq!(order.uncommitted_events().len(), 4);
        assert_eq!(order.tracking_number.as_deref(), Some("TRACK-123"));
    }

    #[test]
    fn test_rejected_command_raises_nothing() {
        let mut order = new_order();
        order.clear_uncommitted_events();

        let err = order
            .execute(&OrderCommand::DeliverOrder { signature: None })
            .unwrap_err();

        assert!(matches!(err, OrderError::NotShipped));
        assert_eq!(order.version(), 1);
        assert!(order.uncommitted_events().is_empty());
    }

    #[test]
    fn test_cannot_create_twice() {
        let mut order = new_order();
        let err = order
            .execute(&OrderCommand::CreateOrder {
                order_id: order.id(),
                customer_id: Uuid::new_v4(),
                items: items(),
            })
            .unwrap_err();
        assert!(matches!(err, OrderError::AlreadyCreated));
    }

    #[test]
    fn test_replay_rebuilds_state() {
        let mut original = new_order();
        original.execute(&OrderCommand::ConfirmOrder).unwrap();
        original
            .execute(&OrderCommand::CancelOrder {
                reason: Some("changed mind".to_string()),
                cancelled_by: None,
            })
            .unwrap();

        let mut replayed = OrderAggregate::replay_new();
        replayed.replay(original.uncommitted_events()).unwrap();

        assert_eq!(replayed.id(), original.id());
        assert_eq!(replayed.version(), 3);
        assert_eq!(replayed.status, OrderStatus::Cancelled);
        assert_eq!(replayed.cancelled_reason.as_deref(), Some("changed mind"));
        assert!(replayed.uncommitted_events().is_empty());
    }

    #[test]
    fn test_bare_instance_rejects_non_creation_events() {
        let mut bare = OrderAggregate::replay_new();
        let err = bare
            .apply_event(&OrderEvent::Confirmed(OrderConfirmed {
                confirmed_at: Utc::now(),
            }))
            .unwrap_err();

        assert!(matches!(err, OrderError::NotInitialized));
        assert_eq!(bare.version(), 0);
    }
}
