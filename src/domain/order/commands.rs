use uuid::Uuid;
use super::value_objects::OrderItem;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    CreateOrder {
        order_id: Uuid,
        customer_id: Uuid,
        items: Vec<OrderItem>,
    },
    UpdateItems {
        items: Vec<OrderItem>,
        reason: Option<String>,
    },
    ConfirmOrder,
    ShipOrder {
        tracking_number: String,
        carrier: String,
    },
    DeliverOrder {
        signature: Option<String>,
    },
    CancelOrder {
        reason: Option<String>,
        cancelled_by: Option<Uuid>,
    },
}

impl OrderCommand {
    /// Short name, stamped as the `Command` commit header.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateOrder { .. } => "CreateOrder",
            Self::UpdateItems { .. } => "UpdateItems",
            Self::ConfirmOrder => "ConfirmOrder",
            Self::ShipOrder { .. } => "ShipOrder",
            Self::DeliverOrder { .. } => "DeliverOrder",
            Self::CancelOrder { .. } => "CancelOrder",
        }
    }
}
