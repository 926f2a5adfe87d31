use super::value_objects::OrderStatus;
use crate::event_sourcing::RepositoryError;
use crate::utils::IsTransient;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order already exists")]
    AlreadyCreated,

    #[error("Order is already cancelled")]
    AlreadyCancelled,

    #[error("Order is already confirmed")]
    AlreadyConfirmed,

    #[error("Order must be confirmed before shipping")]
    NotConfirmed,

    #[error("Order must be shipped before delivery")]
    NotShipped,

    #[error("Cannot modify order in status: {0:?}")]
    InvalidStatusTransition(OrderStatus),

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Aggregate not initialized")]
    NotInitialized,
}

// ============================================================================
// Command Handling Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("order rejected the command: {0}")]
    Rejected(#[from] OrderError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl IsTransient for CommandError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Rejected(_) => false,
            Self::Repository(err) => err.is_transient(),
        }
    }
}
