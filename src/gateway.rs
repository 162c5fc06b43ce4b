use crate::models::{InventoryResponse, Payment, PurchaseResponse, RefillResponse};
use async_trait::async_trait;
use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchInventory,
    Buy,
    Refill,
}

impl Operation {
    fn action(self) -> &'static str {
        match self {
            Operation::FetchInventory => "fetch inventory",
            Operation::Buy => "buy drink",
            Operation::Refill => "refill drink",
        }
    }

    fn failure(self) -> &'static str {
        match self {
            Operation::FetchInventory => "Failed to fetch inventory",
            Operation::Buy => "Purchase failed",
            Operation::Refill => "Failed to refill drink",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No base URL was configured, nothing was sent.
    Configuration(Operation),
    /// The backend answered with a non-success status, or could not be reached or understood.
    Remote {
        operation: Operation,
        message: String,
    },
}

impl GatewayError {
    pub fn remote(operation: Operation, message: impl Into<String>) -> Self {
        GatewayError::Remote {
            operation,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            GatewayError::Configuration(operation) => *operation,
            GatewayError::Remote { operation, .. } => *operation,
        }
    }
}

impl Error for GatewayError {}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GatewayError::Configuration(operation) => write!(
                f,
                "API Base URL is not configured. Cannot {}.",
                operation.action()
            ),
            GatewayError::Remote { operation, message } => {
                write!(f, "{}: {message}", operation.failure())
            }
        }
    }
}

/// The remote inventory service. Implementations hold no state between calls.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    async fn fetch_inventory(&self) -> Result<InventoryResponse, GatewayError>;
    async fn buy_drink(
        &self,
        slot: &str,
        payment: Payment,
    ) -> Result<PurchaseResponse, GatewayError>;
    async fn refill_drink(&self, slot: &str) -> Result<RefillResponse, GatewayError>;
}

pub mod client;
