use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drink {
    pub slot: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl Drink {
    #[must_use]
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    /// Slots running this low get offered for a refill.
    #[must_use]
    pub fn needs_refill(&self) -> bool {
        self.quantity <= 3
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineBalance {
    pub coins: u32,
    pub cash: u32,
}

// GET /inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryResponse {
    pub drinks: Vec<Drink>,
    pub coins: u32,
    pub cash: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub coins: u32,
    pub cash: u32,
    pub total: u32,
}

// POST /buy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyRequest {
    pub slot: String,
    pub payment: Payment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub purchased_drink: Drink,
    pub change: f64,
}

// POST /refill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefillRequest {
    pub slot: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefillResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_quantity: Option<u32>,
}

/// Body the backend sends alongside a non-success status.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}
