use super::{GatewayError, InventoryGateway, Operation};
use crate::models::{
    BuyRequest, ErrorResponse, InventoryResponse, Payment, PurchaseResponse, RefillRequest,
    RefillResponse,
};
use async_trait::async_trait;
use log::{debug, error};
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct HttpGateway {
    http_client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpGateway {
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        HttpGateway {
            http_client: reqwest::Client::new(),
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    fn endpoint(&self, operation: Operation, path: &str) -> Result<String, GatewayError> {
        match &self.base_url {
            Some(base_url) if !base_url.is_empty() => Ok(format!("{base_url}/{path}")),
            _ => {
                error!("Refusing to {:?}, no API base URL configured", operation);
                Err(GatewayError::Configuration(operation))
            }
        }
    }
}

async fn read_response<T: DeserializeOwned>(
    operation: Operation,
    res: Result<reqwest::Response, reqwest::Error>,
) -> Result<T, GatewayError> {
    let response = res.map_err(|e| {
        error!("Error in {:?} call: {}", operation, e);
        GatewayError::remote(operation, e.to_string())
    })?;

    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(|e| {
            error!("Malformed {:?} response: {}", operation, e);
            GatewayError::remote(operation, e.to_string())
        });
    }

    // The body is optional on failures, and may not even be JSON
    let message = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP error! Status: {}", status.as_u16()));
    error!("{:?} rejected with {}: {}", operation, status, message);
    Err(GatewayError::remote(operation, message))
}

#[async_trait]
impl InventoryGateway for HttpGateway {
    async fn fetch_inventory(&self) -> Result<InventoryResponse, GatewayError> {
        let url = self.endpoint(Operation::FetchInventory, "inventory")?;
        debug!("GET {}", url);

        let res = self.http_client.get(&url).send().await;
        read_response(Operation::FetchInventory, res).await
    }

    async fn buy_drink(
        &self,
        slot: &str,
        payment: Payment,
    ) -> Result<PurchaseResponse, GatewayError> {
        let url = self.endpoint(Operation::Buy, "buy")?;
        debug!("POST {} for slot {} paying {:?}", url, slot, payment);

        let res = self
            .http_client
            .post(&url)
            .json(&BuyRequest {
                slot: slot.to_string(),
                payment,
            })
            .send()
            .await;
        read_response(Operation::Buy, res).await
    }

    async fn refill_drink(&self, slot: &str) -> Result<RefillResponse, GatewayError> {
        let url = self.endpoint(Operation::Refill, "refill")?;
        debug!("POST {} for slot {}", url, slot);

        let res = self
            .http_client
            .post(&url)
            .json(&RefillRequest {
                slot: slot.to_string(),
            })
            .send()
            .await;
        read_response(Operation::Refill, res).await
    }
}
