use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vending::gateway::client::HttpGateway;
use vending::gateway::{GatewayError, InventoryGateway, Operation};
use vending::machine::VendingMachine;
use vending::models::{Drink, Payment};

#[derive(Clone, Default)]
struct Backend {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Backend {
    fn record(&self, path: &str, body: Value) {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), body));
    }

    fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn inventory(Extension(backend): Extension<Backend>) -> impl IntoResponse {
    backend.record("/inventory", Value::Null);
    Json(json!({
        "drinks": [
            {"slot": "A1", "name": "Cola", "price": 25.0, "quantity": 10},
            {"slot": "A2", "name": "Iced Tea", "price": 30.5, "quantity": 1}
        ],
        "coins": 35,
        "cash": 120
    }))
}

async fn buy(
    Json(body): Json<Value>,
    Extension(backend): Extension<Backend>,
) -> impl IntoResponse {
    backend.record("/buy", body.clone());
    match body["slot"].as_str() {
        Some("A1") => (
            StatusCode::OK,
            Json(json!({
                "purchasedDrink": {"slot": "A1", "name": "Cola", "price": 25.0, "quantity": 9},
                "change": 5
            })),
        ),
        _ => (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Out of stock" })),
        ),
    }
}

async fn refill(
    Json(body): Json<Value>,
    Extension(backend): Extension<Backend>,
) -> impl IntoResponse {
    backend.record("/refill", body);
    Json(json!({ "message": "Slot A2 refilled to 10", "newQuantity": 10 }))
}

async fn broken() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn garbage() -> impl IntoResponse {
    (StatusCode::OK, "definitely not json")
}

fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });
    addr
}

fn spawn_backend() -> (Backend, SocketAddr) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/inventory", get(inventory))
        .route("/api/buy", post(buy))
        .route("/api/refill", post(refill))
        .layer(Extension(backend.clone()));
    (backend, serve(app))
}

#[tokio::test]
async fn fetches_inventory() {
    let (_backend, addr) = spawn_backend();
    let gateway = HttpGateway::new(Some(format!("http://{addr}/api/")));

    let inventory = gateway.fetch_inventory().await.unwrap();
    assert_eq!(inventory.coins, 35);
    assert_eq!(inventory.cash, 120);
    assert_eq!(
        inventory.drinks[1],
        Drink {
            slot: String::from("A2"),
            name: String::from("Iced Tea"),
            price: 30.5,
            quantity: 1,
        }
    );
}

#[tokio::test]
async fn purchase_sends_slot_and_payment_breakdown() {
    let (backend, addr) = spawn_backend();
    let gateway = HttpGateway::new(Some(format!("http://{addr}/api")));

    let purchase = gateway
        .buy_drink(
            "A1",
            Payment {
                coins: 10,
                cash: 20,
                total: 30,
            },
        )
        .await
        .unwrap();
    assert_eq!(purchase.purchased_drink.name, "Cola");
    assert_eq!(purchase.change, 5.0);

    assert_eq!(
        backend.requests(),
        vec![(
            String::from("/buy"),
            json!({"slot": "A1", "payment": {"coins": 10, "cash": 20, "total": 30}})
        )]
    );
}

#[tokio::test]
async fn purchase_rejection_carries_server_message() {
    let (_backend, addr) = spawn_backend();
    let gateway = HttpGateway::new(Some(format!("http://{addr}/api")));

    let err = gateway
        .buy_drink(
            "B1",
            Payment {
                coins: 50,
                cash: 0,
                total: 50,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, GatewayError::remote(Operation::Buy, "Out of stock"));
    assert_eq!(err.to_string(), "Purchase failed: Out of stock");
}

#[tokio::test]
async fn refill_returns_new_quantity() {
    let (backend, addr) = spawn_backend();
    let gateway = HttpGateway::new(Some(format!("http://{addr}/api")));

    let refill = gateway.refill_drink("A2").await.unwrap();
    assert_eq!(refill.message, "Slot A2 refilled to 10");
    assert_eq!(refill.new_quantity, Some(10));
    assert_eq!(
        backend.requests(),
        vec![(String::from("/refill"), json!({"slot": "A2"}))]
    );
}

#[tokio::test]
async fn error_without_message_falls_back_to_status() {
    let addr = serve(Router::new().route("/refill", post(broken)));
    let gateway = HttpGateway::new(Some(format!("http://{addr}")));

    let err = gateway.refill_drink("A1").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to refill drink: HTTP error! Status: 500"
    );
}

#[tokio::test]
async fn malformed_body_is_a_remote_error() {
    let addr = serve(Router::new().route("/inventory", get(garbage)));
    let gateway = HttpGateway::new(Some(format!("http://{addr}")));

    match gateway.fetch_inventory().await {
        Err(GatewayError::Remote { operation, .. }) => {
            assert_eq!(operation, Operation::FetchInventory)
        }
        other => panic!("expected a remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_remote_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let gateway = HttpGateway::new(Some(format!("http://{addr}")));

    let err = gateway.fetch_inventory().await.unwrap_err();
    assert_eq!(err.operation(), Operation::FetchInventory);
    assert!(err.to_string().starts_with("Failed to fetch inventory: "));
}

#[tokio::test]
async fn missing_base_url_fails_before_any_request() {
    let gateway = HttpGateway::new(None);
    assert_eq!(
        gateway.fetch_inventory().await.unwrap_err(),
        GatewayError::Configuration(Operation::FetchInventory)
    );
    assert_eq!(
        gateway.refill_drink("A1").await.unwrap_err().to_string(),
        "API Base URL is not configured. Cannot refill drink."
    );
}

#[tokio::test]
async fn machine_buys_against_live_backend() {
    let (backend, addr) = spawn_backend();
    let gateway = HttpGateway::new(Some(format!("http://{addr}/api")));
    let mut machine = VendingMachine::new(gateway, Duration::from_millis(10));

    machine.fetch_initial_data().await;
    machine.handle_keypad_press("A");
    machine.handle_keypad_press("1");
    machine.insert_coin(10);
    machine.insert_cash(20);
    machine.buy_drink().await;

    assert_eq!(machine.message(), "Enjoy your Cola! Change: PHP 5.00.");
    let paths: Vec<String> = backend.requests().into_iter().map(|(path, _)| path).collect();
    assert_eq!(paths, vec!["/inventory", "/buy", "/inventory"]);

    machine.wait_for_reset().await;
    assert_eq!(machine.session().payment_total, 0);
    assert_eq!(machine.session().keypad_input, "");
}
