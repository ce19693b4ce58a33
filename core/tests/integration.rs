//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `Model` over the real
//! `ReqwestTransport`. Validates request building, transport, error mapping
//! and decoding together against an actual HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use dessert_core::{ApiConfig, Error, Model, ModelError, ReqwestTransport, TransportError};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

async fn start_mock_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await.unwrap() });
    addr
}

fn model_at(base_url: &str) -> Model {
    let transport = ReqwestTransport::new().unwrap();
    Model::new(Arc::new(transport), ApiConfig::new(base_url).unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn browse_catalogue() {
    let addr = start_mock_server().await;
    let model = model_at(&format!("http://{addr}/api/json/v1/1"));

    // Step 1: refresh the list.
    let desserts = model.refresh_desserts().await.unwrap();
    let names: Vec<_> = desserts.iter().map(|d| d.name()).collect();
    assert_eq!(
        names,
        ["Apam balik", "Bakewell tart", "Banana Pancakes", "Chocolate Gateau"]
    );
    assert_eq!(model.current_desserts(), desserts);
    assert!(!*model.is_fetching_desserts().borrow());

    // Step 2: fetch details for one entry.
    let detail = model.get_details(&desserts[1]).await.unwrap();
    assert_eq!(detail.id, "52767");
    assert_eq!(detail.name, "Bakewell tart");
    assert_eq!(detail.ingredients.len(), 4);
    assert_eq!(detail.ingredients[0].name, "plain flour");
    assert_eq!(detail.ingredients[0].amount, "175g/6oz");
    assert_eq!(detail.steps.len(), 3);

    // Step 3: details are not published.
    assert_eq!(model.current_desserts().len(), 4);
    assert_eq!(model.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_calls_resolve_independently() {
    let addr = start_mock_server().await;
    let model = model_at(&format!("http://{addr}/api/json/v1/1"));

    let (list, detail) = tokio::join!(
        model.refresh_desserts(),
        model.get_details_by_id("52776"),
    );
    assert_eq!(list.unwrap().len(), 4);
    assert_eq!(detail.unwrap().name, "Chocolate Gateau");
    assert_eq!(model.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_dessert_is_a_permanent_failure() {
    let addr = start_mock_server().await;
    let model = model_at(&format!("http://{addr}/api/json/v1/1"));

    let err = model.get_details_by_id("999").await.unwrap_err();
    assert_eq!(err, Error::Model(ModelError::PermanentResponseFailure));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_category_is_a_permanent_failure() {
    let addr = start_mock_server().await;
    let transport = ReqwestTransport::new().unwrap();
    let config = ApiConfig::new(&format!("http://{addr}/api/json/v1/1"))
        .unwrap()
        .with_category("Nothing");
    let model = Model::new(Arc::new(transport), config);

    let err = model.refresh_desserts().await.unwrap_err();
    assert_eq!(err, Error::Model(ModelError::PermanentResponseFailure));
    assert!(model.current_desserts().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_path_maps_to_other_status() {
    let addr = start_mock_server().await;
    let model = model_at(&format!("http://{addr}/api/json/v2/1"));

    let err = model.refresh_desserts().await.unwrap_err();
    assert_eq!(err, Error::Transport(TransportError::Other { status_code: 404 }));
    assert!(err.is_retryable());
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_connection_is_connectivity() {
    // Grab a free port, then close it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let model = model_at(&format!("http://{addr}/api/json/v1/1"));
    let err = model.refresh_desserts().await.unwrap_err();
    assert_eq!(err, Error::Transport(TransportError::Connectivity));
    assert_eq!(model.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn connection_closed_before_response_is_connectivity() {
    // Accept, read the request, then hang up without a status line.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            drop(socket);
        }
    });

    let model = model_at(&format!("http://{addr}/api/json/v1/1"));
    let err = model.refresh_desserts().await.unwrap_err();
    assert_eq!(err, Error::Transport(TransportError::Connectivity));
    assert!(model.current_desserts().is_empty());
    assert_eq!(model.in_flight(), 0);
}
