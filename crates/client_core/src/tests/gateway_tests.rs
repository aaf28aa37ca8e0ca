use super::*;
use axum::{
    extract::{Path, State},
    http::StatusCode as HttpStatus,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shared::domain::PaymentMethod;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Clone)]
struct ServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<Value>>>>,
    reply: (u16, String),
}

async fn handle_contribution(
    State(state): State<ServerState>,
    Json(payload): Json<Value>,
) -> (HttpStatus, String) {
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(payload);
    }
    let (status, body) = state.reply;
    (
        HttpStatus::from_u16(status).unwrap_or(HttpStatus::INTERNAL_SERVER_ERROR),
        body,
    )
}

async fn handle_gifts() -> Json<Value> {
    Json(json!({
        "success": true,
        "presentes": [
            {
                "id": 1,
                "nome": "Jogo de panelas",
                "descricao": "Inox, 5 peças",
                "valor_total": 450.0,
                "valor_arrecadado": 100.0,
                "progresso_porcentagem": 22.2,
                "esta_completo": false,
                "imagem_url": "/static/images/panelas.jpg"
            },
            {
                "id": 2,
                "nome": "Lua de mel",
                "descricao": "Uma noite no hotel",
                "valor_total": 800.0,
                "valor_arrecadado": 800.0,
                "progresso_porcentagem": 100.0,
                "esta_completo": true
            }
        ]
    }))
}

async fn handle_gift(Path(id): Path<i64>) -> (HttpStatus, Json<Value>) {
    if id == 1 {
        (
            HttpStatus::OK,
            Json(json!({
                "success": true,
                "presente": {"id": 1, "nome": "Jogo de panelas", "valor_total": 450.0, "valor_arrecadado": 0.0}
            })),
        )
    } else {
        (
            HttpStatus::NOT_FOUND,
            Json(json!({"success": false, "error": "404 Not Found"})),
        )
    }
}

async fn spawn_registry_server(
    status: u16,
    body: &str,
) -> anyhow::Result<(String, oneshot::Receiver<Value>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
        reply: (status, body.to_string()),
    };
    let app = Router::new()
        .route("/api/contribuir", post(handle_contribution))
        .route("/api/presentes", get(handle_gifts))
        .route("/api/presentes/:id", get(handle_gift))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), rx))
}

fn sample_request() -> ContributionRequest {
    ContributionRequest {
        gift_id: GiftId(1),
        gift_name: "Jogo de panelas".to_string(),
        name: "Rafael".to_string(),
        email: "rafael@example.com".to_string(),
        cpf: "12345678900".to_string(),
        phone: String::new(),
        amount: Decimal::new(9990, 2),
        message: "Parabéns aos noivos".to_string(),
        method: PaymentMethod::Card,
    }
}

#[tokio::test]
async fn submit_posts_backend_payload_and_decodes_redirect() {
    let (server_url, payload_rx) = spawn_registry_server(
        200,
        r#"{"success": true, "payment_url": "https://pay.example/p/1", "contribuicao_id": 4, "metodo": "cartao"}"#,
    )
    .await
    .expect("spawn server");
    let client = RegistryClient::new(&server_url).expect("client");

    let response = client
        .submit_contribution(&sample_request())
        .await
        .expect("submit");
    assert!(response.success);
    assert_eq!(response.redirect_url(), Some("https://pay.example/p/1"));

    let payload = payload_rx.await.expect("payload");
    assert_eq!(payload["presente_id"], json!(1));
    assert_eq!(payload["nome"], json!("Rafael"));
    assert_eq!(payload["valor"], json!(99.9));
    assert_eq!(payload["metodo_pagamento"], json!("cartao"));
    assert_eq!(payload["telefone"], json!(""));
}

#[tokio::test]
async fn rejection_body_is_decoded_despite_error_status() {
    let (server_url, _payload_rx) =
        spawn_registry_server(400, r#"{"success": false, "error": "Dados incompletos"}"#)
            .await
            .expect("spawn server");
    let client = RegistryClient::new(&server_url).expect("client");

    let response = client
        .submit_contribution(&sample_request())
        .await
        .expect("decoded rejection");
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Dados incompletos"));
}

#[tokio::test]
async fn non_json_error_reports_status() {
    let (server_url, _payload_rx) = spawn_registry_server(502, "<html>bad gateway</html>")
        .await
        .expect("spawn server");
    let client = RegistryClient::new(&server_url).expect("client");

    let err = client
        .submit_contribution(&sample_request())
        .await
        .expect_err("must fail");
    match err {
        GatewayError::UnexpectedResponse { status, detail, .. } => {
            assert_eq!(status, 502);
            assert_eq!(detail, "Bad Gateway");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = RegistryClient::with_timeout(&format!("http://{addr}"), Duration::from_secs(2))
        .expect("client");
    let err = client
        .submit_contribution(&sample_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, GatewayError::Transport { .. }), "{err:?}");
    assert!(err.to_string().contains("api/contribuir"));
}

#[tokio::test]
async fn lists_gifts_with_remaining_amounts() {
    let (server_url, _payload_rx) = spawn_registry_server(200, "{}")
        .await
        .expect("spawn server");
    let client = RegistryClient::new(&server_url).expect("client");

    let gifts = client.list_gifts().await.expect("list");
    assert_eq!(gifts.len(), 2);
    assert_eq!(gifts[0].name, "Jogo de panelas");
    assert_eq!(gifts[0].remaining(), Decimal::new(350, 0));
    assert!(gifts[1].complete);
    assert_eq!(gifts[1].remaining(), Decimal::ZERO);
}

#[tokio::test]
async fn fetches_single_gift_and_maps_not_found() {
    let (server_url, _payload_rx) = spawn_registry_server(200, "{}")
        .await
        .expect("spawn server");
    let client = RegistryClient::new(&server_url).expect("client");

    let gift = client.fetch_gift(GiftId(1)).await.expect("gift 1");
    assert_eq!(gift.total, Decimal::new(450, 0));

    let err = client.fetch_gift(GiftId(99)).await.expect_err("missing");
    match err {
        GatewayError::Api(ApiException { code, message }) => {
            assert_eq!(code, ErrorCode::NotFound);
            assert_eq!(message, "404 Not Found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn endpoints_resolve_beneath_a_server_subpath() {
    let client = RegistryClient::new("https://casamento.example/lista").expect("client");
    assert_eq!(
        client.endpoint(CONTRIBUTE_PATH).expect("endpoint").as_str(),
        "https://casamento.example/lista/api/contribuir"
    );
    assert_eq!(
        client
            .endpoint(&format!("{GIFTS_PATH}/{}", GiftId(3)))
            .expect("endpoint")
            .as_str(),
        "https://casamento.example/lista/api/presentes/3"
    );
}

#[test]
fn rejects_unparseable_server_url() {
    let err = RegistryClient::new("not a url").expect_err("invalid");
    assert!(matches!(err, GatewayError::InvalidUrl { .. }));
}
