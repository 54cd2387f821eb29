//! End-to-end tests over the HTTP surface with in-process doubles for the
//! payment gateway and the x402 facilitator.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use vinyasa_core::gateway::{
    Charge, GatewayError, HostedCheckout, HostedCheckoutParams, PaymentGateway,
};
use vinyasa_server::{AppState, Config, router};
use vinyasa_x402::X402Error;
use vinyasa_x402::facilitator::Facilitator;
use vinyasa_x402::proto::{
    ExactEvmAuthorization, ExactEvmPayload, PaymentPayload, PaymentRequirements, SettleResponse,
    VerifyResponse, X402_VERSION, encode_payment,
};

const PAY_TO: &str = "0x209693Bc6afc0C5328bA36FaF03C514EF312287C";

struct StubGateway {
    calls: AtomicUsize,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn charge(
        &self,
        _amount_cents: i64,
        _currency: &str,
        _instrument: &str,
    ) -> Result<Charge, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Charge {
            id: "pi_stub".to_owned(),
            status: "succeeded".to_owned(),
        })
    }

    async fn create_checkout_session(
        &self,
        params: HostedCheckoutParams<'_>,
    ) -> Result<HostedCheckout, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HostedCheckout {
            url: format!(
                "https://checkout.stripe.example/pay?amount={}&qty={}",
                params.unit_amount_cents, params.quantity
            ),
        })
    }
}

struct StubFacilitator;

#[async_trait]
impl Facilitator for StubFacilitator {
    async fn verify(
        &self,
        _payload: &PaymentPayload,
        _requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse, X402Error> {
        Ok(VerifyResponse {
            is_valid: true,
            invalid_reason: None,
            payer: None,
        })
    }

    async fn settle(
        &self,
        _payload: &PaymentPayload,
        _requirements: &PaymentRequirements,
    ) -> Result<SettleResponse, X402Error> {
        Ok(SettleResponse {
            success: true,
            error_reason: None,
            transaction: Some("0xabc123".to_owned()),
            network: Some("base-sepolia".to_owned()),
            payer: None,
        })
    }
}

fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars = vec![
        ("STRIPE_SECRET_KEY", "sk_test_abc"),
        ("X402_PAY_TO", PAY_TO),
        ("BASE_URL", "https://shop.example"),
    ];
    vars.extend_from_slice(extra);
    Config::from_lookup(|key| {
        vars.iter()
            .find(|&&(k, _)| k == key)
            .map(|&(_, v)| v.to_owned())
    })
    .unwrap()
}

fn app(extra: &[(&str, &str)]) -> Router {
    let config = test_config(extra);
    let state = AppState::with_collaborators(
        &config,
        Arc::new(StubGateway {
            calls: AtomicUsize::new(0),
        }),
        Arc::new(StubFacilitator),
    );
    router(Arc::new(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_and_catalogs() {
    let app = app(&[]);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, get("/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(&app, get("/products/mat")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price_cents"], 2999);
    assert_eq!(body["price_display"], "$29.99");

    let (status, _) = send(&app, get("/products/blocks")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/classes")).await;
    assert_eq!(status, StatusCode::OK);
    let classes = body.as_array().unwrap();
    assert_eq!(classes.len(), 4);
    // The free listing never leaks the paywalled URL.
    assert!(classes[0].get("full_url").is_none());
}

#[tokio::test]
async fn test_checkout_flow_end_to_end() {
    let app = app(&[]);

    let (status, created) = send(
        &app,
        post(
            "/acp/checkout_sessions",
            json!({"product_id": "mat", "quantity": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"], "open");
    assert_eq!(created["total_cents"], 5998);
    assert_eq!(created["total_display"], "$59.98");
    let session_id = created["checkout_session_id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        post(
            &format!("/acp/checkout_sessions/{session_id}"),
            json!({"quantity": 3, "shipping_address": {"city": "Portland"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["total_cents"], 8997);
    assert_eq!(updated["shipping_address"]["city"], "Portland");

    let (status, completed) = send(
        &app,
        post(
            &format!("/acp/checkout_sessions/{session_id}/complete"),
            json!({"payment_token": "tok_demo"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["payment_status"], "succeeded");
    let order_id = completed["order_id"].as_str().unwrap();

    let (status, order) = send(&app, get(&format!("/acp/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["checkout_session_id"], session_id);
    assert_eq!(order["total_cents"], 8997);
    assert_eq!(order["line_items"][0]["product_id"], "mat");

    // The closed session rejects further transitions.
    let (status, body) = send(
        &app,
        post(
            &format!("/acp/checkout_sessions/{session_id}/complete"),
            json!({"payment_token": "tok_demo"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        post(
            &format!("/acp/checkout_sessions/{session_id}/cancel"),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_hosted_checkout_returns_url() {
    let app = app(&[]);

    let (status, body) = send(
        &app,
        post("/checkout", json!({"product_id": "mat", "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["url"],
        "https://checkout.stripe.example/pay?amount=2999&qty=2"
    );

    let (status, _) = send(
        &app,
        post("/checkout", json!({"product_id": "blocks"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_open_session() {
    let app = app(&[]);

    let (_, created) = send(
        &app,
        post("/acp/checkout_sessions", json!({"product_id": "strap"})),
    )
    .await;
    let session_id = created["checkout_session_id"].as_str().unwrap();
    assert_eq!(created["total_cents"], 1299);

    let (status, canceled) = send(
        &app,
        post(
            &format!("/acp/checkout_sessions/{session_id}/cancel"),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(canceled["status"], "canceled");
    assert_eq!(canceled["available_actions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unknown_ids_are_404() {
    let app = app(&[]);

    let (status, _) = send(
        &app,
        post("/acp/checkout_sessions", json!({"product_id": "blocks"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        post("/acp/checkout_sessions/acp_missing", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/acp/orders/order_missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_class_challenge_shape() {
    let app = app(&[]);

    let (status, body) = send(&app, get("/classes/1")).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["x402Version"], 1);
    assert!(body["error"].is_string());

    let accepts = body["accepts"].as_array().unwrap();
    assert_eq!(accepts.len(), 1);
    let req = &accepts[0];
    assert_eq!(req["scheme"], "exact");
    assert_eq!(req["network"], "base-sepolia");
    assert_eq!(req["maxAmountRequired"], "1000000");
    assert_eq!(req["resource"], "https://shop.example/classes/1");
    assert_eq!(req["payTo"], PAY_TO);
    assert_eq!(req["maxTimeoutSeconds"], 60);
    assert_eq!(req["asset"], "0x036CbD53842c5426634e7929541eC2318f3dCF7e");
    assert_eq!(req["extra"]["name"], "USDC");
}

#[tokio::test]
async fn test_class_unlocks_with_valid_proof() {
    let app = app(&[]);

    let proof = encode_payment(&PaymentPayload {
        x402_version: X402_VERSION,
        scheme: "exact".to_owned(),
        network: "base-sepolia".to_owned(),
        payload: ExactEvmPayload {
            signature: "0xsig".to_owned(),
            authorization: ExactEvmAuthorization {
                from: "0x857b06519E91e3A54538791bDbb0E22373e36b66".to_owned(),
                to: PAY_TO.to_owned(),
                value: "1000000".to_owned(),
                valid_after: "0".to_owned(),
                valid_before: "1999999999".to_owned(),
                nonce: "0x00".to_owned(),
            },
        },
    });

    let request = Request::get("/classes/1")
        .header("X-PAYMENT", proof)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "1");
    assert_eq!(body["tx_hash"], "0xabc123");
    assert!(body["full_url"].as_str().unwrap().contains("end=20"));
}

#[tokio::test]
async fn test_class_rejects_bad_proof_with_fresh_challenge() {
    let app = app(&[]);

    let request = Request::get("/classes/2")
        .header("X-PAYMENT", "garbage!!!")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    // The rejection re-issues the full challenge.
    assert_eq!(body["accepts"][0]["maxAmountRequired"], "2000000");
}

#[tokio::test]
async fn test_demo_bypass_only_when_enabled() {
    let request = || {
        Request::get("/classes/1")
            .header("X-PAYMENT", "demo")
            .body(Body::empty())
            .unwrap()
    };

    let enabled = app(&[("X402_DEMO_MODE", "1")]);
    let (status, body) = send(&enabled, request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tx_hash"], "demo-mode-tx");

    let disabled = app(&[]);
    let (status, _) = send(&disabled, request()).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_unknown_class_is_404() {
    let app = app(&[]);
    let (status, _) = send(&app, get("/classes/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
