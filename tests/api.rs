mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{fixture, invoice, system_sender, Fixture};
use payment_notices::api;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(fx: &Fixture) -> axum::Router {
    api::router(api::AppState::new(
        fx.dispatcher.clone(),
        None,
        system_sender(),
    ))
}

async fn call(app: axum::Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn bulk_endpoint_returns_notification() {
    let fx = fixture();
    fx.store.insert_invoice(invoice(1, Some("a@customer.test")));
    let app = app(&fx);

    let (status, body) = call(
        app,
        json_request("POST", "/api/notices/overdue", json!({ "invoice_ids": [1] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["sent"], 1);
    assert_eq!(body["notification"]["title"], "Success");
    assert_eq!(body["notification"]["type"], "success");
}

#[tokio::test]
async fn manual_send_with_blank_recipient_is_unprocessable() {
    let fx = fixture();
    fx.store.insert_invoice(invoice(1, None));
    let app = app(&fx);

    let (status, body) = call(
        app,
        json_request("POST", "/api/invoices/1/notice", json!({ "email_to": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email address is required");
    assert!(fx.transport.sent().is_empty());
}

#[tokio::test]
async fn open_notice_for_unknown_invoice_is_404() {
    let fx = fixture();
    let app = app(&fx);

    let request = Request::builder()
        .uri("/api/invoices/7/notice")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn overdue_report_is_csv() {
    let fx = fixture();
    fx.store.insert_invoice(invoice(1, Some("a@customer.test")));
    let app = app(&fx);

    let request = Request::builder()
        .uri("/api/invoices/overdue.csv")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("id,number,partner,email,due_date"));
    assert!(text.contains("INV/2024/0001"));
}

#[tokio::test]
async fn manual_send_is_attributed_to_requesting_operator() {
    let fx = fixture();
    fx.store.insert_invoice(invoice(1, Some("a@customer.test")));

    let mut request = json_request(
        "POST",
        "/api/invoices/1/notice",
        json!({ "email_to": "a@customer.test" }),
    );
    let headers = request.headers_mut();
    headers.insert(api::ACTING_USER_HEADER, "bob".parse().unwrap());
    headers.insert(api::ACTING_EMAIL_HEADER, "bob@seller.test".parse().unwrap());
    let (status, _) = call(app(&fx), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fx.transport.sent()[0].email_from, "bob@seller.test");
    assert_eq!(fx.store.notes(1)[0].author, "bob");
}

#[tokio::test]
async fn company_email_is_sender_for_operator_requests() {
    let fx = fixture();
    fx.store.insert_invoice(invoice(1, Some("a@customer.test")));
    let app = api::router(api::AppState::new(
        fx.dispatcher.clone(),
        Some("billing@seller.test".to_string()),
        system_sender(),
    ));

    let mut request = json_request("POST", "/api/notices/overdue", json!({}));
    request
        .headers_mut()
        .insert(api::ACTING_USER_HEADER, "bob".parse().unwrap());
    let (status, _) = call(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fx.transport.sent()[0].email_from, "billing@seller.test");
    assert_eq!(fx.store.notes(1)[0].author, "bob");
}

#[tokio::test]
async fn requests_without_operator_use_configured_sender() {
    let fx = fixture();
    fx.store.insert_invoice(invoice(1, Some("a@customer.test")));

    let (status, _) = call(
        app(&fx),
        json_request("POST", "/api/notices/overdue", json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fx.transport.sent()[0].email_from, "ar@seller.test");
    assert_eq!(fx.store.notes(1)[0].author, "scheduler");
}
