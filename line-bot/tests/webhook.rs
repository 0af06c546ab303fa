//! End-to-end tests for the webhook router with an in-memory reply client.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use declutter::dispatch::{FALLBACK_MENU, SCREENSHOT_PROMPT};
use declutter::web::{compute_signature, SIGNATURE_HEADER, WEBHOOK_PATH};
use declutter::{router, AppState, Config, Dispatcher, FlexTemplate, ReplyClient, ReplyError, ReplyMessage};

const SECRET: &str = "test-channel-secret";

#[derive(Default)]
struct FakeClient {
    sent: Mutex<Vec<(String, Value)>>,
    fail: bool,
}

#[async_trait]
impl ReplyClient for FakeClient {
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<(), ReplyError> {
        if self.fail {
            return Err(ReplyError::Status {
                status: 500,
                body: "upstream down".to_string(),
            });
        }
        let json = serde_json::to_value(messages).unwrap();
        self.sent
            .lock()
            .unwrap()
            .push((reply_token.to_string(), json));
        Ok(())
    }
}

fn app(client: Arc<FakeClient>, template: Option<FlexTemplate>) -> Router {
    let config = Config::from_lookup(|name| match name {
        "LINE_CHANNEL_SECRET" => Some(SECRET.to_string()),
        "LINE_CHANNEL_ACCESS_TOKEN" => Some("test-token".to_string()),
        _ => None,
    })
    .unwrap();
    router(AppState::new(config, Dispatcher::new(client, template)))
}

fn post(body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(WEBHOOK_PATH)
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header(SIGNATURE_HEADER, sig);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn signed(body: &str) -> Request<Body> {
    let sig = compute_signature(SECRET.as_bytes(), body.as_bytes());
    post(body, Some(&sig))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn text_body(text: &str) -> String {
    serde_json::json!({
        "destination": "Ubot",
        "events": [{
            "type": "message",
            "replyToken": "token-1",
            "source": {"type": "user", "userId": "U1"},
            "message": {"type": "text", "id": "m1", "text": text}
        }]
    })
    .to_string()
}

const IMAGE_BODY: &str = r#"{"events":[{"type":"message","replyToken":"token-img","message":{"type":"image","id":"m2"}}]}"#;

#[tokio::test]
async fn health_returns_ok() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app(Arc::default(), None), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn empty_events_accepted_with_any_signature() {
    let client = Arc::new(FakeClient::default());

    let (status, body) = send(
        app(client.clone(), None),
        post(r#"{"events":[]}"#, Some("a_valid_signature")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": "ok"}));

    let (status, _) = send(app(client.clone(), None), post(r#"{"destination":"U"}"#, None)).await;
    assert_eq!(status, StatusCode::OK);

    assert!(client.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_treated_as_empty() {
    let client = Arc::new(FakeClient::default());
    let (status, body) = send(app(client.clone(), None), post("{not json", Some("x"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(client.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn mismatched_signature_rejected() {
    let client = Arc::new(FakeClient::default());
    let (status, body) = send(
        app(client.clone(), None),
        post(&text_body("hello"), Some("invalid_signature")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid signature");
    assert!(client.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn signature_for_other_body_rejected() {
    let sig = compute_signature(SECRET.as_bytes(), text_body("残す").as_bytes());
    let (status, _) = send(
        app(Arc::default(), None),
        post(&text_body("削除候補"), Some(&sig)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_signature_rejected() {
    let client = Arc::new(FakeClient::default());
    let (status, body) = send(app(client.clone(), None), post(&text_body("hello"), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing signature");

    let (status, _) = send(app(client.clone(), None), post(&text_body("hello"), Some(""))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(client.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn undecodable_events_still_require_signature() {
    let bodies = [
        r#"{"events":[{"replyToken":"x"}]}"#,
        r#"{"events":[{"type":"message","replyToken":"x","message":{"type":"text"}}]}"#,
    ];

    for body in bodies {
        let client = Arc::new(FakeClient::default());

        let (status, resp) = send(app(client.clone(), None), post(body, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "no header: {}", body);
        assert_eq!(resp["message"], "Missing signature");

        let (status, resp) = send(app(client.clone(), None), post(body, Some("bogus"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "bogus header: {}", body);
        assert_eq!(resp["message"], "Invalid signature");

        assert!(client.sent.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn undecodable_event_does_not_drop_batch() {
    let body = r#"{"destination":"Ubot","events":[
        {"type":"message","mode":"standby","source":{"type":"user","userId":"U1"},
         "message":{"type":"text","id":"m0","text":"削除候補"}},
        {"type":"message","mode":"active","replyToken":"good",
         "message":{"type":"text","id":"m1","text":"残す"}}
    ]}"#;
    let client = Arc::new(FakeClient::default());
    let (status, resp) = send(app(client.clone(), None), signed(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, serde_json::json!({"status": "ok"}));

    let sent = client.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "good");
    assert_eq!(
        sent[0].1[0]["text"],
        "「残す」を選択しました。お役に立てて良かったです！"
    );
}

#[tokio::test]
async fn keyword_text_acknowledged() {
    let client = Arc::new(FakeClient::default());
    let (status, body) = send(app(client.clone(), None), signed(&text_body("削除候補"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": "ok"}));

    let sent = client.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "token-1");
    assert_eq!(
        sent[0].1,
        serde_json::json!([{
            "type": "text",
            "text": "「削除候補」を選択しました。お役に立てて良かったです！"
        }])
    );
}

#[tokio::test]
async fn plain_text_prompts_for_screenshot() {
    let client = Arc::new(FakeClient::default());
    let (status, _) = send(app(client.clone(), None), signed(&text_body("hello"))).await;

    assert_eq!(status, StatusCode::OK);
    let sent = client.sent.lock().unwrap();
    assert_eq!(sent[0].1[0]["text"], SCREENSHOT_PROMPT);
}

#[tokio::test]
async fn image_uses_template() {
    let template = FlexTemplate::from_json(
        r#"{"type":"flex","altText":"選択してください","contents":{"type":"bubble","body":{"type":"box","layout":"vertical","contents":[]}}}"#,
    )
    .unwrap();
    let client = Arc::new(FakeClient::default());
    let (status, _) = send(app(client.clone(), Some(template)), signed(IMAGE_BODY)).await;

    assert_eq!(status, StatusCode::OK);
    let sent = client.sent.lock().unwrap();
    assert_eq!(sent[0].0, "token-img");
    assert_eq!(
        sent[0].1,
        serde_json::json!([{
            "type": "flex",
            "altText": "選択してください",
            "contents": {"type": "bubble", "body": {"type": "box", "layout": "vertical", "contents": []}}
        }])
    );
}

#[tokio::test]
async fn image_without_template_sends_menu() {
    let client = Arc::new(FakeClient::default());
    let (status, _) = send(app(client.clone(), None), signed(IMAGE_BODY)).await;

    assert_eq!(status, StatusCode::OK);
    let sent = client.sent.lock().unwrap();
    assert_eq!(sent[0].1[0]["text"], FALLBACK_MENU);
}

#[tokio::test]
async fn unhandled_events_get_no_reply() {
    let body = r#"{"events":[
        {"type":"follow","replyToken":"t1","source":{"type":"user","userId":"U1"}},
        {"type":"message","replyToken":"t2","message":{"type":"sticker","id":"m","packageId":"1","stickerId":"1"}}
    ]}"#;
    let client = Arc::new(FakeClient::default());
    let (status, _) = send(app(client.clone(), None), signed(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(client.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn delivery_failure_returns_server_error() {
    let client = Arc::new(FakeClient {
        fail: true,
        ..Default::default()
    });
    let (status, body) = send(app(client, None), signed(&text_body("hello"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        serde_json::json!({"status": "error", "message": "Internal server error"})
    );
}
