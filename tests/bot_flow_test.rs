//! End-to-end reply flow against a local stand-in for the Perchance API.

use aurelia_bot::{
    ConversationStore, PerchanceClient, Responder, Role, API_FAILURE_REPLY,
};
use axum::{http::StatusCode, routing::post, Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/ai/text", addr)
}

fn responder(url: &str, timeout: Duration) -> Responder {
    let client = PerchanceClient::new(url, timeout).unwrap();
    Responder::new(Arc::new(ConversationStore::new()), Arc::new(client))
}

#[tokio::test]
async fn test_new_user_says_oi() {
    let prompts: Arc<Mutex<Vec<String>>> = Arc::default();
    let seen = Arc::clone(&prompts);
    let app = Router::new().route(
        "/ai/text",
        post(move |Json(body): Json<serde_json::Value>| {
            let seen = Arc::clone(&seen);
            async move {
                assert_eq!(body["type"], "chat");
                seen.lock()
                    .await
                    .push(body["prompt"].as_str().unwrap_or_default().to_string());
                "Ola!\n"
            }
        }),
    );
    let url = serve(app).await;
    let responder = responder(&url, Duration::from_secs(5));

    let reply = responder.generate_reply(42, "Oi").await;
    assert_eq!(reply, "Ola!");

    let prompts = prompts.lock().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(&responder.persona().personality));
    assert!(prompts[0].contains("User: Oi"));

    let history = responder.store().get_or_create(42);
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content(), "Ola!");
}

#[tokio::test]
async fn test_timeout_records_apology() {
    let app = Router::new().route(
        "/ai/text",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "tarde demais"
        }),
    );
    let url = serve(app).await;
    let responder = responder(&url, Duration::from_millis(200));

    let reply = responder.generate_reply(42, "Oi").await;
    assert_eq!(reply, API_FAILURE_REPLY);

    let history = responder.store().get_or_create(42);
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role(), Role::Assistant);
    assert_eq!(history[1].content(), API_FAILURE_REPLY);
}

#[tokio::test]
async fn test_server_error_then_recovery() {
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let app = Router::new().route(
        "/ai/text",
        post(move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                    (StatusCode::SERVICE_UNAVAILABLE, String::new())
                } else {
                    (StatusCode::OK, "Voltei!".to_string())
                }
            }
        }),
    );
    let url = serve(app).await;
    let responder = responder(&url, Duration::from_secs(5));

    assert_eq!(responder.generate_reply(7, "Oi").await, API_FAILURE_REPLY);
    assert_eq!(responder.generate_reply(7, "Oi de novo").await, "Voltei!");
    assert_eq!(responder.store().len(7), 4);
}
