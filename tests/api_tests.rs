use message_board::{AppConfig, AppState, InMemoryRepository, RepositoryState, create_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
    let router = create_router(AppState::new(repo, AppConfig::default()));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(&format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_board_lifecycle() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let threads_url = format!("{}/api/threads/test", app.address);
    let replies_url = format!("{}/api/replies/test", app.address);

    // Create thread
    let response = client
        .post(&threads_url)
        .json(&json!({ "text": "New Thread Text", "delete_password": "testpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let thread: Value = response.json().await.unwrap();
    for field in ["_id", "text", "created_on", "bumped_on", "reported", "delete_password", "replies"] {
        assert!(thread.get(field).is_some(), "created thread is missing {field}");
    }
    assert_eq!(thread["replies"].as_array().unwrap().len(), 0);
    let thread_id = thread["_id"].as_str().unwrap().to_string();

    // List board
    let response = client.get(&threads_url).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let threads: Vec<Value> = response.json().await.unwrap();
    assert!(threads.len() <= 10);
    let listed = threads
        .iter()
        .find(|t| t["_id"] == thread_id.as_str())
        .expect("new thread is listed");
    assert!(listed.get("reported").is_none());
    assert!(listed.get("delete_password").is_none());
    assert!(listed["replies"].as_array().unwrap().len() <= 3);

    // Delete thread, wrong password
    let response = client
        .delete(&threads_url)
        .json(&json!({ "thread_id": thread_id, "delete_password": "wrongpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "incorrect password");

    // Report thread
    let response = client
        .put(&threads_url)
        .json(&json!({ "thread_id": thread_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "reported");

    // Create reply
    let response = client
        .post(&replies_url)
        .json(&json!({
            "thread_id": thread_id,
            "text": "New Reply Text",
            "delete_password": "replypassword"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let reply: Value = response.json().await.unwrap();
    assert!(reply.get("_id").is_some());
    assert_eq!(reply["text"], "New Reply Text");
    assert!(reply.get("created_on").is_some());
    let reply_id = reply["_id"].as_str().unwrap().to_string();

    // View thread with replies
    let response = client
        .get(&format!("{}?thread_id={}", replies_url, thread_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let view: Value = response.json().await.unwrap();
    for field in ["_id", "text", "created_on", "bumped_on"] {
        assert!(view.get(field).is_some(), "thread view is missing {field}");
    }
    let replies = view["replies"].as_array().unwrap();
    assert!(replies.iter().any(|r| r["_id"] == reply_id.as_str()));
    assert!(view.get("reported").is_none());

    // Delete reply, wrong password
    let response = client
        .delete(&replies_url)
        .json(&json!({ "thread_id": thread_id, "reply_id": reply_id, "delete_password": "wrongpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "incorrect password");

    // Delete reply, correct password
    let response = client
        .delete(&replies_url)
        .json(&json!({ "thread_id": thread_id, "reply_id": reply_id, "delete_password": "replypassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "success");

    // Report reply
    let response = client
        .put(&replies_url)
        .json(&json!({ "thread_id": thread_id, "reply_id": reply_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "reported");

    // Delete thread, correct password
    let response = client
        .delete(&threads_url)
        .json(&json!({ "thread_id": thread_id, "delete_password": "testpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "success");

    // Gone afterwards
    let response = client
        .get(&format!("{}?thread_id={}", replies_url, thread_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_form_encoded_thread_creation() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/threads/forms", app.address))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("text=From+a+form&delete_password=pw")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let thread: Value = response.json().await.unwrap();
    assert_eq!(thread["text"], "From a form");
    assert_eq!(thread["board"], "forms");
}
