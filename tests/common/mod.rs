// tests/common/mod.rs

use std::sync::Arc;

use quiz_backend::{config::Config, routes, state::AppState, store::MemoryStore};
use serde_json::{Value, json};

#[allow(dead_code)]
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

/// Spawns the full router on a random port, backed by a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let config = Config::for_memory("test_secret_for_integration_tests");
    let state = AppState::new(Arc::new(MemoryStore::new()), config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        api_client: reqwest::Client::new(),
    }
}

/// Two 4-option questions whose correct answers are [1, 2].
#[allow(dead_code)]
pub fn two_question_quiz(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Basics",
        "questions": [
            { "text": "2 + 2?", "options": ["3", "4", "5", "6"], "correctAnswerIndex": 1 },
            { "text": "Capital of France?", "options": ["Rome", "Madrid", "Paris", "Oslo"], "correctAnswerIndex": 2 }
        ]
    })
}

#[allow(dead_code)]
impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers a fresh user with the given role, returning `(token, user_id)`.
    pub async fn register(&self, role: &str) -> (String, i64) {
        let email = format!("{}_{}@example.com", role, &uuid::Uuid::new_v4().to_string()[..8]);
        let response = self
            .api_client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "name": format!("Test {}", role),
                "email": email,
                "password": "password123",
                "role": role
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap(),
        )
    }

    /// Creates a quiz as `token`, returning its id.
    pub async fn create_quiz(&self, token: &str, body: &Value) -> i64 {
        let response = self
            .api_client
            .post(self.url("/api/quizzes"))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    pub async fn submit(&self, token: &str, quiz_id: i64, answers: &[i64]) -> reqwest::Response {
        self.api_client
            .post(self.url(&format!("/api/results/submit/{}", quiz_id)))
            .bearer_auth(token)
            .json(&json!({ "answers": answers }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
