use std::net::TcpListener;

use serde_json::{json, Value};

use pipit::configuration::{
    ApplicationSettings, AuthSettings, DatabaseSettings, PaymentsSettings, Settings,
};
use pipit::startup::run;
use pipit::store::Storage;

pub struct TestApp {
    pub address: String,
    pub storage: Storage,
}

fn test_settings() -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "127.0.0.1".to_string(),
            database_name: "pipit_test".to_string(),
        },
        application: ApplicationSettings {
            port: 0,
            platform: "dev".to_string(),
        },
        auth: AuthSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 5184000,
            issuer: "pipit".to_string(),
        },
        payments: PaymentsSettings {
            webhook_key: "test-webhook-key".to_string(),
        },
    }
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let storage = Storage::in_memory();
    let server = run(listener, storage.clone(), test_settings()).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address, storage }
}

/// Registers an account and returns its id.
async fn register_user(client: &reqwest::Client, address: &str, email: &str) -> String {
    let response = client
        .post(&format!("{}/api/users", address))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_str().expect("No user id").to_string()
}

async fn is_premium(client: &reqwest::Client, address: &str, email: &str) -> bool {
    let response = client
        .post(&format!("{}/api/login", address))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    body["user"]["is_premium"]
        .as_bool()
        .expect("No is_premium flag")
}

#[tokio::test]
async fn upgrade_event_marks_the_user_premium() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let user_id = register_user(&client, &app.address, "walt@example.com").await;
    assert!(!is_premium(&client, &app.address, "walt@example.com").await);

    let response = client
        .post(&format!("{}/api/webhooks/payments", &app.address))
        .header("Authorization", "ApiKey test-webhook-key")
        .json(&json!({
            "event": "user.upgraded",
            "data": { "user_id": user_id }
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(204, response.status().as_u16());
    assert!(is_premium(&client, &app.address, "walt@example.com").await);
}

#[tokio::test]
async fn wrong_api_key_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let user_id = register_user(&client, &app.address, "walt@example.com").await;

    let response = client
        .post(&format!("{}/api/webhooks/payments", &app.address))
        .header("Authorization", "ApiKey not-the-key")
        .json(&json!({
            "event": "user.upgraded",
            "data": { "user_id": user_id }
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "UNAUTHORIZED");

    assert!(!is_premium(&client, &app.address, "walt@example.com").await);
}

#[tokio::test]
async fn missing_api_key_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let user_id = register_user(&client, &app.address, "walt@example.com").await;

    let response = client
        .post(&format!("{}/api/webhooks/payments", &app.address))
        .json(&json!({
            "event": "user.upgraded",
            "data": { "user_id": user_id }
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn bearer_scheme_is_not_an_api_key() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let user_id = register_user(&client, &app.address, "walt@example.com").await;

    let response = client
        .post(&format!("{}/api/webhooks/payments", &app.address))
        .header("Authorization", "Bearer test-webhook-key")
        .json(&json!({
            "event": "user.upgraded",
            "data": { "user_id": user_id }
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn unknown_events_are_acknowledged_and_ignored() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let user_id = register_user(&client, &app.address, "walt@example.com").await;

    let response = client
        .post(&format!("{}/api/webhooks/payments", &app.address))
        .header("Authorization", "ApiKey test-webhook-key")
        .json(&json!({
            "event": "user.downgraded",
            "data": { "user_id": user_id }
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(204, response.status().as_u16());
    assert!(!is_premium(&client, &app.address, "walt@example.com").await);
}

#[tokio::test]
async fn upgrading_an_unknown_user_is_a_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/webhooks/payments", &app.address))
        .header("Authorization", "ApiKey test-webhook-key")
        .json(&json!({
            "event": "user.upgraded",
            "data": { "user_id": "00000000-0000-0000-0000-000000000000" }
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn malformed_user_id_is_a_400() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/webhooks/payments", &app.address))
        .header("Authorization", "ApiKey test-webhook-key")
        .json(&json!({
            "event": "user.upgraded",
            "data": { "user_id": "not-a-uuid" }
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}
