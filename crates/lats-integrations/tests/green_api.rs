//! Green API client against a mock vendor.

use lats_core::{Integration, IntegrationKind};
use lats_integrations::{GreenApiClient, IntegrationError, MessageChannel, Messenger};
use mockito::{Matcher, Server};
use serde_json::{json, Map, Value};
use std::time::Duration;

fn integration(api_url: &str) -> Integration {
    let as_map = |v: Value| match v {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    Integration {
        kind: IntegrationKind::WhatsappGreenApi,
        is_enabled: true,
        credentials: as_map(json!({"instance_id": "1101", "api_token": "tok123"})),
        config: as_map(json!({"api_url": api_url})),
    }
}

fn client(server: &Server) -> GreenApiClient {
    GreenApiClient::from_integration(
        Some(&integration(&server.url())),
        "https://api.green-api.com",
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn send_message_posts_chat_id_and_returns_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/waInstance1101/sendMessage/tok123")
        .match_body(Matcher::PartialJson(json!({
            "chatId": "255712345678@c.us",
            "message": "Your order is ready"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"idMessage":"BAE5F4886F6F2D05"}"#)
        .create_async()
        .await;

    let outcome = MessageChannel::send(&client(&server), "+255 712 345 678", "Your order is ready").await;

    mock.assert_async().await;
    assert!(outcome.success);
    assert_eq!(outcome.message_id.as_deref(), Some("BAE5F4886F6F2D05"));
}

#[tokio::test]
async fn vendor_errors_become_failed_outcomes() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/waInstance1101/sendMessage/tok123")
        .with_status(466)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"quota exceeded"}"#)
        .create_async()
        .await;

    let outcome = MessageChannel::send(&client(&server), "255712345678", "hi").await;

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("HTTP 466: quota exceeded"));
}

#[tokio::test]
async fn server_error_without_json_uses_body_text() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/waInstance1101/getStateInstance/tok123")
        .with_status(502)
        .with_body("upstream down")
        .create_async()
        .await;

    let err = client(&server).get_state_instance().await.unwrap_err();
    assert_eq!(
        err,
        IntegrationError::Http {
            status: 502,
            message: "upstream down".into()
        }
    );
}

#[tokio::test]
async fn state_and_settings_round_trip() {
    let mut server = Server::new_async().await;
    let state = server
        .mock("GET", "/waInstance1101/getStateInstance/tok123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"stateInstance":"authorized"}"#)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/waInstance1101/getSettings/tok123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"wid":"255712345678@c.us","delaySendMessagesMilliseconds":1000}"#)
        .create_async()
        .await;
    let set = server
        .mock("POST", "/waInstance1101/setSettings/tok123")
        .match_body(Matcher::Json(json!({"delaySendMessagesMilliseconds": 500})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"saveSettings":true}"#)
        .create_async()
        .await;

    let client = client(&server);

    assert!(client.get_state_instance().await.unwrap().is_authorized());

    let settings = client.get_settings().await.unwrap();
    assert_eq!(settings["delaySendMessagesMilliseconds"], 1000);

    let mut update = Map::new();
    update.insert("delaySendMessagesMilliseconds".into(), json!(500));
    client.set_settings(&update).await.unwrap();

    state.assert_async().await;
    get.assert_async().await;
    set.assert_async().await;
}

#[tokio::test]
async fn refused_settings_are_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/waInstance1101/setSettings/tok123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"saveSettings":false}"#)
        .create_async()
        .await;

    let err = client(&server).set_settings(&Map::new()).await.unwrap_err();
    assert!(matches!(err, IntegrationError::Rejected(_)));
}

#[tokio::test]
async fn unexpected_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/waInstance1101/sendMessage/tok123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unexpected":true}"#)
        .create_async()
        .await;

    let err = client(&server).send_message("255712345678", "hi").await.unwrap_err();
    assert!(matches!(err, IntegrationError::Decode(_)));
}

#[tokio::test]
async fn disabled_integration_never_calls_vendor() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut row = integration(&server.url());
    row.is_enabled = false;

    let messenger = Messenger::new().with(
        IntegrationKind::WhatsappGreenApi,
        GreenApiClient::from_integration(Some(&row), "https://api.green-api.com", Duration::from_secs(5)),
    );
    let outcome = messenger
        .send(IntegrationKind::WhatsappGreenApi, "255712345678", "hi")
        .await;

    mock.assert_async().await;
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("Admin Settings → Integrations"));
}

#[tokio::test]
async fn invalid_phone_is_reported_before_any_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let outcome = MessageChannel::send(&client(&server), "not-a-phone", "hi").await;

    mock.assert_async().await;
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().starts_with("Invalid phone number"));
}
