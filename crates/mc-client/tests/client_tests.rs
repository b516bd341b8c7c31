//! ApiClient Tests
//!
//! Tests for:
//! - Bearer credential attachment and omission
//! - JSON vs text response handling
//! - Error message normalization
//! - Template not-found substitution
//! - Bulk send report parsing
//! - Sign-in / sign-out credential lifecycle

use std::sync::Arc;
use std::time::Duration;

use mc_client::{ApiClient, ClientConfig, ClientError, MailApi, ResponseBody};
use mc_common::{ContactUpdate, FailedRecipient, NewContact, SendRequest, Template};
use mc_credentials::{CredentialStore, MemoryCredentialStore};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, store: Arc<MemoryCredentialStore>) -> ApiClient {
    ApiClient::new(ClientConfig::new(format!("{}/api", server.uri())), store).unwrap()
}

fn anonymous_client(server: &MockServer) -> ApiClient {
    client_for(server, Arc::new(MemoryCredentialStore::new()))
}

#[tokio::test]
async fn test_no_credential_omits_authorization_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    client.list_contacts().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert!(requests[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn test_credential_sent_as_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .and(header("Authorization", "Bearer test-token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_token("test-token-123"));
    let client = client_for(&mock_server, store);
    client.list_contacts().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let values: Vec<_> = requests[0].headers.get_all("authorization").iter().collect();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0], "Bearer test-token-123");
}

#[tokio::test]
async fn test_credential_read_per_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/template"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"body": "x"})))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = client_for(&mock_server, store.clone());

    client.get_template().await.unwrap();
    store.set("late-token").await;
    client.get_template().await.unwrap();
    store.clear().await;
    client.get_template().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(requests[1].headers.get("authorization").unwrap(), "Bearer late-token");
    assert!(requests[2].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_body_sent_as_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/contacts"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(serde_json::json!({
            "name": "Alice",
            "email": "alice@example.com",
            "company": "Acme"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "_id": "c1",
            "name": "Alice",
            "email": "alice@example.com",
            "company": "Acme"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let created = client
        .create_contact(&NewContact {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            company: Some("Acme".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(created.id, "c1");
}

#[tokio::test]
async fn test_update_and_delete_contact_paths() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/contacts/c1"))
        .and(body_json(serde_json::json!({"company": "Globex"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "_id": "c1",
            "name": "Alice",
            "email": "alice@example.com",
            "company": "Globex"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/contacts/c1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let updated = client
        .update_contact(
            "c1",
            &ContactUpdate {
                company: Some("Globex".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.company.as_deref(), Some("Globex"));

    let ack = client.delete_contact("c1").await.unwrap();
    assert_eq!(ack, ResponseBody::Text(String::new()));
}

#[tokio::test]
async fn test_text_response_kept_as_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_raw("Registered", "text/plain"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let ack = client
        .register(&mc_common::RegisterRequest {
            name: "Ops".to_string(),
            email: "ops@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(ack, ResponseBody::Text("Registered".to_string()));
}

#[tokio::test]
async fn test_json_error_message_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"message": "server error"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let err = client.list_contacts().await.unwrap_err();

    assert!(matches!(err, ClientError::Status { status: 500, .. }));
    assert_eq!(err.message(), "server error");
}

#[tokio::test]
async fn test_text_error_uses_status_description() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .respond_with(ResponseTemplate::new(500).set_body_raw("<h1>oops</h1>", "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let err = client.list_contacts().await.unwrap_err();

    assert_eq!(err.message(), "Internal Server Error");
}

#[tokio::test]
async fn test_json_body_with_text_content_type_not_parsed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .respond_with(ResponseTemplate::new(400).set_body_raw(r#"{"message":"hidden"}"#, "text/plain"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let err = client.list_contacts().await.unwrap_err();

    assert_eq!(err.message(), "Bad Request");
}

#[tokio::test]
async fn test_template_not_found_yields_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/template"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Template not found"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let template = client.get_template().await.unwrap();

    assert_eq!(template, Template::default());
    assert_eq!(template.body, "");
}

#[tokio::test]
async fn test_template_without_string_body_yields_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/template"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("", "text/plain"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/template"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"body": 42})))
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);

    assert_eq!(client.get_template().await.unwrap(), Template::default());
    assert_eq!(client.get_template().await.unwrap(), Template::default());
}

#[tokio::test]
async fn test_template_other_failures_surface() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/template"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({"message": "Unauthorized"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let err = client.get_template().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.message(), "Unauthorized");
}

#[tokio::test]
async fn test_save_template() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/template"))
        .and(body_json(serde_json::json!({"body": "Hello [Name]"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"body": "Hello [Name]"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let saved = client.save_template(&Template::new("Hello [Name]")).await.unwrap();

    assert_eq!(saved.body, "Hello [Name]");
}

#[tokio::test]
async fn test_send_bulk_email_report() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/send-email"))
        .and(body_json(serde_json::json!({
            "contactIds": ["a", "b"],
            "subject": "Hi",
            "messageTemplate": "Hello [Name]"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "report": {
                "sent": ["Alice"],
                "failed": [{"name": "Bob", "reason": "invalid address"}]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let request = SendRequest::new(
        ["a", "b"].iter().map(|s| s.to_string()).collect(),
        "Hi",
        "Hello [Name]",
    )
    .unwrap();

    let report = client.send_bulk_email(&request).await.unwrap();

    assert_eq!(report.sent, vec!["Alice".to_string()]);
    assert_eq!(report.failed, vec![FailedRecipient::new("Bob", "invalid address")]);
}

#[tokio::test]
async fn test_send_without_report_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/send-email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "queued"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let request =
        SendRequest::new(["a"].iter().map(|s| s.to_string()).collect(), "Hi", "Body").unwrap();

    let err = client.send_bulk_email(&request).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_sign_in_stores_credential() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(serde_json::json!({"email": "ops@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"accessToken": "jwt-1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = client_for(&mock_server, store.clone());

    client.sign_in("ops@example.com", "secret").await.unwrap();
    assert_eq!(store.get().await.as_deref(), Some("jwt-1"));
    assert!(client.is_authenticated().await);

    client.sign_out().await;
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_sign_in_without_token_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_token("previous"));
    let client = client_for(&mock_server, store.clone());

    let err = client.sign_in("ops@example.com", "secret").await.unwrap_err();
    assert!(err.message().starts_with("Invalid server response"));
    assert_eq!(store.get().await.as_deref(), Some("previous"));
}

#[tokio::test]
async fn test_sign_in_failure_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"message": "Invalid credentials"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let err = client.sign_in("ops@example.com", "wrong").await.unwrap_err();

    assert_eq!(err.message(), "Invalid credentials");
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = ApiClient::new(
        ClientConfig::new(format!("http://127.0.0.1:{}/api", port)),
        Arc::new(MemoryCredentialStore::new()),
    )
    .unwrap();

    let err = client.list_contacts().await.unwrap_err();
    assert!(err.is_transport());
    assert!(err.status().is_none());
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(
        ClientConfig::new(format!("{}/api", mock_server.uri())).with_timeout(Duration::from_millis(200)),
        Arc::new(MemoryCredentialStore::new()),
    )
    .unwrap();

    let err = client.list_contacts().await.unwrap_err();
    assert_eq!(err.message(), "Request timeout");
}

#[tokio::test]
async fn test_null_contact_list_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Null))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    assert!(client.list_contacts().await.unwrap().is_empty());
}
