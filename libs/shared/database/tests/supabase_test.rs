use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::{AppConfig, StoreBackend};
use shared_database::{Collection, DocumentStore, SupabaseClient};

fn test_config(url: &str) -> AppConfig {
    AppConfig {
        supabase_url: url.to_string(),
        supabase_service_key: "test-service-key".to_string(),
        supabase_jwt_secret: "test-secret".to_string(),
        store_backend: StoreBackend::Supabase,
        port: 3000,
    }
}

async fn connected_client(mock_server: &MockServer) -> SupabaseClient {
    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(mock_server)
        .await;

    SupabaseClient::connect(&test_config(&mock_server.uri())).await.unwrap()
}

#[tokio::test]
async fn test_connect_requires_configuration() {
    let mut config = test_config("");
    config.supabase_service_key = String::new();
    assert!(SupabaseClient::connect(&config).await.is_err());
}

#[tokio::test]
async fn test_find_one_queries_key_column() {
    let mock_server = MockServer::start().await;
    let client = connected_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/universal_timeslots"))
        .and(query_param("date", "eq.2025-06-10"))
        .and(header("apikey", "test-service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"date": "2025-06-10", "slots": [{"from": "09:00", "to": "10:00"}]}
        ])))
        .mount(&mock_server)
        .await;

    let doc = client
        .find_one(Collection::UniversalTimeslots, "2025-06-10")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc["slots"][0]["from"], "09:00");
}

#[tokio::test]
async fn test_find_one_empty_result_is_none() {
    let mock_server = MockServer::start().await;
    let client = connected_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    assert!(client.find_one(Collection::Therapists, "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_upserts_on_key_column() {
    let mock_server = MockServer::start().await;
    let client = connected_client(&mock_server).await;
    let document = json!({"id": "b1", "status": "PENDING"});

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("on_conflict", "id"))
        .and(header("Prefer", "resolution=merge-duplicates,return=minimal"))
        .and(body_json(document.clone()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    client.save(Collection::Bookings, "b1", document).await.unwrap();
}

#[tokio::test]
async fn test_server_error_propagates() {
    let mock_server = MockServer::start().await;
    let client = connected_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapists"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let err = client.find(Collection::Therapists).await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_closed_client_rejects_calls() {
    let mock_server = MockServer::start().await;
    let client = connected_client(&mock_server).await;

    client.close().await.unwrap();
    assert!(client.find(Collection::Therapists).await.is_err());
}
