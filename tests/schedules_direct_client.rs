use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sd_xmltv::config::{FetchConfig, ServiceConfig};
use sd_xmltv::errors::SourceError;
use sd_xmltv::sources::{ListingsProvider, SchedulesDirectClient, ServiceInfo};

const PASSWORD_SHA1: &str = "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3";

fn client(server: &MockServer, fetch: FetchConfig) -> SchedulesDirectClient {
    let service = ServiceConfig {
        base_url: server.uri(),
        username: "user".to_string(),
        password: PASSWORD_SHA1.to_string(),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    SchedulesDirectClient::new(&service, &fetch).unwrap()
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_json(json!({"username": "user", "password": PASSWORD_SHA1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "OK",
            "serverID": "test",
            "token": "tok123"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_token_is_requested_once_and_sent_as_header() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/lineups/USA-MA02317-X"))
        .and(header("token", "tok123"))
        .and(header("verboseMap", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "map": [{"stationID": "20454", "channel": "4"}],
            "stations": [{"stationID": "20454", "name": "KOMO", "callsign": "KOMODT"}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server, FetchConfig::default());
    let first = client.channel_mapping("USA-MA02317-X").await.unwrap();
    let second = client.channel_mapping("USA-MA02317-X").await.unwrap();

    assert_eq!(first.map.len(), 1);
    assert_eq!(second.stations[0].callsign, "KOMODT");
    assert_eq!(client.token().await.unwrap(), "tok123");
}

#[tokio::test]
async fn test_schedules_are_batched_by_station() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    let dates = vec!["2024-03-01".to_string(), "2024-03-02".to_string()];

    Mock::given(method("POST"))
        .and(path("/schedules"))
        .and(body_json(json!([
            {"stationID": "1", "date": ["2024-03-01", "2024-03-02"]},
            {"stationID": "2", "date": ["2024-03-01", "2024-03-02"]}
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"stationID": "1", "programs": [
                {"programID": "EP1", "md5": "a", "airDateTime": "2024-03-01T00:00:00Z", "duration": 1800}
            ]},
            {"stationID": "2", "programs": []}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/schedules"))
        .and(body_json(json!([
            {"stationID": "3", "date": ["2024-03-01", "2024-03-02"]}
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"stationID": "3", "programs": []}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let fetch = FetchConfig {
        max_station_ids_per_request: 2,
        ..Default::default()
    };
    let client = client(&server, fetch);
    let station_ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
    let schedules = client.schedules(&station_ids, &dates).await.unwrap();

    let ids: Vec<_> = schedules.iter().map(|s| s.station_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(schedules[0].programs[0].md5, "a");
}

#[tokio::test]
async fn test_programs_are_batched() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/programs"))
        .and(body_json(json!(["EP1"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"programID": "EP1", "titles": [{"title120": "One"}]}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/programs"))
        .and(body_json(json!(["EP2"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"programID": "EP2"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let fetch = FetchConfig {
        max_program_ids_per_request: 1,
        ..Default::default()
    };
    let client = client(&server, fetch);
    let programs = client
        .programs(&["EP1".to_string(), "EP2".to_string()])
        .await
        .unwrap();

    assert_eq!(programs.len(), 2);
    assert_eq!(programs[0].titles[0].title120.as_deref(), Some("One"));
    assert_eq!(programs[1].program_id, "EP2");
}

#[tokio::test]
async fn test_token_failure_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 4003,
            "message": "Invalid user or password."
        })))
        .mount(&server)
        .await;

    let client = client(&server, FetchConfig::default());
    let err = client.status().await.unwrap_err();

    match err {
        SourceError::AuthenticationFailed { message } => assert!(message.contains("Invalid user")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/lineups"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = client(&server, FetchConfig::default());
    let err = client.lineups().await.unwrap_err();

    assert!(matches!(err, SourceError::Status { status: 403, ref message, .. } if message == "forbidden"));
}

#[tokio::test]
async fn test_headends_query_and_available_without_token() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/headends"))
        .and(query_param("country", "USA"))
        .and(query_param("postalcode", "02138"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"headend": "MA02317"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/available/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"North America": []})))
        .mount(&server)
        .await;

    let client = client(&server, FetchConfig::default());
    let headends = client.headends("USA", "02138").await.unwrap();
    let countries = client.available(Some("countries")).await.unwrap();

    assert_eq!(headends[0]["headend"], "MA02317");
    assert!(countries.get("North America").is_some());
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/programs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client(&server, FetchConfig::default());
    let err = client.programs(&["EP1".to_string()]).await.unwrap_err();

    assert!(matches!(err, SourceError::InvalidResponse { .. }));
}
