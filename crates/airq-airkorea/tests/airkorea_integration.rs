//! Integration tests for AirKoreaClient using wiremock.
//!
//! These tests drive the resolver and fetcher traits against a mock
//! AirKorea server.

use airq_airkorea::{
    AirKoreaClient, AirQualityError, ClientSettings, Coordinate, Grade, MeasurementFetcher,
    MonitoringStation, PollutantKind, StationResolver, Thresholds, ThresholdTable,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATIONS: &str = "/B552584/MsrstnInfoInqireSvc/getNearbyMsrstnList";
const MEASUREMENTS: &str = "/B552584/ArpltnInforInqireSvc/getMsrstnAcctoRltmMesureDnsty";

/// Helper to wrap items in the service envelope
fn envelope(items: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "response": {
            "header": {"resultCode": "00", "resultMsg": "NORMAL_CODE"},
            "body": {"totalCount": items.as_array().map(|a| a.len()).unwrap_or(0), "items": items}
        }
    })
}

fn client(server: &MockServer, thresholds: ThresholdTable) -> AirKoreaClient {
    AirKoreaClient::new(ClientSettings {
        base_url: server.uri(),
        service_key: "key".to_string(),
        thresholds,
        ..Default::default()
    })
    .unwrap()
}

fn station(name: &str) -> MonitoringStation {
    MonitoringStation {
        name: name.to_string(),
        address: String::new(),
        distance_meters: None,
    }
}

#[tokio::test]
async fn test_resolve_picks_first_candidate_in_service_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATIONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
            {"stationName": "Station-A", "addr": "1 Main St"},
            {"stationName": "Station-B", "addr": "2 Main St"}
        ]))))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, ThresholdTable::default());
    let station = client
        .resolve_nearest_station(Coordinate::new(37.57, 126.98))
        .await
        .unwrap();

    assert_eq!(station.name, "Station-A");
    assert_eq!(station.address, "1 Main St");
}

#[tokio::test]
async fn test_service_result_code_failure_is_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATIONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": {"header": {"resultCode": "22", "resultMsg": "LIMITED_NUMBER_OF_SERVICE_REQUESTS_EXCEEDS_ERROR"}}
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, ThresholdTable::default());
    let result = client
        .resolve_nearest_station(Coordinate::new(37.57, 126.98))
        .await;

    match result {
        Err(AirQualityError::Transport { message, .. }) => assert!(message.contains("22")),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_selects_newest_reading() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(MEASUREMENTS))
        .and(query_param("stationName", "Station-A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
            {"dataTime": "2024-05-01 13:00", "pm10Value": "160", "khaiGrade": "4"},
            {"dataTime": "2024-05-01 14:00", "pm10Value": "45", "pm25Value": "20",
             "so2Value": "0.003", "coValue": "0.4", "o3Value": "0.040", "no2Value": "0.020",
             "khaiGrade": "2"},
            {"dataTime": "2024-05-01 12:00", "pm10Value": "10", "khaiGrade": "1"}
        ]))))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, ThresholdTable::default());
    let measured = client
        .fetch_latest_measurement(&station("Station-A"))
        .await
        .unwrap();

    assert_eq!(measured.value(PollutantKind::Pm10), Some(45.0));
    assert_eq!(measured.grade(PollutantKind::Pm10), Grade::Normal);
    assert_eq!(measured.grade(PollutantKind::So2), Grade::Good);
    assert_eq!(measured.combined_grade(), Grade::Normal);
}

#[tokio::test]
async fn test_fetch_without_readings_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(MEASUREMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([]))))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, ThresholdTable::default());
    let result = client.fetch_latest_measurement(&station("Station-A")).await;

    assert!(matches!(result, Err(AirQualityError::NotFound(_))));
}

#[tokio::test]
async fn test_fetch_uses_configured_thresholds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(MEASUREMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
            {"dataTime": "2024-05-01 14:00", "pm10Value": 45}
        ]))))
        .mount(&mock_server)
        .await;

    let mut thresholds = ThresholdTable::default();
    thresholds.pm10 = Thresholds::new(50.0, 100.0, 200.0);

    let client = client(&mock_server, thresholds);
    let measured = client
        .fetch_latest_measurement(&station("Station-A"))
        .await
        .unwrap();

    assert_eq!(measured.grade(PollutantKind::Pm10), Grade::Good);
}
