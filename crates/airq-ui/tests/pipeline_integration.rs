//! End-to-end tests: AirKorea mock server -> pipeline -> surfaces.

use std::sync::Arc;

use airq_airkorea::{
    AirKoreaClient, AirQualityError, ClientSettings, Coordinate, FixedLocation, Grade,
    LocationError, PollutantKind,
};
use airq_core::Locale;
use airq_ui::services::{fetch_air_quality, refresh_air_quality};
use airq_ui::{MainScreen, PipelineState, QueryPipeline, Surface, Widget, WidgetContent};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATIONS: &str = "/B552584/MsrstnInfoInqireSvc/getNearbyMsrstnList";
const MEASUREMENTS: &str = "/B552584/ArpltnInforInqireSvc/getMsrstnAcctoRltmMesureDnsty";

fn envelope(items: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "response": {
            "header": {"resultCode": "00", "resultMsg": "NORMAL_CODE"},
            "body": {"items": items}
        }
    })
}

async fn mount_station_a(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(STATIONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
            {"stationName": "Station-A", "addr": "1 Main St", "tm": 0.4}
        ]))))
        .mount(server)
        .await;
}

fn pipeline_for(server: &MockServer) -> Arc<QueryPipeline> {
    let client = AirKoreaClient::new(ClientSettings {
        base_url: server.uri(),
        service_key: "key".to_string(),
        ..Default::default()
    })
    .unwrap();
    Arc::new(QueryPipeline::with_client(Arc::new(client)))
}

#[tokio::test]
async fn test_reference_reading_reaches_both_surfaces() {
    let mock_server = MockServer::start().await;
    mount_station_a(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(MEASUREMENTS))
        .and(query_param("stationName", "Station-A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
            {"dataTime": "2024-05-01 15:00", "pm10Value": "45", "pm25Value": "20",
             "so2Value": "0.003", "coValue": "0.4", "o3Value": "0.040", "no2Value": "0.020",
             "khaiValue": "-", "khaiGrade": "2"}
        ]))))
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(&mock_server);
    let location = FixedLocation::new(Coordinate::new(37.5665, 126.978));
    let outcome = fetch_air_quality(&location, &pipeline).await.unwrap();

    assert_eq!(outcome.station.name, "Station-A");
    assert_eq!(outcome.station.distance_meters, Some(400.0));
    assert_eq!(outcome.measured.combined_grade(), Grade::Normal);
    assert_eq!(outcome.measured.grade(PollutantKind::O3), Grade::Normal);
    assert_eq!(outcome.measured.grade(PollutantKind::No2), Grade::Good);

    let mut screen = MainScreen::new(Locale::Ko);
    let mut widget = Widget::new(Locale::Ko);
    let state = pipeline.state();
    screen.on_state(&state);
    widget.on_state(&state);

    let content = screen.content().unwrap();
    assert_eq!(content.station_address, "1 Main St");
    assert_eq!(content.combined.label, "보통");
    assert_eq!(content.measured_at.as_deref(), Some("2024-05-01 15:00"));
    assert_eq!(
        widget.content(),
        &WidgetContent::Grade {
            emoji: "😃",
            label: "보통"
        }
    );
}

#[tokio::test]
async fn test_empty_directory_skips_measurement_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATIONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([]))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(MEASUREMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([]))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(&mock_server);
    let result = pipeline.run(Coordinate::new(37.5, 127.0)).await;

    assert!(matches!(result, Err(AirQualityError::NotFound(_))));

    let mut screen = MainScreen::new(Locale::En);
    screen.on_state(&pipeline.state());
    assert!(screen.is_error_visible());
    assert!(screen.accepts_runs());
}

#[tokio::test]
async fn test_measurement_outage_keeps_widget_content() {
    let mock_server = MockServer::start().await;
    mount_station_a(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(MEASUREMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
            {"dataTime": "2024-05-01 15:00", "khaiGrade": "1"}
        ]))))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(MEASUREMENTS))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(&mock_server);
    let mut widget = Widget::new(Locale::Ko);
    let coord = Coordinate::new(37.5, 127.0);

    pipeline.run(coord).await.unwrap();
    widget.on_state(&pipeline.state());
    assert_eq!(widget.render_line(), "😊 좋음");

    let result = pipeline.run(coord).await;
    assert!(matches!(
        result,
        Err(AirQualityError::Transport {
            status: Some(500),
            ..
        })
    ));
    assert!(matches!(pipeline.state(), PipelineState::Failed(_)));

    widget.on_state(&pipeline.state());
    assert_eq!(widget.render_line(), "😊 좋음");
}

#[tokio::test]
async fn test_permission_denied_ends_widget() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATIONS))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let pipeline = pipeline_for(&mock_server);
    let mut widget = Widget::new(Locale::Ko);
    let denied = FixedLocation::failing(LocationError::PermissionDenied);

    let result = refresh_air_quality(&widget, &denied, &pipeline).await.unwrap();
    assert_eq!(result, Err(AirQualityError::Permission));

    widget.on_result(result.as_ref());
    assert_eq!(widget.render_line(), "권한없음");
    assert!(!widget.accepts_runs());

    let granted = FixedLocation::new(Coordinate::new(37.5, 127.0));
    assert!(refresh_air_quality(&widget, &granted, &pipeline).await.is_none());
    assert_eq!(widget.render_line(), "권한없음");
    assert_eq!(pipeline.current_run(), 0);
}
