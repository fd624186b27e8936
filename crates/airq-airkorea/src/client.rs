//! AirKorea open API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::AirQualityError;
use crate::grade::ThresholdTable;
use crate::measurement::{select_latest, MeasurementFetcher, MeasurementRecord};
use crate::projection::TmProjection;
use crate::station::{select_nearest, StationRecord, StationResolver};
use crate::types::{Coordinate, MeasuredValue, MonitoringStation};
use crate::wire::Envelope;

pub const AIRKOREA_API_BASE: &str = "https://apis.data.go.kr";
const NEARBY_STATIONS_PATH: &str = "B552584/MsrstnInfoInqireSvc/getNearbyMsrstnList";
const REALTIME_MEASUREMENTS_PATH: &str = "B552584/ArpltnInforInqireSvc/getMsrstnAcctoRltmMesureDnsty";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    /// Decoded service key; it is percent-encoded into the query string
    pub service_key: String,
    /// Measurement history window, `DAILY` for the last 24 hours
    pub data_term: String,
    pub api_version: String,
    pub timeout: Duration,
    pub thresholds: ThresholdTable,
    pub projection: TmProjection,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: AIRKOREA_API_BASE.to_string(),
            service_key: String::new(),
            data_term: "DAILY".to_string(),
            api_version: "1.3".to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            thresholds: ThresholdTable::default(),
            projection: TmProjection::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AirKoreaClient {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl AirKoreaClient {
    pub fn new(settings: ClientSettings) -> Result<Self, AirQualityError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.settings.thresholds
    }

    /// List monitoring stations near a coordinate, in service order.
    #[instrument(skip(self), level = "info")]
    pub async fn nearby_stations(
        &self,
        coord: Coordinate,
    ) -> Result<Vec<StationRecord>, AirQualityError> {
        let tm = self.settings.projection.project(coord);
        tracing::debug!("Projected to TM ({:.3}, {:.3})", tm.x, tm.y);

        self.get_items(
            NEARBY_STATIONS_PATH,
            &[("tmX", format!("{:.3}", tm.x)), ("tmY", format!("{:.3}", tm.y))],
        )
        .await
    }

    /// List the recent readings of a station.
    #[instrument(skip(self), level = "info")]
    pub async fn realtime_measurements(
        &self,
        station_name: &str,
    ) -> Result<Vec<MeasurementRecord>, AirQualityError> {
        self.get_items(
            REALTIME_MEASUREMENTS_PATH,
            &[
                ("stationName", station_name.to_string()),
                ("dataTerm", self.settings.data_term.clone()),
                ("ver", self.settings.api_version.clone()),
            ],
        )
        .await
    }

    async fn get_items<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AirQualityError> {
        let url = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("serviceKey", self.settings.service_key.as_str()),
                ("returnType", "json"),
            ])
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Vec<T>, AirQualityError> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("AirKorea returned status {}", status);
            return Err(AirQualityError::Transport {
                status: Some(status.as_u16()),
                message: text,
            });
        }

        let body = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        envelope.into_items()
    }
}

#[async_trait]
impl StationResolver for AirKoreaClient {
    async fn resolve_nearest_station(
        &self,
        coord: Coordinate,
    ) -> Result<MonitoringStation, AirQualityError> {
        let records = self.nearby_stations(coord).await?;
        tracing::debug!("Directory returned {} candidates", records.len());

        let station = select_nearest(records)?;
        tracing::info!("Nearest station: {} ({})", station.name, station.address);
        Ok(station)
    }
}

#[async_trait]
impl MeasurementFetcher for AirKoreaClient {
    async fn fetch_latest_measurement(
        &self,
        station: &MonitoringStation,
    ) -> Result<MeasuredValue, AirQualityError> {
        let records = self.realtime_measurements(&station.name).await?;
        tracing::debug!("{} readings for {}", records.len(), station.name);

        let latest = select_latest(records).ok_or_else(|| {
            AirQualityError::NotFound(format!("no readings for station {}", station.name))
        })?;
        Ok(latest.into_measured(&self.settings.thresholds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AirKoreaClient {
        AirKoreaClient::new(ClientSettings {
            base_url: server.uri(),
            service_key: "test-key".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_nearby_stations_sends_projected_coordinates() {
        let mock_server = MockServer::start().await;
        let coord = Coordinate::new(37.5665, 126.978);
        let tm = TmProjection::default().project(coord);

        Mock::given(method("GET"))
            .and(path(format!("/{}", NEARBY_STATIONS_PATH)))
            .and(query_param("serviceKey", "test-key"))
            .and(query_param("returnType", "json"))
            .and(query_param("tmX", format!("{:.3}", tm.x)))
            .and(query_param("tmY", format!("{:.3}", tm.y)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {
                    "header": {"resultCode": "00", "resultMsg": "NORMAL_CODE"},
                    "body": {
                        "totalCount": 2,
                        "items": [
                            {"stationName": "중구", "addr": "서울 중구 덕수궁길 15", "tm": 0.9},
                            {"stationName": "종로구", "addr": "서울 종로구 종로35가길 19", "tm": 1.7}
                        ]
                    }
                }
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let records = client.nearby_stations(coord).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].station_name.as_deref(), Some("중구"));
        assert_eq!(records[1].tm.as_deref(), Some("1.7"));
    }

    #[tokio::test]
    async fn test_decoded_service_key_is_encoded_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/{}", REALTIME_MEASUREMENTS_PATH)))
            .and(query_param("serviceKey", "ab+c/d=="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {
                    "header": {"resultCode": "00", "resultMsg": "NORMAL_CODE"},
                    "body": {"items": []}
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AirKoreaClient::new(ClientSettings {
            base_url: mock_server.uri(),
            service_key: "ab+c/d==".to_string(),
            ..Default::default()
        })
        .unwrap();
        client.realtime_measurements("중구").await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default();
        assert!(query.contains("serviceKey=ab%2Bc%2Fd%3D%3D"));
    }

    #[tokio::test]
    async fn test_realtime_measurements_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/{}", REALTIME_MEASUREMENTS_PATH)))
            .and(query_param("stationName", "중구"))
            .and(query_param("dataTerm", "DAILY"))
            .and(query_param("ver", "1.3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {
                    "header": {"resultCode": "00", "resultMsg": "NORMAL_CODE"},
                    "body": {"items": [{"dataTime": "2024-05-01 15:00", "pm10Value": "45"}]}
                }
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let records = client.realtime_measurements("중구").await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pm10_value.as_deref(), Some("45"));
    }

    #[tokio::test]
    async fn test_server_error_is_transport() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.nearby_stations(Coordinate::new(37.0, 127.0)).await;

        assert!(matches!(
            result,
            Err(AirQualityError::Transport {
                status: Some(503),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<OpenAPI_ServiceResponse><cmmMsgHeader/></OpenAPI_ServiceResponse>"),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.realtime_measurements("중구").await;

        assert!(matches!(result, Err(AirQualityError::Parse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport() {
        let client = AirKoreaClient::new(ClientSettings {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        let result = client.nearby_stations(Coordinate::new(37.0, 127.0)).await;
        assert!(matches!(result, Err(AirQualityError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_resolver_fails_not_found_on_empty_directory() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/{}", NEARBY_STATIONS_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {
                    "header": {"resultCode": "00", "resultMsg": "NORMAL_CODE"},
                    "body": {"totalCount": 0, "items": []}
                }
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client
            .resolve_nearest_station(Coordinate::new(37.0, 127.0))
            .await;

        assert!(matches!(result, Err(AirQualityError::NotFound(_))));
    }
}
