pub mod air_quality_service;

pub use air_quality_service::{
    fetch as fetch_air_quality, refresh as refresh_air_quality,
    request_fetch as request_air_quality_fetch, AirQualityServiceMessage,
};
