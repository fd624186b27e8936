//! Nearby-station records and the nearest-station selection policy.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AirQualityError;
use crate::types::{Coordinate, MonitoringStation};
use crate::wire::{parse_number, string_or_number};

/// One candidate from the nearby-station directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    pub station_name: Option<String>,
    pub addr: Option<String>,
    /// Distance from the query point in km, as reported by the service
    #[serde(default, deserialize_with = "string_or_number")]
    pub tm: Option<String>,
}

impl StationRecord {
    fn distance_km(&self) -> Option<f64> {
        parse_number(self.tm.as_deref())
    }

    fn into_station(self) -> Option<MonitoringStation> {
        let distance_meters = self.distance_km().map(|km| km * 1000.0);
        let name = self.station_name.filter(|n| !n.trim().is_empty())?;
        Some(MonitoringStation {
            name,
            address: self.addr.unwrap_or_default(),
            distance_meters,
        })
    }
}

/// Resolves the monitoring station closest to a coordinate
#[async_trait]
pub trait StationResolver: Send + Sync {
    async fn resolve_nearest_station(
        &self,
        coord: Coordinate,
    ) -> Result<MonitoringStation, AirQualityError>;
}

/// Pick the nearest usable candidate.
///
/// Candidates with a reported distance come first, ordered by it; the rest
/// keep the service's order. Distance is never recomputed locally. Records
/// without a station name cannot be queried further and are skipped.
pub fn select_nearest(records: Vec<StationRecord>) -> Result<MonitoringStation, AirQualityError> {
    let total = records.len();
    let mut stations: Vec<MonitoringStation> = records
        .into_iter()
        .filter_map(StationRecord::into_station)
        .collect();

    // stable sort: equal or missing distances keep service order
    stations.sort_by(|a, b| match (a.distance_meters, b.distance_meters) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    stations.into_iter().next().ok_or_else(|| {
        AirQualityError::NotFound(format!(
            "no monitoring station among {} candidates",
            total
        ))
    })
}
