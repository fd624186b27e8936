//! AirKorea air quality client for airq
//!
//! Resolves the nearest monitoring station for a coordinate, fetches the
//! station's latest reading and grades every pollutant against a
//! configurable threshold table.

pub mod client;
pub mod error;
pub mod grade;
pub mod location;
pub mod measurement;
pub mod projection;
pub mod station;
pub mod types;
mod wire;

pub use client::{AirKoreaClient, ClientSettings};
pub use error::{AirQualityError, LocationError};
pub use grade::{classify, Thresholds, ThresholdTable};
pub use location::{FixedLocation, LocationProvider};
pub use measurement::{MeasurementFetcher, MeasurementRecord};
pub use projection::{TmCoordinate, TmProjection};
pub use station::{StationRecord, StationResolver};
pub use types::*;
