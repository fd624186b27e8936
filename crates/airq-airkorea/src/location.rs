//! Location capability.
//!
//! The platform provider lives outside this crate; anything that can yield a
//! coordinate implements [`LocationProvider`].

use async_trait::async_trait;

use crate::error::LocationError;
use crate::types::Coordinate;

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Coordinate, LocationError>;
}

/// Always reports the same coordinate, or the same failure.
#[derive(Debug, Clone)]
pub struct FixedLocation {
    result: Result<Coordinate, LocationError>,
}

impl FixedLocation {
    pub fn new(coord: Coordinate) -> Self {
        Self { result: Ok(coord) }
    }

    pub fn failing(error: LocationError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        self.result.clone()
    }
}
