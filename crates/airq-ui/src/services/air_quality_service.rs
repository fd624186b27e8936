//! Air quality backend: location lookup followed by a pipeline run.
//! Network work runs on the tokio runtime; results come back over a channel.
//!
//! Refreshes are gated on the requesting surface: once a surface has ended
//! no location lookup or pipeline run is started for it.

use std::sync::Arc;

use airq_airkorea::{AirQualityError, Coordinate, LocationProvider};
use tokio::sync::mpsc::UnboundedSender;

use crate::pipeline::QueryPipeline;
use crate::run_state::QueryOutcome;
use crate::surfaces::Surface;

/// Messages sent from async operations back to the surfaces
#[derive(Debug)]
pub enum AirQualityServiceMessage {
    /// Result of one refresh
    FetchDone(Result<QueryOutcome, AirQualityError>),
}

async fn locate(location: &dyn LocationProvider) -> Result<Coordinate, AirQualityError> {
    let coord = location.current_location().await.map_err(|e| {
        tracing::warn!("Location lookup failed: {}", e);
        AirQualityError::from(e)
    })?;
    tracing::info!("Got location: {}, {}", coord.latitude, coord.longitude);
    Ok(coord)
}

/// Get the current location, then run the pipeline for it.
pub async fn fetch(
    location: &dyn LocationProvider,
    pipeline: &QueryPipeline,
) -> Result<QueryOutcome, AirQualityError> {
    let coord = locate(location).await?;
    pipeline.run(coord).await
}

/// Refresh on behalf of `surface`.
///
/// Returns `None` without starting anything once the surface has ended.
pub async fn refresh(
    surface: &dyn Surface,
    location: &dyn LocationProvider,
    pipeline: &QueryPipeline,
) -> Option<Result<QueryOutcome, AirQualityError>> {
    if !surface.accepts_runs() {
        tracing::debug!("Surface has ended; refresh skipped");
        return None;
    }
    Some(fetch(location, pipeline).await)
}

/// Request a refresh for `surface` asynchronously.
///
/// Sends `FetchDone` on the channel when complete. Returns false, and sends
/// nothing, if the surface has ended. The spawned task does not keep the
/// pipeline alive: dropping it mid-run yields `Cancelled`.
pub fn request_fetch(
    tx: &UnboundedSender<AirQualityServiceMessage>,
    runtime: &tokio::runtime::Handle,
    surface: &dyn Surface,
    location: Arc<dyn LocationProvider>,
    pipeline: &Arc<QueryPipeline>,
) -> bool {
    if !surface.accepts_runs() {
        tracing::debug!("Surface has ended; refresh request ignored");
        return false;
    }

    let tx = tx.clone();
    let pipeline = Arc::downgrade(pipeline);
    runtime.spawn(async move {
        let result = match locate(location.as_ref()).await {
            Ok(coord) => match pipeline.upgrade() {
                Some(pipeline) => {
                    let run = pipeline.start(coord);
                    drop(pipeline);
                    run.await.unwrap_or_else(|e| {
                        tracing::error!("Air quality task failed: {}", e);
                        Err(AirQualityError::Cancelled)
                    })
                }
                None => Err(AirQualityError::Cancelled),
            },
            Err(e) => Err(e),
        };
        if tx.send(AirQualityServiceMessage::FetchDone(result)).is_err() {
            tracing::debug!("Refresh finished after the receiver closed");
        }
    });
    true
}
