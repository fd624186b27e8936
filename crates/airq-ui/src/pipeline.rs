//! Query pipeline: resolve the nearest station, then fetch its latest reading.
//!
//! Only the most recent run may publish a result. Starting a run cancels the
//! previous one, and the commit step re-checks under the slot lock that the
//! run is still current before touching the observable state.
//!
//! Background runs hold only a weak reference to the pipeline, so dropping
//! the last owner cancels the run in flight.

use std::sync::{Arc, Weak};

use airq_airkorea::{
    AirKoreaClient, AirQualityError, Coordinate, MeasurementFetcher, StationResolver,
};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::run_state::{PipelineState, QueryOutcome};

/// The current-run slot. Guarded by one lock so cancel-then-replace is atomic.
struct RunSlot {
    run_id: u64,
    token: CancellationToken,
    state: PipelineState,
}

pub struct QueryPipeline {
    resolver: Arc<dyn StationResolver>,
    fetcher: Arc<dyn MeasurementFetcher>,
    slot: Mutex<RunSlot>,
    state_tx: watch::Sender<PipelineState>,
}

impl QueryPipeline {
    pub fn new(resolver: Arc<dyn StationResolver>, fetcher: Arc<dyn MeasurementFetcher>) -> Self {
        let (state_tx, _) = watch::channel(PipelineState::Idle);
        Self {
            resolver,
            fetcher,
            slot: Mutex::new(RunSlot {
                run_id: 0,
                token: CancellationToken::new(),
                state: PipelineState::Idle,
            }),
            state_tx,
        }
    }

    /// Pipeline backed by a single AirKorea client for both stages
    pub fn with_client(client: Arc<AirKoreaClient>) -> Self {
        Self::new(client.clone(), client)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PipelineState {
        self.slot.lock().state.clone()
    }

    /// Id of the most recently started run (0 before the first run)
    pub fn current_run(&self) -> u64 {
        self.slot.lock().run_id
    }

    /// Receive every committed state transition.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state_tx.subscribe()
    }

    /// Run a query to completion on the current task.
    ///
    /// Returns `Cancelled` if the run was superseded or cancelled before it
    /// could commit.
    pub async fn run(&self, coord: Coordinate) -> Result<QueryOutcome, AirQualityError> {
        let (run_id, token) = self.begin();
        let result = race(&token, self.resolver.as_ref(), self.fetcher.as_ref(), coord).await;
        self.commit(run_id, &token, result)
    }

    /// Start a query in the background.
    ///
    /// The run is registered (and any prior run cancelled) before this
    /// returns, so two `start` calls are ordered by call order. The task does
    /// not keep the pipeline alive; once it is dropped the run resolves to
    /// `Cancelled`.
    pub fn start(
        self: &Arc<Self>,
        coord: Coordinate,
    ) -> JoinHandle<Result<QueryOutcome, AirQualityError>> {
        let (run_id, token) = self.begin();
        let pipeline: Weak<Self> = Arc::downgrade(self);
        let resolver = Arc::clone(&self.resolver);
        let fetcher = Arc::clone(&self.fetcher);

        tokio::spawn(async move {
            let result = race(&token, resolver.as_ref(), fetcher.as_ref(), coord).await;
            match pipeline.upgrade() {
                Some(pipeline) => pipeline.commit(run_id, &token, result),
                None => {
                    tracing::debug!("Pipeline dropped; discarding run {}", run_id);
                    Err(AirQualityError::Cancelled)
                }
            }
        })
    }

    /// Cancel the current run, if one is in flight.
    pub fn cancel(&self) {
        let mut slot = self.slot.lock();
        slot.token.cancel();
        if slot.state.is_running() {
            tracing::info!("Air quality run {} cancelled", slot.run_id);
            slot.state = std::mem::take(&mut slot.state).on_cancelled();
            self.state_tx.send_replace(slot.state.clone());
        }
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let mut slot = self.slot.lock();
        slot.token.cancel();

        slot.run_id += 1;
        slot.token = CancellationToken::new();
        slot.state = std::mem::take(&mut slot.state).on_started();
        self.state_tx.send_replace(slot.state.clone());

        tracing::info!("Air quality run {} started", slot.run_id);
        (slot.run_id, slot.token.clone())
    }

    fn commit(
        &self,
        run_id: u64,
        token: &CancellationToken,
        result: Result<QueryOutcome, AirQualityError>,
    ) -> Result<QueryOutcome, AirQualityError> {
        let mut slot = self.slot.lock();
        if slot.run_id != run_id || token.is_cancelled() {
            tracing::debug!("Discarding result of superseded run {}", run_id);
            return Err(AirQualityError::Cancelled);
        }

        match &result {
            Ok(outcome) => tracing::info!(
                "Air quality run {} succeeded: {} ({:?})",
                run_id,
                outcome.station.name,
                outcome.measured.combined_grade()
            ),
            Err(e) => tracing::warn!("Air quality run {} failed: {}", run_id, e),
        }

        slot.state = std::mem::take(&mut slot.state).on_finished(result.clone());
        self.state_tx.send_replace(slot.state.clone());
        result
    }
}

impl Drop for QueryPipeline {
    fn drop(&mut self) {
        let slot = self.slot.get_mut();
        slot.token.cancel();
        if slot.state.is_running() {
            tracing::info!("Air quality run {} cancelled on drop", slot.run_id);
            slot.state = std::mem::take(&mut slot.state).on_cancelled();
            self.state_tx.send_replace(slot.state.clone());
        }
    }
}

/// Execute both stages unless `token` fires first.
async fn race(
    token: &CancellationToken,
    resolver: &dyn StationResolver,
    fetcher: &dyn MeasurementFetcher,
    coord: Coordinate,
) -> Result<QueryOutcome, AirQualityError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AirQualityError::Cancelled),
        result = execute(resolver, fetcher, coord) => result,
    }
}

async fn execute(
    resolver: &dyn StationResolver,
    fetcher: &dyn MeasurementFetcher,
    coord: Coordinate,
) -> Result<QueryOutcome, AirQualityError> {
    let station = resolver.resolve_nearest_station(coord).await?;
    let measured = fetcher.fetch_latest_measurement(&station).await?;
    Ok(QueryOutcome { station, measured })
}
