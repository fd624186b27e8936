//! Query run state machine.
//!
//! One run per surface. A run moves from `Running` to exactly one terminal
//! state; results that arrive after the run left `Running` are dropped.

use airq_airkorea::{AirQualityError, MeasuredValue, MonitoringStation};

/// A successful run: the resolved station and its graded reading.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub station: MonitoringStation,
    pub measured: MeasuredValue,
}

/// Observable state of the current run.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Running,
    Succeeded(QueryOutcome),
    Failed(AirQualityError),
    Cancelled,
}

impl PipelineState {
    pub fn is_running(&self) -> bool {
        matches!(self, PipelineState::Running)
    }

    /// True once the run reached a terminal state.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            PipelineState::Succeeded(_) | PipelineState::Failed(_) | PipelineState::Cancelled
        )
    }

    /// State after a new run starts. Any previous state is replaced.
    pub fn on_started(self) -> Self {
        PipelineState::Running
    }

    /// State after the running stages return.
    pub fn on_finished(self, result: Result<QueryOutcome, AirQualityError>) -> Self {
        match self {
            PipelineState::Running => match result {
                Ok(outcome) => PipelineState::Succeeded(outcome),
                Err(AirQualityError::Cancelled) => PipelineState::Cancelled,
                Err(e) => PipelineState::Failed(e),
            },
            other => other,
        }
    }

    /// State after an explicit cancel.
    pub fn on_cancelled(self) -> Self {
        match self {
            PipelineState::Running => PipelineState::Cancelled,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airq_airkorea::{PollutantValues, ThresholdTable};

    fn outcome() -> QueryOutcome {
        QueryOutcome {
            station: MonitoringStation {
                name: "Station-A".into(),
                address: String::new(),
                distance_meters: None,
            },
            measured: MeasuredValue::new(
                PollutantValues::default(),
                None,
                None,
                &ThresholdTable::default(),
            ),
        }
    }

    #[test]
    fn test_idle_is_neither_running_nor_finished() {
        let s = PipelineState::default();
        assert_eq!(s, PipelineState::Idle);
        assert!(!s.is_running());
        assert!(!s.is_finished());
    }

    #[test]
    fn test_start_replaces_any_state() {
        assert!(PipelineState::Idle.on_started().is_running());
        assert!(PipelineState::Cancelled.on_started().is_running());
        assert!(PipelineState::Failed(AirQualityError::Permission)
            .on_started()
            .is_running());
    }

    #[test]
    fn test_running_finishes_with_result() {
        let s = PipelineState::Running.on_finished(Ok(outcome()));
        assert_eq!(s, PipelineState::Succeeded(outcome()));

        let s = PipelineState::Running.on_finished(Err(AirQualityError::NotFound("x".into())));
        assert!(matches!(s, PipelineState::Failed(AirQualityError::NotFound(_))));

        let s = PipelineState::Running.on_finished(Err(AirQualityError::Cancelled));
        assert_eq!(s, PipelineState::Cancelled);
    }

    #[test]
    fn test_late_result_does_not_change_finished_state() {
        let s = PipelineState::Cancelled.on_finished(Ok(outcome()));
        assert_eq!(s, PipelineState::Cancelled);

        let s = PipelineState::Idle.on_finished(Err(AirQualityError::Permission));
        assert_eq!(s, PipelineState::Idle);
    }

    #[test]
    fn test_cancel_only_affects_running() {
        assert_eq!(PipelineState::Running.on_cancelled(), PipelineState::Cancelled);
        assert_eq!(
            PipelineState::Succeeded(outcome()).on_cancelled(),
            PipelineState::Succeeded(outcome())
        );
    }
}
