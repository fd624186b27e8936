//! Main screen view model.
//!
//! Holds everything the renderer draws: station, combined grade, and one line
//! per pollutant. Failures toggle a single error view; a permission failure
//! ends the screen.

use airq_airkorea::{AirQualityError, Grade, PollutantKind};
use airq_core::Locale;

use crate::presentation::{pollutant_label, GradePresentation};
use crate::run_state::{PipelineState, QueryOutcome};
use crate::surfaces::Surface;

/// Pollutants listed on the main screen, in display order
const LISTED: [PollutantKind; 6] = [
    PollutantKind::Pm10,
    PollutantKind::Pm25,
    PollutantKind::So2,
    PollutantKind::Co,
    PollutantKind::O3,
    PollutantKind::No2,
];

#[derive(Debug, Clone, PartialEq)]
pub struct PollutantLine {
    pub kind: PollutantKind,
    pub label: &'static str,
    pub value: Option<f64>,
    pub unit: &'static str,
    pub grade: Grade,
    pub presentation: GradePresentation,
}

impl PollutantLine {
    pub fn value_text(&self, show_units: bool) -> String {
        match self.value {
            Some(v) if show_units => format!("{} {}", v, self.unit),
            Some(v) => v.to_string(),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MainScreenContent {
    pub station_name: String,
    pub station_address: String,
    pub measured_at: Option<String>,
    pub combined: GradePresentation,
    pub pollutants: Vec<PollutantLine>,
}

impl MainScreenContent {
    pub fn from_outcome(outcome: &QueryOutcome, locale: Locale) -> Self {
        let measured = &outcome.measured;
        let pollutants = LISTED
            .iter()
            .map(|&kind| {
                let reading = measured.reading(kind);
                PollutantLine {
                    kind,
                    label: pollutant_label(kind, locale),
                    value: reading.value,
                    unit: kind.unit(),
                    grade: reading.grade,
                    presentation: GradePresentation::of(reading.grade, locale),
                }
            })
            .collect();

        Self {
            station_name: outcome.station.name.clone(),
            station_address: outcome.station.address.clone(),
            measured_at: measured
                .measured_at()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            combined: GradePresentation::of(measured.combined_grade(), locale),
            pollutants,
        }
    }

    pub fn line(&self, kind: PollutantKind) -> Option<&PollutantLine> {
        self.pollutants.iter().find(|l| l.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub struct MainScreen {
    locale: Locale,
    loading: bool,
    content: Option<MainScreenContent>,
    error: Option<&'static str>,
    terminated: bool,
}

impl MainScreen {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            loading: false,
            content: None,
            error: None,
            terminated: false,
        }
    }

    /// Apply a pipeline state transition.
    pub fn on_state(&mut self, state: &PipelineState) {
        match state {
            PipelineState::Idle => {}
            PipelineState::Running => self.on_loading(),
            PipelineState::Succeeded(outcome) => self.on_result(Ok(outcome)),
            PipelineState::Failed(e) => self.on_result(Err(e)),
            PipelineState::Cancelled => self.on_result(Err(&AirQualityError::Cancelled)),
        }
    }

    pub fn on_loading(&mut self) {
        if self.terminated {
            return;
        }
        self.loading = true;
        self.error = None;
    }

    pub fn on_result(&mut self, result: Result<&QueryOutcome, &AirQualityError>) {
        if self.terminated {
            return;
        }
        match result {
            Ok(outcome) => {
                self.content = Some(MainScreenContent::from_outcome(outcome, self.locale));
                self.error = None;
            }
            Err(e) if e.is_silent() => {}
            Err(e) if e.is_terminal() => {
                tracing::warn!("Main screen closed: {}", e);
                self.terminated = true;
                self.content = None;
                self.error = Some(e.user_message());
            }
            Err(e) => {
                tracing::debug!("Main screen showing error: {}", e);
                self.content = None;
                self.error = Some(e.user_message());
            }
        }
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn content(&self) -> Option<&MainScreenContent> {
        self.content.as_ref()
    }

    pub fn is_error_visible(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error
    }

    /// Plain-text rendering for terminals
    pub fn render_text(&self, show_units: bool) -> String {
        if let Some(message) = self.error {
            return message.to_string();
        }
        let Some(content) = &self.content else {
            return String::new();
        };

        let mut out = format!("{}\n{}\n", content.station_name, content.station_address);
        if let Some(at) = &content.measured_at {
            out.push_str(at);
            out.push('\n');
        }
        out.push_str(&format!(
            "\n{} {}\n\n",
            content.combined.emoji, content.combined.label
        ));
        for line in &content.pollutants {
            out.push_str(&format!(
                "{}: {} {}\n",
                line.label,
                line.value_text(show_units),
                line.presentation
            ));
        }
        out
    }
}

impl Surface for MainScreen {
    fn accepts_runs(&self) -> bool {
        !self.terminated
    }
}
