//! Home-screen widget view model: combined emoji and label only.

use airq_airkorea::AirQualityError;
use airq_core::Locale;

use crate::presentation::{no_permission_text, GradePresentation};
use crate::run_state::{PipelineState, QueryOutcome};
use crate::surfaces::Surface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetContent {
    /// Nothing fetched yet
    Placeholder,
    NoPermission(&'static str),
    Grade {
        emoji: &'static str,
        label: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Widget {
    locale: Locale,
    content: WidgetContent,
    terminated: bool,
}

impl Widget {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            content: WidgetContent::Placeholder,
            terminated: false,
        }
    }

    pub fn on_state(&mut self, state: &PipelineState) {
        match state {
            PipelineState::Succeeded(outcome) => self.on_result(Ok(outcome)),
            PipelineState::Failed(e) => self.on_result(Err(e)),
            PipelineState::Idle | PipelineState::Running | PipelineState::Cancelled => {}
        }
    }

    /// Success replaces the content; other failures keep what was shown.
    pub fn on_result(&mut self, result: Result<&QueryOutcome, &AirQualityError>) {
        if self.terminated {
            return;
        }
        match result {
            Ok(outcome) => {
                let p = GradePresentation::of(outcome.measured.combined_grade(), self.locale);
                self.content = WidgetContent::Grade {
                    emoji: p.emoji,
                    label: p.label,
                };
            }
            Err(e) if e.is_terminal() => {
                self.content = WidgetContent::NoPermission(no_permission_text(self.locale));
                self.terminated = true;
            }
            Err(e) => {
                tracing::debug!("Widget keeps previous content after error: {}", e);
            }
        }
    }

    pub fn content(&self) -> &WidgetContent {
        &self.content
    }

    pub fn render_line(&self) -> String {
        match &self.content {
            WidgetContent::Placeholder => "-".to_string(),
            WidgetContent::NoPermission(text) => text.to_string(),
            WidgetContent::Grade { emoji, label } => format!("{} {}", emoji, label),
        }
    }
}

impl Surface for Widget {
    fn accepts_runs(&self) -> bool {
        !self.terminated
    }
}
