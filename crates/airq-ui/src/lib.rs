//! Query pipeline and display surfaces for airq.

pub mod pipeline;
pub mod presentation;
pub mod run_state;
pub mod services;
pub mod surfaces;

pub use pipeline::QueryPipeline;
pub use presentation::{GradeColor, GradePresentation};
pub use run_state::{PipelineState, QueryOutcome};
pub use surfaces::{MainScreen, Surface, Widget, WidgetContent};
