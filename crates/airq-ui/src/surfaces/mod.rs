//! Display surfaces fed by the query pipeline.

pub mod main_screen;
pub mod widget;

pub use main_screen::{MainScreen, MainScreenContent, PollutantLine};
pub use widget::{Widget, WidgetContent};

/// A display surface driven by the query pipeline.
pub trait Surface: Send + Sync {
    /// False once a permission failure ended the surface; no further runs
    /// may be started for it.
    fn accepts_runs(&self) -> bool;
}
