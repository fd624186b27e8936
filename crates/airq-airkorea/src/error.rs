//! Air quality lookup error types.

use thiserror::Error;

/// Location capability errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Errors produced by the station resolver, the measurement fetcher and the
/// pipeline that chains them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AirQualityError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error{}: {message}", status_suffix(.status))]
    Transport { status: Option<u16>, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Location permission denied")]
    Permission,

    #[error("Location unavailable: {0}")]
    Location(String),

    #[error("Request cancelled")]
    Cancelled,
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" ({})", code),
        None => String::new(),
    }
}

impl AirQualityError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "No air quality data is available nearby.",
            Self::Transport { .. } => "Unable to reach the air quality service. Please try again.",
            Self::Parse(_) => "Received an unexpected response. Please try again.",
            Self::Permission => "Location permission is required.",
            Self::Location(_) => "Could not determine your location. Please try again.",
            Self::Cancelled => "Request cancelled.",
        }
    }

    /// Permission failures end the surface; no further runs are attempted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Permission)
    }

    /// Cancelled runs leave the display untouched.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for AirQualityError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Parse(e.to_string());
        }
        let message = if e.is_timeout() {
            format!("request timed out: {}", e)
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            e.to_string()
        };
        Self::Transport {
            status: e.status().map(|s| s.as_u16()),
            message,
        }
    }
}

impl From<serde_json::Error> for AirQualityError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<LocationError> for AirQualityError {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::PermissionDenied => Self::Permission,
            other => Self::Location(other.to_string()),
        }
    }
}
