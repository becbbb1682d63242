//! Typed errors surfaced to ability callers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AbilityError {
    #[error(
        "Analytics is not available. Connect the analytics backend and enable the stats module to use this ability."
    )]
    AnalyticsUnavailable,

    #[error(
        "This ability needs view counts. Connect the analytics backend and enable the stats module to use it."
    )]
    AnalyticsRequired,

    /// Upstream analytics failure; the message is passed through unchanged.
    #[error("{0}")]
    Backend(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("caller does not have the '{0}' capability")]
    Forbidden(String),

    #[error("no ability registered with name: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl AbilityError {
    pub fn code(&self) -> &'static str {
        match self {
            AbilityError::AnalyticsUnavailable => "analytics_unavailable",
            AbilityError::AnalyticsRequired => "analytics_required",
            AbilityError::Backend(_) => "backend_error",
            AbilityError::InvalidInput(_) => "invalid_input",
            AbilityError::Forbidden(_) => "forbidden",
            AbilityError::NotFound(_) => "not_found",
            AbilityError::Storage(_) => "internal",
        }
    }

    /// HTTP status the error maps to.
    pub fn status(&self) -> u16 {
        match self {
            AbilityError::AnalyticsUnavailable | AbilityError::AnalyticsRequired => 503,
            AbilityError::Backend(_) => 502,
            AbilityError::InvalidInput(_) => 400,
            AbilityError::Forbidden(_) => 403,
            AbilityError::NotFound(_) => 404,
            AbilityError::Storage(_) => 500,
        }
    }

    pub fn backend(err: anyhow::Error) -> Self {
        AbilityError::Backend(format!("{:#}", err))
    }
}
