use thiserror::Error;

/// Failures of the contact guard library.
///
/// Expected outcomes of validation and rate limiting are *not* errors; they
/// are reported through [`ValidationVerdict`](crate::ValidationVerdict) and
/// [`SubmitOutcome`](crate::SubmitOutcome).
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A component was initialized without an element it depends on.
    #[error("{component}: required element `{element}` is missing")]
    ElementMissing {
        component: &'static str,
        element: String,
    },

    #[error("unknown theme: {0}")]
    UnknownTheme(String),
}

pub type Result<T, E = GuardError> = std::result::Result<T, E>;
