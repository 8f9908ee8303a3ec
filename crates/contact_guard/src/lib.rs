//! Contact form gatekeeping for the Portal.
//!
//! Everything between a keystroke in the contact form and a submission
//! leaving it: sanitizing, denylist and length validation, live per-field
//! feedback, the honeypot, rate limiting and the submit state machine. Also
//! hosts the page state the front end shares with it: the card navigator,
//! the theme preference and the projects filter.
//!
//! The crate has no UI. The `portal` binary drives it from a terminal event
//! loop.

pub mod config;
pub mod denylist;
pub mod driver;
pub mod error;
pub mod field;
pub mod form;
pub mod navigation;
pub mod projects;
pub mod rate_limit;
pub mod sanitize;
pub mod theme;
pub mod validator;

pub use config::GuardConfig;
pub use denylist::{DenyCategory, Denylist};
pub use driver::{FormEvent, SimulatedTransport, SubmissionDriver, Transport};
pub use error::{GuardError, Result};
pub use field::{FieldController, FieldFeedback, FieldRole, FieldSpec, FieldStatus};
pub use form::{
    Banner, BlockReason, FormLayout, FormOrchestrator, FormSnapshot, FormSubmission,
    SubmitOutcome, SubmitPhase, SubmitTicket, SubmittedField,
};
pub use navigation::{Card, CardNavigator, Transition};
pub use projects::{Project, ProjectCatalog, ProjectFilter, ProjectStatus, NO_MATCH};
pub use rate_limit::{Clock, ManualClock, RateDecision, RateLimiter, SystemClock};
pub use sanitize::{is_clean, sanitize};
pub use theme::{SystemAppearance, ThemePreference, ThemeStore, ThemeSwitch, THEME_KEY};
pub use validator::{ContentValidator, FieldKind, RejectReason, Requirement, ValidationVerdict};
