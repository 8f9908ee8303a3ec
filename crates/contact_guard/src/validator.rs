//! Content validation for contact form fields.
//!
//! `validate` runs the sanitizer first and judges the *sanitized* text:
//! denylist, then length, then "filtered to nothing", then kind-specific shape
//! checks. A verdict always carries the sanitized text, which becomes the
//! canonical value of the field when it is valid.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GuardConfig;
use crate::denylist::{DenyCategory, Denylist};
use crate::field::FieldSpec;
use crate::sanitize::sanitize;

/// Raw input longer than `limit * RAW_INPUT_FACTOR` characters is rejected
/// without sanitizing the tail, which bounds the work of the fixed-point
/// sanitizer.
const RAW_INPUT_FACTOR: usize = 8;

lazy_static! {
    static ref EMAIL_SHAPE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s.]+(?:\.[^@\s.]+)+$").expect("valid email regex");
}

/// Input widget a value came from. Decides length limits and shape checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Single line free text. Also the fallback for anything unrecognized.
    #[default]
    Text,
    /// Single line, must look like `local@domain.tld`.
    Email,
    /// Long-form message with the higher length limit.
    Multiline,
}

impl FieldKind {
    pub fn is_multiline(self) -> bool {
        matches!(self, FieldKind::Multiline)
    }
}

/// Whether an empty value is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Required,
    #[default]
    Optional,
}

/// Why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    Denylisted { category: DenyCategory },
    TooLong { limit: usize },
    FilteredEmpty,
    Required,
    InvalidEmail,
}

impl RejectReason {
    /// Message shown next to the field. Never names the matched pattern.
    pub fn user_message(&self) -> String {
        match self {
            RejectReason::Denylisted { .. } => {
                "This message contains restricted content.".to_string()
            }
            RejectReason::TooLong { limit } => {
                format!("Content exceeds maximum length of {limit} characters.")
            }
            RejectReason::FilteredEmpty => "Content was removed by security filters.".to_string(),
            RejectReason::Required => "This field is required.".to_string(),
            RejectReason::InvalidEmail => "Please enter a valid email address.".to_string(),
        }
    }
}

/// Result of validating one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    pub sanitized: String,
    pub message: Option<String>,
    #[serde(flatten)]
    pub reason: Option<RejectReason>,
}

impl ValidationVerdict {
    fn accept(sanitized: String) -> Self {
        Self {
            valid: true,
            sanitized,
            message: None,
            reason: None,
        }
    }

    fn reject(sanitized: String, reason: RejectReason) -> Self {
        Self {
            valid: false,
            sanitized,
            message: Some(reason.user_message()),
            reason: Some(reason),
        }
    }

    /// Number of characters in the sanitized value (drives the counter).
    pub fn char_count(&self) -> usize {
        self.sanitized.chars().count()
    }
}

/// Stateless validator; construct once and reuse.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    denylist: &'static Denylist,
    single_line_limit: usize,
    multiline_limit: usize,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new(&GuardConfig::default())
    }
}

impl ContentValidator {
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            denylist: Denylist::standard(),
            single_line_limit: config.single_line_limit,
            multiline_limit: config.multiline_limit,
        }
    }

    /// Maximum sanitized length for `kind`.
    pub fn limit_for(&self, kind: FieldKind) -> usize {
        if kind.is_multiline() {
            self.multiline_limit
        } else {
            self.single_line_limit
        }
    }

    /// Validate content only. Empty input is valid-empty here; required-ness
    /// is layered on by [`ContentValidator::validate_required`].
    pub fn validate(&self, raw: &str, kind: FieldKind) -> ValidationVerdict {
        let limit = self.limit_for(kind);
        if let Some((cut, _)) = raw.char_indices().nth(limit.saturating_mul(RAW_INPUT_FACTOR)) {
            debug!(limit, bytes = raw.len(), "raw input over cap, not sanitized in full");
            return ValidationVerdict::reject(sanitize(&raw[..cut]), RejectReason::TooLong { limit });
        }
        let sanitized = sanitize(raw);

        if let Some(category) = self.denylist.first_match(&sanitized) {
            debug!(%category, "value rejected by denylist");
            return ValidationVerdict::reject(sanitized, RejectReason::Denylisted { category });
        }

        if sanitized.chars().count() > limit {
            return ValidationVerdict::reject(sanitized, RejectReason::TooLong { limit });
        }

        if sanitized.is_empty() && !raw.trim().is_empty() {
            return ValidationVerdict::reject(sanitized, RejectReason::FilteredEmpty);
        }

        if kind == FieldKind::Email && !sanitized.is_empty() && !EMAIL_SHAPE.is_match(&sanitized) {
            return ValidationVerdict::reject(sanitized, RejectReason::InvalidEmail);
        }

        ValidationVerdict::accept(sanitized)
    }

    /// Validate content and reject empty values of required fields.
    pub fn validate_required(
        &self,
        raw: &str,
        kind: FieldKind,
        requirement: Requirement,
    ) -> ValidationVerdict {
        let verdict = self.validate(raw, kind);
        if verdict.valid && verdict.sanitized.is_empty() && requirement == Requirement::Required {
            return ValidationVerdict::reject(verdict.sanitized, RejectReason::Required);
        }
        verdict
    }

    /// [`validate_required`](Self::validate_required) with kind and
    /// requirement taken from `spec`.
    pub fn validate_field(&self, raw: &str, spec: &FieldSpec) -> ValidationVerdict {
        self.validate_required(raw, spec.kind, spec.requirement)
    }
}
