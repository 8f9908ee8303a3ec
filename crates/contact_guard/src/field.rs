//! Field definitions and the per-field live validation controller.
//!
//! A [`FieldSpec`] is the declarative description of one input (key, label,
//! kind, required-ness, role). A [`FieldController`] owns the current value
//! of that input and reacts to the three live events a text input produces:
//!
//! - `input`: every edit. Validates content, but an empty value is neutral.
//! - `blur`: leaving the field. Full validation including required-ness;
//!   the sanitized value is written back.
//! - `focus`: entering the field. Hides the error so the user isn't scolded
//!   mid-edit.
//!
//! When the sanitizer removes more than surrounding whitespace, the
//! controller replaces the value with the sanitized text and reports the
//! replacement so the view can show it.

use serde::{Deserialize, Serialize};

use crate::validator::{ContentValidator, FieldKind, Requirement, ValidationVerdict};

/// Whether a field is meant for humans or is the hidden bot trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    #[default]
    Visible,
    /// Hidden from people; any value means an automated submission.
    Honeypot,
}

/// Declarative description of a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub requirement: Requirement,
    #[serde(default)]
    pub role: FieldRole,
    #[serde(default)]
    pub help: Option<String>,
}

impl FieldSpec {
    /// Create an optional, visible field.
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            requirement: Requirement::Optional,
            role: FieldRole::Visible,
            help: None,
        }
    }

    /// Create the hidden honeypot field.
    pub fn honeypot(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            kind: FieldKind::Text,
            requirement: Requirement::Optional,
            role: FieldRole::Honeypot,
            help: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Required;
        self
    }

    /// Attach help / hint text shown beneath the field.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_honeypot(&self) -> bool {
        self.role == FieldRole::Honeypot
    }
}

/// Visual state of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// Nothing entered yet, or the error was dismissed by focusing.
    #[default]
    Pristine,
    Valid,
    Invalid,
}

/// What the view needs to update after an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFeedback {
    pub status: FieldStatus,
    pub message: Option<String>,
    pub char_count: usize,
    pub limit: usize,
    /// New value to display when the controller rewrote the input.
    pub replaced: Option<String>,
}

/// Live validation state of one input.
#[derive(Debug, Clone)]
pub struct FieldController {
    spec: FieldSpec,
    validator: ContentValidator,
    value: String,
    status: FieldStatus,
    error: Option<String>,
    char_count: usize,
}

impl FieldController {
    pub fn new(spec: FieldSpec, validator: ContentValidator) -> Self {
        Self {
            spec,
            validator,
            value: String::new(),
            status: FieldStatus::Pristine,
            error: None,
            char_count: 0,
        }
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn key(&self) -> &str {
        &self.spec.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn status(&self) -> FieldStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn limit(&self) -> usize {
        self.validator.limit_for(self.spec.kind)
    }

    /// Valid and non-empty; counts towards the progress indicator.
    pub fn is_complete(&self) -> bool {
        self.status == FieldStatus::Valid && !self.value.trim().is_empty()
    }

    /// Handle an edit. `raw` is the full new value of the input.
    pub fn on_input(&mut self, raw: &str) -> FieldFeedback {
        let verdict = self.validator.validate(raw, self.spec.kind);

        let replaced = if verdict.sanitized != raw.trim() {
            self.value = verdict.sanitized.clone();
            Some(verdict.sanitized.clone())
        } else {
            self.value = raw.to_owned();
            None
        };

        if raw.trim().is_empty() {
            self.status = FieldStatus::Pristine;
            self.error = None;
            self.char_count = 0;
        } else {
            self.apply(&verdict);
        }
        self.feedback(replaced)
    }

    /// Handle leaving the field: full validation and trimmed write-back.
    pub fn on_blur(&mut self) -> FieldFeedback {
        let verdict = self.run_full_validation();
        let replaced = (verdict.sanitized != self.value).then(|| verdict.sanitized.clone());
        self.value = verdict.sanitized;
        self.feedback(replaced)
    }

    /// Handle entering the field.
    pub fn on_focus(&mut self) -> FieldFeedback {
        self.error = None;
        if self.status == FieldStatus::Invalid {
            self.status = FieldStatus::Pristine;
        }
        self.feedback(None)
    }

    /// Validation pass used by the orchestrator at submit time.
    pub fn validate_for_submit(&mut self) -> ValidationVerdict {
        self.run_full_validation()
    }

    /// Forget value and feedback.
    pub fn reset(&mut self) {
        self.value.clear();
        self.status = FieldStatus::Pristine;
        self.error = None;
        self.char_count = 0;
    }

    fn run_full_validation(&mut self) -> ValidationVerdict {
        let verdict = self.validator.validate_field(&self.value, &self.spec);
        if self.value.trim().is_empty() && verdict.valid {
            self.status = FieldStatus::Pristine;
            self.error = None;
            self.char_count = 0;
        } else {
            self.apply(&verdict);
        }
        verdict
    }

    fn apply(&mut self, verdict: &ValidationVerdict) {
        self.char_count = verdict.char_count();
        if verdict.valid {
            self.status = FieldStatus::Valid;
            self.error = None;
        } else {
            self.status = FieldStatus::Invalid;
            self.error = verdict.message.clone();
        }
    }

    fn feedback(&self, replaced: Option<String>) -> FieldFeedback {
        FieldFeedback {
            status: self.status,
            message: self.error.clone(),
            char_count: self.char_count,
            limit: self.limit(),
            replaced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_field() -> FieldController {
        FieldController::new(
            FieldSpec::new("message", "Message", FieldKind::Multiline).required(),
            ContentValidator::default(),
        )
    }

    #[test]
    fn typing_valid_text_marks_valid() {
        let mut field = message_field();
        let fb = field.on_input("Hello there");
        assert_eq!(fb.status, FieldStatus::Valid);
        assert_eq!(fb.char_count, 11);
        assert_eq!(fb.limit, 500);
        assert_eq!(fb.replaced, None);
        assert!(field.is_complete());
    }

    #[test]
    fn trailing_space_while_typing_is_kept() {
        let mut field = message_field();
        let fb = field.on_input("Hello ");
        assert_eq!(fb.replaced, None);
        assert_eq!(field.value(), "Hello ");
    }

    #[test]
    fn markup_is_replaced_silently() {
        let mut field = message_field();
        let fb = field.on_input("hi <b>there</b>");
        assert_eq!(fb.replaced.as_deref(), Some("hi there"));
        assert_eq!(field.value(), "hi there");
        assert_eq!(fb.status, FieldStatus::Valid);
    }

    #[test]
    fn clearing_input_is_neutral_until_blur() {
        let mut field = message_field();
        field.on_input("x");
        let fb = field.on_input("");
        assert_eq!(fb.status, FieldStatus::Pristine);
        assert_eq!(fb.message, None);

        let fb = field.on_blur();
        assert_eq!(fb.status, FieldStatus::Invalid);
        assert_eq!(fb.message.as_deref(), Some("This field is required."));
    }

    #[test]
    fn focus_hides_error() {
        let mut field = message_field();
        field.on_input("DROP TABLE users");
        assert_eq!(field.status(), FieldStatus::Invalid);
        assert!(field.error().is_some());

        let fb = field.on_focus();
        assert_eq!(fb.message, None);
        assert_eq!(fb.status, FieldStatus::Pristine);
        assert!(!field.is_complete());
    }

    #[test]
    fn blur_writes_back_trimmed_value() {
        let mut field = message_field();
        field.on_input("  spaced out  ");
        let fb = field.on_blur();
        assert_eq!(fb.replaced.as_deref(), Some("spaced out"));
        assert_eq!(field.value(), "spaced out");
    }

    #[test]
    fn optional_empty_field_stays_pristine_on_blur() {
        let mut field = FieldController::new(
            FieldSpec::new("subject", "Subject", FieldKind::Text),
            ContentValidator::default(),
        );
        let fb = field.on_blur();
        assert_eq!(fb.status, FieldStatus::Pristine);
        assert!(field.validate_for_submit().valid);
    }
}
