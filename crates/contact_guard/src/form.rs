//! Form orchestrator: the submit state machine of the contact form.
//!
//! ```text
//!            submit()                       complete_send(t)        finish_success(t)
//!   Idle ──────────────► Validating ──┬──► Sending{t} ─────────► Success{t} ─────────► Idle
//!    ▲                                │
//!    └──────── Blocked(reason) ◄──────┘
//! ```
//!
//! `Idle` is the only phase that admits a submit; everything else answers
//! with [`BlockReason::Busy`]. Timer driven transitions carry the
//! [`SubmitTicket`] of the attempt they belong to, so a late timer from an
//! earlier attempt is ignored instead of clobbering the current one.
//!
//! Validation order inside one submit is fixed: rate limit, honeypot, fields.
//! Every submit that passes the rate limit gate is counted, including ones
//! that then fail the honeypot or field validation.

use serde::Serialize;
use strum::Display;
use tracing::{debug, info, warn};

use crate::config::GuardConfig;
use crate::error::{GuardError, Result};
use crate::field::{FieldController, FieldFeedback, FieldSpec, FieldStatus};
use crate::rate_limit::{Clock, RateLimiter, SystemClock};
use crate::validator::{ContentValidator, FieldKind};

const REJECTED_MESSAGE: &str = "Your message could not be sent. Please review the form.";
const BUSY_MESSAGE: &str = "A submission is already in progress.";
const SUCCESS_MESSAGE: &str = "Message sent! Thanks for reaching out, I'll get back to you within 24 hours.";

/// Ordered field layout of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormLayout {
    pub fields: Vec<FieldSpec>,
}

impl FormLayout {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The portal's contact form.
    pub fn contact() -> Self {
        Self::new(vec![
            FieldSpec::new("name", "Name", FieldKind::Text).required(),
            FieldSpec::new("email", "Email", FieldKind::Email).required(),
            FieldSpec::new("subject", "Subject", FieldKind::Text).help("Optional"),
            FieldSpec::new("message", "Message", FieldKind::Multiline)
                .required()
                .help("Up to 500 characters"),
            FieldSpec::honeypot("website"),
        ])
    }
}

/// Identifies one accepted submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubmitTicket(u64);

impl SubmitTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum SubmitPhase {
    Idle,
    Validating,
    Sending(SubmitTicket),
    Success(SubmitTicket),
}

/// Why a submit was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    RateLimited,
    SpamDetected,
    ContentRejected,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedField {
    pub key: String,
    pub value: String,
}

/// Sanitized values of one accepted submit, in layout order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSubmission {
    pub fields: Vec<SubmittedField>,
    pub honeypot: String,
}

impl FormSubmission {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Blocked {
        reason: BlockReason,
        message: String,
    },
    Accepted {
        ticket: SubmitTicket,
        submission: FormSubmission,
    },
}

/// Transient message shown inside the form container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Banner {
    Success(String),
    Error(String),
}

/// Everything a view needs to draw the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    pub phase: SubmitPhase,
    pub progress: f32,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub banner: Option<Banner>,
    pub attempts: u32,
}

pub struct FormOrchestrator {
    fields: Vec<FieldController>,
    honeypot_key: String,
    honeypot_value: String,
    limiter: RateLimiter,
    phase: SubmitPhase,
    next_ticket: u64,
    banner: Option<Banner>,
}

impl FormOrchestrator {
    pub fn new(layout: FormLayout, config: &GuardConfig) -> Result<Self> {
        Self::with_clock(layout, config, SystemClock)
    }

    /// Build the orchestrator; fails if the layout lacks fields or a honeypot.
    pub fn with_clock(
        layout: FormLayout,
        config: &GuardConfig,
        clock: impl Clock + 'static,
    ) -> Result<Self> {
        let validator = ContentValidator::new(config);
        let mut honeypot_key = None;
        let mut fields = Vec::new();
        for spec in layout.fields {
            if spec.is_honeypot() {
                honeypot_key = Some(spec.key);
            } else {
                fields.push(FieldController::new(spec, validator.clone()));
            }
        }

        if fields.is_empty() {
            return Err(GuardError::ElementMissing {
                component: "contact form",
                element: "input fields".to_string(),
            });
        }
        let honeypot_key = honeypot_key.ok_or_else(|| GuardError::ElementMissing {
            component: "contact form",
            element: "honeypot".to_string(),
        })?;

        Ok(Self {
            fields,
            honeypot_key,
            honeypot_value: String::new(),
            limiter: RateLimiter::with_clock(config, clock),
            phase: SubmitPhase::Idle,
            next_ticket: 1,
            banner: None,
        })
    }

    pub fn fields(&self) -> &[FieldController] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldController> {
        self.fields.iter().find(|f| f.key() == key)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut FieldController> {
        self.fields.iter_mut().find(|f| f.key() == key)
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn attempt_count(&self) -> u32 {
        self.limiter.attempt_count()
    }

    /// Fields are editable only while no submission is in flight.
    pub fn is_editable(&self) -> bool {
        self.phase == SubmitPhase::Idle
    }

    /// Live `input` event for `key`. Writes to the honeypot are recorded
    /// silently. Returns `None` for unknown keys and while a submission is
    /// in flight; a valid edit clears an error banner.
    pub fn on_input(&mut self, key: &str, raw: &str) -> Option<FieldFeedback> {
        if !self.is_editable() {
            debug!(key, phase = %self.phase, "input ignored, form locked");
            return None;
        }
        if key == self.honeypot_key {
            self.honeypot_value = raw.to_owned();
            return None;
        }
        let feedback = self.field_mut(key)?.on_input(raw);
        if feedback.status == FieldStatus::Valid {
            self.clear_error_banner();
        }
        Some(feedback)
    }

    /// `None` while a submission is in flight.
    pub fn on_blur(&mut self, key: &str) -> Option<FieldFeedback> {
        if !self.is_editable() {
            return None;
        }
        self.field_mut(key).map(|f| f.on_blur())
    }

    fn clear_error_banner(&mut self) {
        if matches!(self.banner, Some(Banner::Error(_))) {
            self.banner = None;
        }
    }

    pub fn on_focus(&mut self, key: &str) -> Option<FieldFeedback> {
        self.field_mut(key).map(|f| f.on_focus())
    }

    /// Fraction of visible fields that are valid and non-empty.
    pub fn progress(&self) -> f32 {
        let complete = self.fields.iter().filter(|f| f.is_complete()).count();
        complete as f32 / self.fields.len() as f32
    }

    pub fn submit_label(&self) -> &'static str {
        match self.phase {
            SubmitPhase::Idle | SubmitPhase::Validating => "Send Message",
            SubmitPhase::Sending(_) => "Sending...",
            SubmitPhase::Success(_) => "Sent",
        }
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            phase: self.phase,
            progress: self.progress(),
            submit_label: self.submit_label(),
            submit_enabled: self.is_editable(),
            banner: self.banner.clone(),
            attempts: self.attempt_count(),
        }
    }

    /// Run one submit attempt.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.phase != SubmitPhase::Idle {
            debug!(phase = %self.phase, "submit ignored, form busy");
            return SubmitOutcome::Blocked {
                reason: BlockReason::Busy,
                message: BUSY_MESSAGE.to_string(),
            };
        }
        self.phase = SubmitPhase::Validating;
        self.banner = None;

        let decision = self.limiter.check();
        if !decision.allowed {
            let message = decision
                .message
                .unwrap_or_else(|| "Too many attempts. Please try again later.".to_string());
            return self.block(BlockReason::RateLimited, message);
        }
        self.limiter.record_attempt();

        if !self.honeypot_value.is_empty() {
            warn!(
                honeypot = %self.honeypot_key,
                attempts = self.limiter.attempt_count(),
                "spam detected via honeypot"
            );
            return self.block(BlockReason::SpamDetected, REJECTED_MESSAGE.to_string());
        }

        let mut submitted = Vec::with_capacity(self.fields.len());
        let mut rejected = 0usize;
        for field in &mut self.fields {
            let verdict = field.validate_for_submit();
            if verdict.valid {
                submitted.push(SubmittedField {
                    key: field.key().to_string(),
                    value: verdict.sanitized,
                });
            } else {
                rejected += 1;
            }
        }
        if rejected > 0 {
            info!(rejected, "submit blocked by field validation");
            return self.block(BlockReason::ContentRejected, REJECTED_MESSAGE.to_string());
        }

        let submission = FormSubmission {
            fields: submitted,
            honeypot: self.honeypot_value.clone(),
        };
        let ticket = SubmitTicket(self.next_ticket);
        self.next_ticket += 1;
        self.phase = SubmitPhase::Sending(ticket);

        match serde_json::to_string(&submission) {
            Ok(json) => debug!(ticket = ticket.id(), submission = %json, "submission accepted"),
            Err(e) => debug!(ticket = ticket.id(), "submission accepted (unserializable: {e})"),
        }
        info!(ticket = ticket.id(), "contact form sending");

        SubmitOutcome::Accepted { ticket, submission }
    }

    fn block(&mut self, reason: BlockReason, message: String) -> SubmitOutcome {
        self.phase = SubmitPhase::Idle;
        self.banner = Some(Banner::Error(message.clone()));
        SubmitOutcome::Blocked { reason, message }
    }

    /// Simulated delivery of `ticket` finished. Returns `false` for stale tickets.
    pub fn complete_send(&mut self, ticket: SubmitTicket) -> bool {
        if self.phase != SubmitPhase::Sending(ticket) {
            debug!(ticket = ticket.id(), phase = %self.phase, "stale send completion ignored");
            return false;
        }
        info!(ticket = ticket.id(), "contact form submitted successfully");
        self.phase = SubmitPhase::Success(ticket);
        self.banner = Some(Banner::Success(SUCCESS_MESSAGE.to_string()));
        true
    }

    /// Delivery of `ticket` failed: back to idle with the values kept.
    pub fn fail_send(&mut self, ticket: SubmitTicket, message: impl Into<String>) -> bool {
        if self.phase != SubmitPhase::Sending(ticket) {
            debug!(ticket = ticket.id(), phase = %self.phase, "stale send failure ignored");
            return false;
        }
        let message = message.into();
        warn!(ticket = ticket.id(), %message, "contact form delivery failed");
        self.phase = SubmitPhase::Idle;
        self.banner = Some(Banner::Error(message));
        true
    }

    /// Success display of `ticket` elapsed: clear the form and return to idle.
    pub fn finish_success(&mut self, ticket: SubmitTicket) -> bool {
        if self.phase != SubmitPhase::Success(ticket) {
            debug!(ticket = ticket.id(), phase = %self.phase, "stale success reset ignored");
            return false;
        }
        self.reset();
        true
    }

    /// Clear every field and drop any in-flight attempt.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
        self.honeypot_value.clear();
        self.banner = None;
        self.phase = SubmitPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::ManualClock;

    fn orchestrator() -> FormOrchestrator {
        FormOrchestrator::with_clock(
            FormLayout::contact(),
            &GuardConfig::default(),
            ManualClock::default(),
        )
        .unwrap()
    }

    fn fill_valid(form: &mut FormOrchestrator) {
        form.on_input("name", "Alice");
        form.on_input("email", "a@b.com");
        form.on_input("message", "Hello, checking in.");
    }

    #[test]
    fn layout_without_honeypot_is_rejected() {
        let layout = FormLayout::new(vec![FieldSpec::new("name", "Name", FieldKind::Text)]);
        let err = FormOrchestrator::new(layout, &GuardConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, GuardError::ElementMissing { ref element, .. } if element == "honeypot"));
    }

    #[test]
    fn layout_without_fields_is_rejected() {
        let layout = FormLayout::new(vec![FieldSpec::honeypot("website")]);
        assert!(FormOrchestrator::new(layout, &GuardConfig::default()).is_err());
    }

    #[test]
    fn progress_counts_complete_visible_fields() {
        let mut form = orchestrator();
        assert_eq!(form.progress(), 0.0);
        form.on_input("name", "Alice");
        form.on_input("email", "a@b.com");
        assert_eq!(form.progress(), 0.5);
        form.on_input("email", "not-an-email");
        assert_eq!(form.progress(), 0.25);
    }

    #[test]
    fn accepted_submit_moves_to_sending() {
        let mut form = orchestrator();
        fill_valid(&mut form);
        let SubmitOutcome::Accepted { ticket, submission } = form.submit() else {
            panic!("expected acceptance");
        };
        assert_eq!(form.phase(), SubmitPhase::Sending(ticket));
        assert_eq!(submission.get("name"), Some("Alice"));
        assert_eq!(submission.get("subject"), Some(""));
        assert_eq!(form.submit_label(), "Sending...");
        assert!(!form.snapshot().submit_enabled);
    }

    #[test]
    fn second_submit_while_sending_is_busy() {
        let mut form = orchestrator();
        fill_valid(&mut form);
        assert!(matches!(form.submit(), SubmitOutcome::Accepted { .. }));
        let outcome = form.submit();
        assert!(matches!(
            outcome,
            SubmitOutcome::Blocked {
                reason: BlockReason::Busy,
                ..
            }
        ));
        // busy clicks don't count
        assert_eq!(form.attempt_count(), 1);
    }

    #[test]
    fn stale_tickets_are_ignored() {
        let mut form = orchestrator();
        fill_valid(&mut form);
        let SubmitOutcome::Accepted { ticket, .. } = form.submit() else {
            panic!("expected acceptance");
        };
        form.reset();
        fill_valid(&mut form);
        let SubmitOutcome::Accepted { ticket: newer, .. } = form.submit() else {
            panic!("expected acceptance");
        };
        assert!(!form.complete_send(ticket));
        assert_eq!(form.phase(), SubmitPhase::Sending(newer));
        assert!(form.complete_send(newer));
        assert!(!form.finish_success(ticket));
        assert!(form.finish_success(newer));
        assert_eq!(form.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn edits_are_locked_while_sending() {
        let mut form = orchestrator();
        fill_valid(&mut form);
        let SubmitOutcome::Accepted { ticket, .. } = form.submit() else {
            panic!("expected acceptance");
        };

        assert_eq!(form.on_input("name", "Mallory hacking"), None);
        assert_eq!(form.on_blur("name"), None);
        assert_eq!(form.on_input("website", "http://spam"), None);
        assert_eq!(form.field("name").unwrap().value(), "Alice");

        // after a failed delivery the user sees what was sent
        assert!(form.fail_send(ticket, "network down"));
        assert_eq!(form.field("name").unwrap().value(), "Alice");
        assert!(form.on_input("name", "Alice B").is_some());
    }

    #[test]
    fn valid_input_clears_error_banner() {
        let mut form = orchestrator();
        form.on_input("name", "Alice");
        assert!(matches!(form.submit(), SubmitOutcome::Blocked { .. }));
        assert!(matches!(form.banner(), Some(Banner::Error(_))));

        form.on_input("email", "a@");
        assert!(form.banner().is_some());
        form.on_input("email", "a@b.com");
        assert_eq!(form.banner(), None);
    }

    #[test]
    fn honeypot_input_is_not_a_field() {
        let mut form = orchestrator();
        assert_eq!(form.on_input("website", "http://spam"), None);
        assert!(form.field("website").is_none());
        assert_eq!(form.fields().len(), 4);
    }
}
