//! End-to-end behaviour of the contact form pipeline without timers:
//! sanitizer guarantees, validator boundaries, rate limiting, the honeypot and
//! the submit state machine.

use std::time::Duration;

use contact_guard::{
    sanitize, Banner, BlockReason, ContentValidator, DenyCategory, FieldKind, FieldStatus,
    FormLayout, FormOrchestrator, GuardConfig, ManualClock, RejectReason, Requirement,
    SubmitOutcome, SubmitPhase,
};
use pretty_assertions::assert_eq;

fn form_with_clock() -> (FormOrchestrator, ManualClock) {
    let clock = ManualClock::default();
    let form =
        FormOrchestrator::with_clock(FormLayout::contact(), &GuardConfig::default(), clock.clone())
            .expect("contact layout is complete");
    (form, clock)
}

fn fill_alice(form: &mut FormOrchestrator) {
    form.on_input("name", "Alice");
    form.on_input("email", "a@b.com");
    form.on_input("message", "Hello, checking in.");
}

fn blocked_reason(outcome: &SubmitOutcome) -> Option<BlockReason> {
    match outcome {
        SubmitOutcome::Blocked { reason, .. } => Some(*reason),
        SubmitOutcome::Accepted { .. } => None,
    }
}

#[test]
fn sanitize_is_idempotent() {
    let inputs = [
        "",
        "   ",
        "plain text",
        "<b>bold</b> & 'quoted' \"text\"",
        "<script>alert(1)</script>after",
        "<scr<script>x</script>ipt>alert(1)</script>",
        "java<b>script</b>:alert(1)",
        "<img src=x onerror=alert(1)>",
        "onclick = go() and onload=run()",
        "1 < 2 > 0",
        "<<<>>>",
        "jav&ascript:alert(1)",
        "ununclosed <tag",
    ];
    for input in inputs {
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once, "input: {input:?}");
    }
}

#[test]
fn every_denylist_category_is_invalid() {
    let validator = ContentValidator::default();
    let cases = [
        ("I know some hacking tricks", DenyCategory::AttackKeyword),
        ("put an iframe here", DenyCategory::TagKeyword),
        ("please DROP TABLE users now", DenyCategory::SqlKeyword),
        ("$$$ fast money", DenyCategory::SpecialRun),
        ("vbscript:msgbox(1)", DenyCategory::DangerousScheme),
        ("x or 1=1", DenyCategory::BooleanSql),
    ];
    for (text, category) in cases {
        let verdict = validator.validate(text, FieldKind::Multiline);
        assert!(!verdict.valid, "{text:?}");
        assert_eq!(verdict.reason, Some(RejectReason::Denylisted { category }));
    }
}

#[test]
fn length_boundaries() {
    let validator = ContentValidator::default();
    assert!(validator.validate(&"m".repeat(500), FieldKind::Multiline).valid);
    assert!(!validator.validate(&"m".repeat(501), FieldKind::Multiline).valid);
    assert!(validator.validate(&"s".repeat(100), FieldKind::Text).valid);
    assert!(!validator.validate(&"s".repeat(101), FieldKind::Text).valid);
    assert!(!validator.validate(&"s".repeat(101), FieldKind::Email).valid);
}

#[test]
fn filtered_and_empty_values() {
    let validator = ContentValidator::default();

    let filtered = validator.validate("<script>x</script>", FieldKind::Multiline);
    assert!(!filtered.valid);
    assert_eq!(
        filtered.message.as_deref(),
        Some("Content was removed by security filters.")
    );

    let optional = validator.validate_required("", FieldKind::Text, Requirement::Optional);
    assert!(optional.valid);
    assert_eq!(optional.sanitized, "");

    let required = validator.validate_required("", FieldKind::Text, Requirement::Required);
    assert!(!required.valid);
    assert_eq!(required.message.as_deref(), Some("This field is required."));
}

#[test]
fn rate_limit_through_the_form() {
    let (mut form, clock) = form_with_clock();

    // empty form: each attempt fails validation but still counts
    for _ in 0..3 {
        let outcome = form.submit();
        assert_eq!(blocked_reason(&outcome), Some(BlockReason::ContentRejected));
        clock.advance(Duration::from_secs(1));
    }
    assert_eq!(form.attempt_count(), 3);

    let outcome = form.submit();
    assert_eq!(blocked_reason(&outcome), Some(BlockReason::RateLimited));
    let SubmitOutcome::Blocked { message, .. } = outcome else {
        unreachable!()
    };
    assert!(message.starts_with("Too many attempts."), "{message}");
    assert_eq!(form.attempt_count(), 3);

    // 61s after the first attempt (3s already passed)
    clock.advance(Duration::from_secs(58));
    fill_alice(&mut form);
    assert!(matches!(form.submit(), SubmitOutcome::Accepted { .. }));
    assert_eq!(form.attempt_count(), 1);
}

#[test]
fn honeypot_blocks_valid_submissions() {
    let (mut form, _clock) = form_with_clock();
    fill_alice(&mut form);
    form.on_input("website", "https://cheap-pills.example");

    let outcome = form.submit();
    assert_eq!(blocked_reason(&outcome), Some(BlockReason::SpamDetected));
    assert_eq!(form.phase(), SubmitPhase::Idle);
    assert_eq!(form.attempt_count(), 1);

    // the user sees the same generic rejection as for bad content
    let (mut other, _clock) = form_with_clock();
    let rejected = other.submit();
    let (
        SubmitOutcome::Blocked { message: spam, .. },
        SubmitOutcome::Blocked {
            message: content, ..
        },
    ) = (outcome, rejected)
    else {
        panic!("both submits must be blocked");
    };
    assert_eq!(spam, content);
}

#[test]
fn honeypot_whitespace_counts_as_filled() {
    let (mut form, _clock) = form_with_clock();
    fill_alice(&mut form);
    form.on_input("website", " ");
    assert_eq!(blocked_reason(&form.submit()), Some(BlockReason::SpamDetected));
}

#[test]
fn successful_submission_resets_after_display() {
    let (mut form, _clock) = form_with_clock();
    fill_alice(&mut form);
    assert_eq!(form.progress(), 0.75);

    let SubmitOutcome::Accepted { ticket, submission } = form.submit() else {
        panic!("valid form must be accepted");
    };
    assert_eq!(submission.get("email"), Some("a@b.com"));
    assert_eq!(submission.get("message"), Some("Hello, checking in."));
    assert_eq!(submission.honeypot, "");
    assert_eq!(form.submit_label(), "Sending...");

    assert!(form.complete_send(ticket));
    assert_eq!(form.phase(), SubmitPhase::Success(ticket));
    assert!(matches!(form.banner(), Some(Banner::Success(_))));

    assert!(form.finish_success(ticket));
    assert_eq!(form.phase(), SubmitPhase::Idle);
    assert_eq!(form.progress(), 0.0);
    assert_eq!(form.banner(), None);
    for field in form.fields() {
        assert_eq!(field.value(), "", "{}", field.key());
        assert_eq!(field.status(), FieldStatus::Pristine);
    }
    assert!(form.snapshot().submit_enabled);
}

#[test]
fn restricted_message_is_blocked_and_counted() {
    let (mut form, _clock) = form_with_clock();
    form.on_input("name", "Alice");
    form.on_input("email", "a@b.com");
    form.on_input("message", "DROP TABLE users");

    let message = form.field("message").unwrap();
    assert_eq!(message.status(), FieldStatus::Invalid);

    let outcome = form.submit();
    assert_eq!(blocked_reason(&outcome), Some(BlockReason::ContentRejected));
    assert_eq!(form.attempt_count(), 1);
    assert_eq!(
        form.field("message").unwrap().error(),
        Some("This message contains restricted content.")
    );
    assert!(matches!(form.banner(), Some(Banner::Error(_))));
}

#[test]
fn submit_collects_every_field_error() {
    let (mut form, _clock) = form_with_clock();
    form.on_input("email", "nope");
    form.submit();

    let errors: Vec<_> = form
        .fields()
        .iter()
        .map(|f| (f.key().to_string(), f.error().map(str::to_string)))
        .collect();
    assert_eq!(
        errors,
        vec![
            ("name".into(), Some("This field is required.".into())),
            ("email".into(), Some("Please enter a valid email address.".into())),
            ("subject".into(), None),
            ("message".into(), Some("This field is required.".into())),
        ]
    );
}

#[test]
fn failed_delivery_keeps_values() {
    let (mut form, _clock) = form_with_clock();
    fill_alice(&mut form);
    let SubmitOutcome::Accepted { ticket, .. } = form.submit() else {
        panic!("valid form must be accepted");
    };
    assert!(form.fail_send(ticket, "offline"));
    assert_eq!(form.phase(), SubmitPhase::Idle);
    assert_eq!(form.field("name").unwrap().value(), "Alice");
    assert_eq!(form.banner(), Some(&Banner::Error("offline".into())));
}
