//! Timer driven parts of a submission, run on a paused tokio clock.

use std::time::Duration;

use contact_guard::{
    FormEvent, FormLayout, FormOrchestrator, FormSubmission, GuardConfig, GuardError,
    ManualClock, SubmissionDriver, SubmitOutcome, SubmitPhase, SubmitTicket, Transport,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;

fn accepted_form() -> (FormOrchestrator, SubmitTicket, FormSubmission) {
    let mut form = FormOrchestrator::with_clock(
        FormLayout::contact(),
        &GuardConfig::default(),
        ManualClock::default(),
    )
    .expect("contact layout is complete");
    form.on_input("name", "Alice");
    form.on_input("email", "a@b.com");
    form.on_input("message", "Hello, checking in.");
    match form.submit() {
        SubmitOutcome::Accepted { ticket, submission } => (form, ticket, submission),
        other => panic!("expected acceptance, got {other:?}"),
    }
}

fn apply(form: &mut FormOrchestrator, event: FormEvent) -> bool {
    match event {
        FormEvent::Sent(ticket) => form.complete_send(ticket),
        FormEvent::SendFailed { ticket, message } => form.fail_send(ticket, message),
        FormEvent::ResetDue(ticket) => form.finish_success(ticket),
    }
}

fn assert_between(elapsed: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(50),
        "elapsed {elapsed:?}, expected about {expected:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn success_flow_follows_configured_delays() {
    let config = GuardConfig::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut driver = SubmissionDriver::simulated(&config, tx);

    let (mut form, ticket, submission) = accepted_form();
    let started = tokio::time::Instant::now();
    driver.dispatch(ticket, submission);

    let event = rx.recv().await.unwrap();
    assert_eq!(event, FormEvent::Sent(ticket));
    assert_between(started.elapsed(), 1500);
    assert!(apply(&mut form, event));
    assert_eq!(form.phase(), SubmitPhase::Success(ticket));

    let event = rx.recv().await.unwrap();
    assert_eq!(event, FormEvent::ResetDue(ticket));
    assert_between(started.elapsed(), 4500);
    assert!(apply(&mut form, event));
    assert_eq!(form.phase(), SubmitPhase::Idle);
    assert_eq!(form.field("name").unwrap().value(), "");
}

#[tokio::test(start_paused = true)]
async fn cancelled_ticket_sends_nothing() {
    let config = GuardConfig::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut driver = SubmissionDriver::simulated(&config, tx);

    let (mut form, ticket, submission) = accepted_form();
    driver.dispatch(ticket, submission);
    tokio::time::sleep(Duration::from_millis(500)).await;

    form.reset();
    driver.cancel_all();
    assert_eq!(driver.pending(), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(form.phase(), SubmitPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn late_event_of_old_ticket_is_ignored() {
    let config = GuardConfig::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut driver = SubmissionDriver::simulated(&config, tx);

    let (mut form, old, submission) = accepted_form();
    driver.dispatch(old, submission);
    let sent = rx.recv().await.unwrap();

    // the form was reset and resubmitted before the old event got applied
    form.reset();
    form.on_input("name", "Bob");
    form.on_input("email", "bob@example.org");
    form.on_input("message", "Second try");
    let SubmitOutcome::Accepted { ticket: newer, .. } = form.submit() else {
        panic!("second submit must be accepted");
    };

    assert!(!apply(&mut form, sent));
    assert_eq!(form.phase(), SubmitPhase::Sending(newer));
}

struct FailingTransport;

impl Transport for FailingTransport {
    fn deliver(
        &self,
        _ticket: SubmitTicket,
        _submission: FormSubmission,
    ) -> BoxFuture<'static, contact_guard::Result<()>> {
        async {
            Err(GuardError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "backend down",
            )))
        }
        .boxed()
    }
}

#[tokio::test(start_paused = true)]
async fn transport_failure_returns_form_to_idle() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut driver = SubmissionDriver::new(&GuardConfig::default(), FailingTransport, tx);

    let (mut form, ticket, submission) = accepted_form();
    driver.dispatch(ticket, submission);

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, FormEvent::SendFailed { ticket: t, .. } if t == ticket));
    assert!(apply(&mut form, event));
    assert_eq!(form.phase(), SubmitPhase::Idle);
    assert_eq!(form.field("name").unwrap().value(), "Alice");
}
