//! Submission driver: turns the delays of an accepted submit into events.
//!
//! For every accepted [`SubmitTicket`] the driver spawns one tokio task that
//! hands the submission to a [`Transport`], reports the result and, on
//! success, waits out the success display before asking for a reset. The task
//! never touches form state; it only sends [`FormEvent`]s over the channel
//! given at construction and the owner of the [`FormOrchestrator`] applies
//! them.
//!
//! Each task holds a child of the driver's [`CancellationToken`]. `cancel_all`
//! stops pending timers when the form is reset; anything already sent is
//! harmless because the orchestrator drops events with stale tickets.
//!
//! [`FormOrchestrator`]: crate::FormOrchestrator

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::GuardConfig;
use crate::error::Result;
use crate::form::{FormSubmission, SubmitTicket};

/// Delivers a submission somewhere.
pub trait Transport: Send + Sync + 'static {
    fn deliver(
        &self,
        ticket: SubmitTicket,
        submission: FormSubmission,
    ) -> BoxFuture<'static, Result<()>>;
}

/// Stand-in for a real backend: waits a fixed latency and reports success.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    latency: Duration,
}

impl SimulatedTransport {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Transport for SimulatedTransport {
    fn deliver(
        &self,
        ticket: SubmitTicket,
        submission: FormSubmission,
    ) -> BoxFuture<'static, Result<()>> {
        let latency = self.latency;
        async move {
            tokio::time::sleep(latency).await;
            debug!(
                ticket = ticket.id(),
                fields = submission.fields.len(),
                "simulated delivery finished"
            );
            Ok(())
        }
        .boxed()
    }
}

/// Events the driver sends back to the form owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Delivery finished; apply with `FormOrchestrator::complete_send`.
    Sent(SubmitTicket),
    /// Delivery failed; apply with `FormOrchestrator::fail_send`.
    SendFailed { ticket: SubmitTicket, message: String },
    /// Success display elapsed; apply with `FormOrchestrator::finish_success`.
    ResetDue(SubmitTicket),
}

pub struct SubmissionDriver {
    transport: Arc<dyn Transport>,
    success_display: Duration,
    events: mpsc::UnboundedSender<FormEvent>,
    cancel: CancellationToken,
    active: HashMap<SubmitTicket, (CancellationToken, JoinHandle<()>)>,
}

impl SubmissionDriver {
    pub fn new(
        config: &GuardConfig,
        transport: impl Transport,
        events: mpsc::UnboundedSender<FormEvent>,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            success_display: config.success_display(),
            events,
            cancel: CancellationToken::new(),
            active: HashMap::new(),
        }
    }

    /// Driver backed by [`SimulatedTransport`] with the configured send delay.
    pub fn simulated(config: &GuardConfig, events: mpsc::UnboundedSender<FormEvent>) -> Self {
        Self::new(config, SimulatedTransport::new(config.send_delay()), events)
    }

    /// Number of tickets whose task is still running.
    pub fn pending(&mut self) -> usize {
        self.active.retain(|_, (_, handle)| !handle.is_finished());
        self.active.len()
    }

    /// Start delivery of an accepted submission. Must be called inside a
    /// tokio runtime.
    pub fn dispatch(&mut self, ticket: SubmitTicket, submission: FormSubmission) {
        self.active.retain(|_, (_, handle)| !handle.is_finished());

        let token = self.cancel.child_token();
        let task_token = token.clone();
        let delivery = self.transport.deliver(ticket, submission);
        let success_display = self.success_display;
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            let result = tokio::select! {
                _ = task_token.cancelled() => {
                    debug!(ticket = ticket.id(), "delivery cancelled");
                    return;
                }
                result = delivery => result,
            };

            match result {
                Ok(()) => {
                    info!(ticket = ticket.id(), "submission delivered");
                    if events.send(FormEvent::Sent(ticket)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!(ticket = ticket.id(), "submission delivery failed: {e}");
                    let _ = events.send(FormEvent::SendFailed {
                        ticket,
                        message: "Your message could not be sent. Please try again later."
                            .to_string(),
                    });
                    return;
                }
            }

            tokio::select! {
                _ = task_token.cancelled() => {
                    debug!(ticket = ticket.id(), "success display cancelled");
                }
                _ = tokio::time::sleep(success_display) => {
                    let _ = events.send(FormEvent::ResetDue(ticket));
                }
            }
        });

        self.active.insert(ticket, (token, handle));
    }

    /// Cancel every pending timer; the driver stays usable.
    pub fn cancel_all(&mut self) {
        for (ticket, (token, _)) in self.active.drain() {
            debug!(ticket = ticket.id(), "cancelling submission timers");
            token.cancel();
        }
    }

    /// Cancel everything and abort the tasks. Used on application exit.
    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        for (_, (_, handle)) in self.active.drain() {
            handle.abort();
        }
    }
}

impl Drop for SubmissionDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
