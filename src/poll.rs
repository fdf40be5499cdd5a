//! The fetch → display → forward loop.
//!
//! Each call to [`PollLoop::step`] runs exactly one cycle and reports how long
//! to wait before the next one, or the final outcome in single-request mode.
//! [`PollLoop::run`] drives the steps with real sleeps until finished or
//! cancelled.

use crate::display;
use crate::fetcher::{FetchParams, WebhookSource};
use crate::forward::Forward;
use crate::webhook::WebhookRequest;
use crate::AppConfig;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Fetching,
    Processing,
    Backoff,
    Finished,
}

/// How a poll run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Single-request mode found and processed the request
    Found,
    /// Single-request mode got an empty batch
    NotFound,
    /// The cancellation future resolved
    Cancelled,
}

impl PollOutcome {
    pub fn exit_status(self) -> u8 {
        match self {
            PollOutcome::Found | PollOutcome::Cancelled => 0,
            PollOutcome::NotFound => 1,
        }
    }
}

/// Result of a single cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Wait(Duration),
    Done(PollOutcome),
}

pub struct PollLoop<S, F> {
    config: AppConfig,
    source: S,
    forwarder: F,
    watermark: DateTime<Utc>,
    state: PollState,
}

impl<S: WebhookSource, F: Forward> PollLoop<S, F> {
    /// The watermark starts at the current time.
    pub fn new(config: AppConfig, source: S, forwarder: F) -> Self {
        Self {
            config,
            source,
            forwarder,
            watermark: Utc::now(),
            state: PollState::Polling,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn watermark(&self) -> DateTime<Utc> {
        self.watermark
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    /// Parameters the next fetch will use
    pub fn params(&self) -> FetchParams {
        match self.config.request_id.as_deref().filter(|r| !r.is_empty()) {
            Some(request_id) => FetchParams::RequestId(request_id.to_string()),
            None => FetchParams::Since(self.watermark),
        }
    }

    pub async fn step(&mut self) -> Step {
        self.state = PollState::Fetching;
        let params = self.params();

        let response = match self.source.fetch(&self.config.webhook_id, &params).await {
            Ok(response) => response,
            Err(e) => {
                // The watermark stays put so nothing captured meanwhile is skipped.
                error!("Error fetching webhook data: {}", e);
                self.state = PollState::Backoff;
                return Step::Wait(self.config.retry_interval);
            }
        };

        self.state = PollState::Processing;
        for request in &response.requests {
            self.process(request).await;
        }

        if let FetchParams::RequestId(request_id) = params {
            self.state = PollState::Finished;
            if response.requests.is_empty() {
                display::print_not_found(&request_id);
                return Step::Done(PollOutcome::NotFound);
            }
            return Step::Done(PollOutcome::Found);
        }

        self.watermark = Utc::now();
        self.state = PollState::Polling;
        Step::Wait(self.config.poll_interval)
    }

    async fn process(&self, request: &WebhookRequest) {
        display::print_request(request, self.config.full_log);

        let Some(destination) = self.config.forward_to.as_deref() else {
            return;
        };
        match self.forwarder.forward(request, destination).await {
            Ok(report) => {
                display::print_forwarded(report.status, report.elapsed, &report.destination)
            }
            Err(e) => error!(
                "Error forwarding request {} to {}: {}",
                request.request_id, destination, e
            ),
        }
    }

    /// Runs cycles until single-request mode finishes or `shutdown` resolves.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> PollOutcome {
        tokio::pin!(shutdown);

        loop {
            let step = tokio::select! {
                step = self.step() => step,
                _ = &mut shutdown => return PollOutcome::Cancelled,
            };

            match step {
                Step::Done(outcome) => return outcome,
                Step::Wait(delay) => {
                    debug!("Sleeping {:?} ({:?})", delay, self.state);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = &mut shutdown => return PollOutcome::Cancelled,
                    }
                    self.state = PollState::Polling;
                }
            }
        }
    }
}
