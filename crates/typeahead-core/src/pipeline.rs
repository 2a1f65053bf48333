//! Debounced, cancellable request pipeline.
//!
//! Every trigger restarts the debounce timer. When the timer fires, any
//! request still in flight is aborted before the new one is sent, so at most
//! one request per input is live. Request ids are monotonic and a completion
//! is only accepted for the id currently in flight; anything else belongs to
//! a superseded epoch and is dropped, even if the transport failed to abort
//! it.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::TransportError;
use crate::host::{HttpRequest, HttpResponse, RequestId, Scheduler, TimerId, TimerKind, Transport};

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingQuery {
    timer: TimerId,
    query: String,
}

/// What became of a completion handed to [`RequestPipeline::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Live epoch, success status: normalize and render this body.
    Delivered(String),
    /// Live epoch, but the request failed. Nothing is rendered.
    Failed(TransportError),
    /// Completion of a superseded or cancelled epoch.
    Stale,
}

/// Request state of one attached input.
#[derive(Clone, Debug, Default)]
pub struct RequestPipeline {
    pending: Option<PendingQuery>,
    in_flight: Option<RequestId>,
    last_id: u64,
}

impl RequestPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the debounce window for `query`.
    pub fn trigger<S>(&mut self, scheduler: &mut S, query: String, delay: Duration)
    where
        S: Scheduler + ?Sized,
    {
        if let Some(previous) = self.pending.take() {
            scheduler.cancel(previous.timer);
        }
        let timer = scheduler.schedule(TimerKind::Query, delay);
        debug!(?timer, query = %query, "query debounce started");
        self.pending = Some(PendingQuery { timer, query });
    }

    /// Whether `timer` is this pipeline's live debounce timer.
    pub fn owns_timer(&self, timer: TimerId) -> bool {
        self.pending.as_ref().is_some_and(|p| p.timer == timer)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// Debounce timer expired: abort the previous request and send a new one.
    ///
    /// Returns the id of the request sent, or `None` if the timer was stale
    /// or no endpoint is configured.
    pub fn fire<T>(&mut self, timer: TimerId, transport: &mut T, config: &EngineConfig) -> Option<RequestId>
    where
        T: Transport + ?Sized,
    {
        if !self.owns_timer(timer) {
            debug!(?timer, "ignoring stale debounce timer");
            return None;
        }
        let pending = self.pending.take()?;

        if let Some(previous) = self.in_flight.take() {
            debug!(?previous, "aborting superseded request");
            transport.abort(previous);
        }

        let Some(request) = build_request(config, &pending.query) else {
            warn!("no endpoint configured; query not sent");
            return None;
        };

        self.last_id += 1;
        let id = RequestId(self.last_id);
        debug!(?id, method = %request.method, url = %request.url, "sending query");
        transport.send(id, request);
        self.in_flight = Some(id);
        Some(id)
    }

    /// Classify a transport completion.
    pub fn complete(&mut self, id: RequestId, result: Result<HttpResponse, TransportError>) -> Completion {
        if self.in_flight != Some(id) {
            debug!(?id, "dropping completion of superseded request");
            return Completion::Stale;
        }
        self.in_flight = None;
        match result {
            Ok(response) if response.is_success() => Completion::Delivered(response.body),
            Ok(response) => Completion::Failed(TransportError::Status(response.status)),
            Err(err) => Completion::Failed(err),
        }
    }

    /// End the current epoch: clear the timer and abort the request.
    pub fn cancel<H>(&mut self, host: &mut H)
    where
        H: Scheduler + Transport + ?Sized,
    {
        if let Some(pending) = self.pending.take() {
            host.cancel(pending.timer);
        }
        if let Some(id) = self.in_flight.take() {
            host.abort(id);
        }
    }
}

/// Build the request for `query`, or `None` without an endpoint.
///
/// The query parameter goes in the URL for `GET` (any case) and in the body
/// for every other method. Headers are attached as configured.
pub fn build_request(config: &EngineConfig, query: &str) -> Option<HttpRequest> {
    let endpoint = config.url()?;
    let param = format!(
        "{}={}",
        urlencoding::encode(config.query_param()),
        urlencoding::encode(query)
    );
    let method = config.http_method().to_string();
    let headers: Vec<(String, String)> = config
        .headers()
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let (url, body) = if method.eq_ignore_ascii_case("GET") {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        (format!("{}{}{}", endpoint, separator, param), None)
    } else {
        (endpoint.to_string(), Some(param))
    };

    Some(HttpRequest {
        method,
        url,
        headers,
        body,
    })
}
