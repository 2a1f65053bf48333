//! Request transports for the terminal host.
//!
//! Requests are fire-and-forget; completions come back over a channel and
//! the event loop turns them into `Event::Response`s. Aborting only marks
//! the id, so its completion is discarded when it eventually arrives.

use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use typeahead_core::{HttpRequest, HttpResponse, RequestId, TransportError};

use crate::error::{AppError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub type Completion = (RequestId, std::result::Result<HttpResponse, TransportError>);

enum Backend {
    Http(reqwest::blocking::Client),
    /// Every request is answered with the same body.
    Fixture(String),
}

pub struct Outbox {
    backend: Backend,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    aborted: HashSet<RequestId>,
}

impl Outbox {
    pub fn http() -> Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_backend(Backend::Http(client)))
    }

    pub fn fixture(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path).map_err(|source| AppError::Fixture {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::with_backend(Backend::Fixture(body)))
    }

    fn with_backend(backend: Backend) -> Self {
        let (tx, rx) = mpsc::channel();
        Outbox {
            backend,
            tx,
            rx,
            aborted: HashSet::new(),
        }
    }

    pub fn send(&mut self, id: RequestId, request: HttpRequest) {
        match &self.backend {
            Backend::Fixture(body) => {
                let _ = self.tx.send((id, Ok(HttpResponse::ok(body.clone()))));
            }
            Backend::Http(client) => {
                let client = client.clone();
                let tx = self.tx.clone();
                thread::spawn(move || {
                    let result = execute(&client, request);
                    // The receiver is gone once the front end has shut down.
                    let _ = tx.send((id, result));
                });
            }
        }
    }

    pub fn abort(&mut self, id: RequestId) {
        self.aborted.insert(id);
    }

    /// Completions that arrived since the last call, minus aborted ones.
    pub fn drain(&mut self) -> Vec<Completion> {
        let mut out = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            self.keep(completion, &mut out);
        }
        out
    }

    /// Block up to `timeout` for the next completion that was not aborted.
    pub fn wait(&mut self, timeout: Duration) -> Option<Completion> {
        let mut out = Vec::new();
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => self.keep(completion, &mut out),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
        }
        out.pop()
    }

    fn keep(&mut self, completion: Completion, out: &mut Vec<Completion>) {
        if self.aborted.remove(&completion.0) {
            debug!(id = ?completion.0, "discarding completion of aborted request");
            return;
        }
        out.push(completion);
    }
}

fn execute(
    client: &reqwest::blocking::Client,
    request: HttpRequest,
) -> std::result::Result<HttpResponse, TransportError> {
    let method = reqwest::Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| TransportError::Network(format!("invalid method '{}'", request.method)))?;
    let mut builder = client.request(method, &request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder.send().map_err(|err| {
        warn!(url = %request.url, error = %err, "request failed");
        TransportError::Network(err.to_string())
    })?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .map_err(|err| TransportError::Network(err.to_string()))?;
    Ok(HttpResponse { status, body })
}
