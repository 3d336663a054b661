//! In-memory transport for deterministic dispatch tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::load_balancer::host::Host;
use crate::pool::request::{LogicalRequest, Method};
use crate::transport::{RawResponse, Transport, TransportError};

/// What the scripted host does with one request.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Respond(RawResponse),
    Fail(TransportError),
    /// Never answers; the caller's timeout decides.
    Hang,
}

impl Scripted {
    pub(crate) fn ok(body: &str) -> Self {
        Scripted::Respond(RawResponse::new(200, body))
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Scripted::Respond(RawResponse::new(status, body))
    }

    pub(crate) fn refused() -> Self {
        Scripted::Fail(TransportError::Connect("connection refused".into()))
    }
}

/// One request as seen by the transport.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub host: String,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// Replies per host: queued one-shot replies first, then the sticky reply,
/// then `200 {}`.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Scripted>>>,
    sticky: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, host: &str, reply: Scripted) {
        self.queued
            .lock()
            .unwrap()
            .entry(host.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn always(&self, host: &str, reply: Scripted) {
        self.sticky.lock().unwrap().insert(host.to_string(), reply);
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Host URLs in call order.
    pub(crate) fn hosts_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.host).collect()
    }

    pub(crate) fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn next_reply(&self, host: &str) -> Scripted {
        if let Some(reply) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(host)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }
        self.sticky
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_else(|| Scripted::ok("{}"))
    }
}

impl Transport for ScriptedTransport {
    async fn send(
        &self,
        host: &Host,
        request: &LogicalRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let key = host.url().to_string();
        self.calls.lock().unwrap().push(RecordedCall {
            host: key.clone(),
            method: request.method(),
            path: request.path().to_string(),
            query: request
                .query_pairs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: request.body_text().map(str::to_string),
            timeout,
        });

        match self.next_reply(&key) {
            Scripted::Respond(response) => Ok(response),
            Scripted::Fail(error) => Err(error),
            Scripted::Hang => std::future::pending().await,
        }
    }
}

/// Base URL of a fake host named `name`, as the registry renders it.
pub(crate) fn host_url(name: &str) -> String {
    format!("http://{}:8086/", name)
}
