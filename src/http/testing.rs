//! Scripted transport and recording observer for unit tests

use super::observer::{FetchEvent, FetchObserver};
use super::transport::{RawResponse, Transport};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted transport outcome
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Response(u16, Bytes),
    Down(String),
}

impl Reply {
    pub(crate) fn ok(body: impl Into<String>) -> Self {
        Self::Response(200, Bytes::from(body.into()))
    }

    pub(crate) fn status(status: u16) -> Self {
        Self::Response(status, Bytes::new())
    }

    pub(crate) fn down(message: &str) -> Self {
        Self::Down(message.to_string())
    }

    fn into_result(self) -> Result<RawResponse> {
        match self {
            Self::Response(status, body) => Ok(RawResponse::new(status, body)),
            Self::Down(message) => Err(Error::transport(message)),
        }
    }
}

/// Transport that replays a script and records requested URLs
#[derive(Debug, Default)]
pub(crate) struct StubTransport {
    script: Mutex<VecDeque<Reply>>,
    fallback: Option<Reply>,
    requests: Mutex<Vec<String>>,
}

impl StubTransport {
    pub(crate) fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        })
    }

    pub(crate) fn repeating(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            fallback: Some(reply),
            ..Self::default()
        })
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        let next = self.script.lock().unwrap().pop_front();
        next.or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Reply::down("stub script exhausted"))
            .into_result()
    }
}

/// Simplified copy of a [`FetchEvent`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Recorded {
    Attempt(u32),
    Response(u16),
    Failure,
    Sleep(Duration),
}

/// Observer that keeps every event
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingObserver {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Sleep(d) => Some(d),
                _ => None,
            })
            .collect()
    }
}

impl FetchObserver for RecordingObserver {
    fn on_event(&self, event: &FetchEvent<'_>) {
        let recorded = match event {
            FetchEvent::Attempt { attempt, .. } => Recorded::Attempt(*attempt),
            FetchEvent::Response { status, .. } => Recorded::Response(*status),
            FetchEvent::TransportFailure { .. } => Recorded::Failure,
            FetchEvent::Sleeping { delay, .. } => Recorded::Sleep(*delay),
        };
        self.events.lock().unwrap().push(recorded);
    }
}
