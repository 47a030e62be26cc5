//! Types describing what the relay knows about its clients and buffers

use crate::{timestamp::Timestamp, validated::ClientId};
use std::collections::VecDeque;

/// The client a hook event concerns, as seen by the relay at that moment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientHandle<'a> {
    /// Relay-assigned identifier; empty for a client that didn't supply one
    pub identifier: &'a str,
    /// The client has finished connecting and is receiving live traffic
    /// rather than buffer playback
    pub ready: bool,
    /// The client tracks its own replay position (e.g. it negotiated
    /// `server-time`), and should never be filtered
    pub native_replay: bool,
}

impl<'a> ClientHandle<'a> {
    pub fn new(identifier: &'a str) -> Self {
        Self {
            identifier,
            ready: false,
            native_replay: false,
        }
    }

    pub fn ready(mut self) -> Self {
        self.ready = true;
        self
    }

    pub fn with_native_replay(mut self, native_replay: bool) -> Self {
        self.native_replay = native_replay;
        self
    }
}

/// Session state owned by the relay
pub trait Session {
    /// Whether the user has detached from `channel`
    fn is_detached(&self, channel: &str) -> bool;

    /// Whether any connection with the given identifier is currently attached
    fn is_connected(&self, client: &ClientId) -> bool;
}

/// One line of relay history
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferedLine {
    pub content: String,
    pub timestamp: Timestamp,
}

impl BufferedLine {
    pub fn new(content: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            content: content.into(),
            timestamp,
        }
    }
}

/// Read access to a channel or query buffer
pub trait Backlog {
    /// Timestamp of the newest buffered line
    fn last_timestamp(&self) -> Option<Timestamp>;

    fn is_empty(&self) -> bool {
        self.last_timestamp().is_none()
    }
}

impl Backlog for [BufferedLine] {
    fn last_timestamp(&self) -> Option<Timestamp> {
        self.last().map(|l| l.timestamp)
    }
}

impl Backlog for Vec<BufferedLine> {
    fn last_timestamp(&self) -> Option<Timestamp> {
        self.as_slice().last_timestamp()
    }
}

impl Backlog for VecDeque<BufferedLine> {
    fn last_timestamp(&self) -> Option<Timestamp> {
        self.back().map(|l| l.timestamp)
    }
}
