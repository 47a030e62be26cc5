#![allow(dead_code)]

use clientbuffer::prelude::*;
use clientbuffer_store::MemoryStore;
use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
};

pub mod store;
pub use store::FlakyStore;

pub type TestEngine<S = MemoryStore> = SuppressionEngine<S, ManualClock>;

/// Send engine logs to the test harness, so verdicts show up for failing
/// tests
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

pub fn t(secs: i64) -> Timestamp {
    Timestamp::from_secs(secs)
}

pub fn client(name: &str) -> ClientId {
    name.parse().unwrap()
}

pub fn target(name: &str) -> Target {
    name.parse().unwrap()
}

/// A clock that only moves when told to
pub struct ManualClock(Cell<Timestamp>);

impl ManualClock {
    pub fn at(secs: i64) -> Self {
        Self(Cell::new(t(secs)))
    }

    pub fn set(&self, secs: i64) {
        self.0.set(t(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.0.get()
    }
}

#[derive(Default)]
pub struct FakeSession {
    pub detached: RefCell<HashSet<String>>,
    pub connected: RefCell<HashSet<String>>,
}

impl FakeSession {
    pub fn detach(&self, channel: &str) {
        self.detached.borrow_mut().insert(channel.to_string());
    }

    pub fn connect(&self, client: &str) {
        self.connected.borrow_mut().insert(client.to_string());
    }
}

impl Session for FakeSession {
    fn is_detached(&self, channel: &str) -> bool {
        self.detached.borrow().contains(channel)
    }

    fn is_connected(&self, client: &ClientId) -> bool {
        self.connected.borrow().contains(client.as_str())
    }
}

pub fn engine() -> TestEngine {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> TestEngine {
    init_logging();
    SuppressionEngine::with_clock(MemoryStore::new(), config, ManualClock::at(1_000))
}

/// An engine with the given clients already registered
pub fn engine_for(clients: &[&str]) -> TestEngine {
    let engine = engine();
    for name in clients {
        assert!(engine.store().register(&client(name)));
    }
    engine
}

pub fn backlog(lines: &[(i64, &str)]) -> Vec<BufferedLine> {
    lines
        .iter()
        .map(|(secs, content)| BufferedLine::new(*content, t(*secs)))
        .collect()
}

/// What the relay would actually deliver when replaying `lines` to `handle`
/// as a channel buffer, markers included
pub fn replay_channel<S: KeyValueStore, C: Clock>(
    engine: &SuppressionEngine<S, C>,
    handle: &ClientHandle,
    channel: &str,
    lines: &[BufferedLine],
) -> Vec<String> {
    let mut delivered = Vec::new();

    if engine.on_chan_buffer_starting(handle, channel, lines) == Verdict::Continue {
        delivered.push("<start>".to_string());
    }
    for line in lines {
        if engine.on_chan_buffer_play_line(handle, channel, &line.content, line.timestamp)
            == Verdict::Continue
        {
            delivered.push(line.content.clone());
        }
    }
    if engine.on_chan_buffer_ending(handle, channel, lines) == Verdict::Continue {
        delivered.push("<end>".to_string());
    }

    delivered
}
