//! Client-specific buffer playback for a multi-client IRC relay.
//!
//! When several client connections share one upstream session, the relay
//! replays its buffered history to each client as it attaches. This crate
//! decides, per client and per target (channel or nick), which of those
//! replayed lines the client has already seen, so that each client only
//! receives the part of the backlog that is new to it.
//!
//! # Watermarks
//!
//! For every registered client and every target, the [`ClientStore`] records
//! the timestamp of the newest line that client is known to have received.
//! Two comparisons drive every decision:
//!
//!  * [`ClientStore::has_seen`] is true if the stored watermark is strictly
//!    newer than a given line;
//!  * [`ClientStore::advance`] moves the watermark forward, and fails if the
//!    new timestamp is not strictly newer than the stored one.
//!
//! Together they split time into "already seen", "new", and "equal"; equal is
//! treated as seen, so replaying the same backlog twice delivers nothing the
//! second time.
//!
//! # Hooks
//!
//! The relay calls into [`SuppressionEngine`] at fixed points: for each
//! replayed line, at the start and end of each replayed buffer, for each line
//! sent to or received from a live client, and when a client logs in. Every
//! hook returns a [`Verdict`]. Unregistered clients and clients which manage
//! their own replay position are never filtered.
//!
//! The engine holds no replay state between hooks; the start, line, and end
//! decisions are independent and rely only on the monotonic watermarks.

pub mod prelude;

mod validated;
pub use validated::*;

mod timestamp;
pub use timestamp::*;

mod key;
pub use key::WatermarkKey;

pub mod line;
pub use line::{AddressedLine, LineParser};

pub mod config;
pub use config::{EngineConfig, ParserConfig};

mod session;
pub use session::*;

mod store;
pub use store::ClientStore;

mod watermark;

mod registry;
pub use registry::DeregisterOutcome;

mod engine;
pub use engine::{SuppressionEngine, Verdict};

mod gate;

pub mod command;

mod table;
pub use table::Table;

pub mod utils;
