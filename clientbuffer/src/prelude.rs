//! Collects commonly-used names for convenient import

pub use crate::{
    command::AdminCommand,
    config::{EngineConfig, ParserConfig},
    line::{AddressedLine, LineParser},
    session::*,
    timestamp::*,
    validated::*,
    ClientStore, DeregisterOutcome, SuppressionEngine, Verdict, WatermarkKey,
};
pub use clientbuffer_store::{KeyValueStore, StoreError};
