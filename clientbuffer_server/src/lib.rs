//! Configuration, logging and command-line plumbing for running the client
//! buffer module outside a relay.

pub mod config;

mod tracing_config;
pub use tracing_config::build_subscriber;

use clientbuffer::SuppressionEngine;
use clientbuffer_store::JsonFileStore;

/// Open the configured store and build an engine over it
pub fn open_engine(
    config: &config::ServerConfig,
) -> Result<SuppressionEngine<JsonFileStore>, anyhow::Error> {
    let store = JsonFileStore::open(&config.store)?;
    Ok(SuppressionEngine::new(store, config.clientbuffer.clone()))
}
