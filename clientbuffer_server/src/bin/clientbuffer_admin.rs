use clientbuffer::{ClientId, Session};
use clientbuffer_server::config::ServerConfig;
use std::{collections::HashSet, path::PathBuf};
use structopt::StructOpt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, StructOpt)]
#[structopt(rename_all = "kebab")]
struct Opts {
    /// Config file location
    #[structopt(short, long)]
    config: PathBuf,

    /// Identifier of the client issuing the command, marked in listings
    #[structopt(long = "as")]
    current: Option<String>,

    /// Identifiers to report as connected in listings
    #[structopt(long)]
    connected: Vec<String>,

    /// The command to run, e.g. `AddClient phone`
    command: Vec<String>,
}

/// The admin tool runs outside the relay, so it only knows what it's told
struct OfflineSession {
    connected: HashSet<String>,
}

impl Session for OfflineSession {
    fn is_detached(&self, _channel: &str) -> bool {
        false
    }

    fn is_connected(&self, client: &ClientId) -> bool {
        self.connected.contains(client.as_str())
    }
}

pub fn main() -> Result<(), anyhow::Error> {
    let opts = Opts::from_args();

    let config = ServerConfig::load_file(&opts.config)?;

    if !config.log.dir.is_dir() {
        std::fs::create_dir_all(&config.log.dir)?;
    }
    clientbuffer_server::build_subscriber(config.log.clone())?.init();

    let engine = clientbuffer_server::open_engine(&config)?;
    let session = OfflineSession {
        connected: opts.connected.into_iter().collect(),
    };

    let line = opts.command.join(" ");
    tracing::debug!("Running admin command {:?}", line);

    for output in engine.handle_command(&line, opts.current.as_deref(), &session) {
        println!("{}", output);
    }
    Ok(())
}
