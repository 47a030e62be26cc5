use crate::{prelude::*, utils::is_channel_name};
use std::str::FromStr;

/// What the relay should do with the line or marker a hook was called for
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Verdict {
    /// Deliver it
    Continue,
    /// Drop it for this client
    Halt,
}

impl Verdict {
    pub fn halt_if(condition: bool) -> Self {
        if condition {
            Self::Halt
        } else {
            Self::Continue
        }
    }
}

/// Per-client replay filtering for one relay user.
///
/// The relay calls the `on_*` hooks as traffic flows; each returns a
/// [`Verdict`]. The only state is the watermark store, so hooks can be
/// called in any combination without the engine losing track of a replay in
/// progress.
///
/// Buffer start and end markers are handled separately, see
/// [`on_chan_buffer_starting`](Self::on_chan_buffer_starting).
pub struct SuppressionEngine<S, C = SystemClock> {
    store: ClientStore<S>,
    parser: LineParser,
    clock: C,
    config: EngineConfig,
}

impl<S: KeyValueStore> SuppressionEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self::with_clock(store, config, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> SuppressionEngine<S, C> {
    pub fn with_clock(store: S, config: EngineConfig, clock: C) -> Self {
        Self {
            store: ClientStore::new(store),
            parser: LineParser::new(config.parser.clone()),
            clock,
            config,
        }
    }

    pub fn store(&self) -> &ClientStore<S> {
        &self.store
    }

    pub fn parser(&self) -> &LineParser {
        &self.parser
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The client's identifier, if this client is subject to filtering at all
    pub(crate) fn filtered_client(&self, client: &ClientHandle) -> Option<ClientId> {
        if client.native_replay || !self.store.is_registered(client.identifier) {
            return None;
        }
        ClientId::from_str(client.identifier).ok()
    }

    /// A line from a channel or query buffer is about to be replayed.
    ///
    /// Lines the client has already seen are halted. Anything else advances
    /// the client's watermark to the line's time and is delivered, unless
    /// the advance fails: a line whose delivery can't be recorded is not
    /// replayed.
    pub fn on_buffer_play_line(
        &self,
        client: &ClientHandle,
        target: &str,
        line: &str,
        ts: Timestamp,
    ) -> Verdict {
        let Some(id) = self.filtered_client(client) else {
            return Verdict::Continue;
        };
        let Ok(target) = Target::from_str(target) else {
            tracing::debug!("Not filtering replay for unusable target {:?}", target);
            return Verdict::Continue;
        };

        let verdict = if self.store.has_seen(&id, &target, ts) {
            Verdict::Halt
        } else {
            Verdict::halt_if(!self.store.advance(&id, &target, ts))
        };

        tracing::debug!(client = %id, %target, %ts, %verdict, "replay {}", line);
        verdict
    }

    pub fn on_chan_buffer_play_line(
        &self,
        client: &ClientHandle,
        channel: &str,
        line: &str,
        ts: Timestamp,
    ) -> Verdict {
        self.on_buffer_play_line(client, channel, line, ts)
    }

    pub fn on_priv_buffer_play_line(
        &self,
        client: &ClientHandle,
        nick: &str,
        line: &str,
        ts: Timestamp,
    ) -> Verdict {
        self.on_buffer_play_line(client, nick, line, ts)
    }

    /// A line is being sent to a client.
    ///
    /// Live traffic is never halted. For a ready client, the target the line
    /// concerns is marked as seen now, unless it's a channel the user has
    /// detached from, and the client's last-seen time is refreshed whether
    /// or not the line could be attributed.
    ///
    /// Attribution uses the line's target parameter, so a private message
    /// sent to the user advances the user's own nick rather than the sender's
    /// query buffer. Such messages are still replayed from the query buffer.
    pub fn on_send_to_client(
        &self,
        client: &ClientHandle,
        line: &str,
        session: &impl Session,
    ) -> Verdict {
        if !client.ready {
            return Verdict::Continue;
        }
        let Some(id) = self.filtered_client(client) else {
            return Verdict::Continue;
        };

        let now = self.clock.now();

        if let Some(target) = self.live_target(line) {
            if is_channel_name(target.as_str()) && session.is_detached(target.as_str()) {
                tracing::trace!(client = %id, %target, "not advancing detached channel");
            } else {
                self.store.advance(&id, &target, now);
            }
        }

        self.store.touch(&id, now);
        Verdict::Continue
    }

    /// A line was received from a client.
    ///
    /// Anything the client says to a target, other than joining it, shows it
    /// has seen that target up to now. Never halts.
    pub fn on_user_raw(&self, client: &ClientHandle, line: &str) -> Verdict {
        let Some(id) = self.filtered_client(client) else {
            return Verdict::Continue;
        };

        let Some(parsed) = self.parser.parse(line) else {
            return Verdict::Continue;
        };
        if parsed.is_command("JOIN") {
            return Verdict::Continue;
        }

        if let Ok(target) = Target::from_str(parsed.target) {
            self.store.advance(&id, &target, self.clock.now());
        }
        Verdict::Continue
    }

    /// As [`on_user_raw`](Self::on_user_raw), for a line straight off the
    /// wire. Invalid UTF-8 is replaced rather than rejected.
    pub fn on_user_raw_bytes(&self, client: &ClientHandle, line: &[u8]) -> Verdict {
        self.on_user_raw(client, &String::from_utf8_lossy(line))
    }

    /// A client has finished logging in. With `autoadd` set, identified
    /// clients are registered the first time they appear.
    ///
    /// Returns whether a new registration was made.
    pub fn on_client_login(&self, client: &ClientHandle) -> bool {
        if !self.config.autoadd || self.store.is_registered(client.identifier) {
            return false;
        }
        let Ok(id) = ClientId::from_str(client.identifier) else {
            return false;
        };

        let added = self.store.register(&id);
        if added {
            tracing::info!("Automatically added client {}", id);
        }
        added
    }

    fn live_target(&self, line: &str) -> Option<Target> {
        let parsed = self.parser.parse(line)?;
        Target::from_str(parsed.target).ok()
    }
}
