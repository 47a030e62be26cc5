use crate::{key::WatermarkKey, prelude::*, utils::OrLog};

/// Result of removing a client and all of its watermarks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeregisterOutcome {
    /// Keys deleted, including the registration itself
    pub removed: usize,
    /// Keys that couldn't be deleted
    pub failed: usize,
}

impl DeregisterOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// The set of clients opted in to filtering
impl<S: KeyValueStore> ClientStore<S> {
    /// Register `client`. An existing registration, and its last-seen time,
    /// are left as they are. Returns `false` only if the store fails.
    pub fn register(&self, client: &ClientId) -> bool {
        let key = client.as_str();
        match self.inner().contains(key) {
            Ok(true) => true,
            Ok(false) => {
                let result = self.inner().set(key, "");
                result.or_log(format_args!("registering {}", client));
                result.is_ok()
            }
            Err(e) => {
                tracing::error!("Couldn't check registration of {}: {}", client, e);
                false
            }
        }
    }

    /// Remove `client` and every watermark it owns.
    ///
    /// Deletion carries on past individual failures; the registration itself
    /// is only removed if all the watermarks were, so a failed removal can
    /// be retried without leaving unreachable keys behind.
    pub fn deregister(&self, client: &ClientId) -> DeregisterOutcome {
        let mut outcome = DeregisterOutcome::default();

        let keys = match self.inner().keys_with_prefix(&WatermarkKey::prefix_for(client)) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!("Couldn't list watermarks for {}: {}", client, e);
                outcome.failed += 1;
                return outcome;
            }
        };

        for key in keys {
            match self.inner().delete(&key) {
                Ok(_) => outcome.removed += 1,
                Err(e) => {
                    tracing::error!("Couldn't delete {}: {}", key, e);
                    outcome.failed += 1;
                }
            }
        }

        if outcome.is_complete() {
            match self.inner().delete(client.as_str()) {
                Ok(true) => outcome.removed += 1,
                Ok(false) => (),
                Err(e) => {
                    tracing::error!("Couldn't delete registration {}: {}", client, e);
                    outcome.failed += 1;
                }
            }
        }

        tracing::debug!(%client, ?outcome, "deregistered");
        outcome
    }

    /// Whether the client named by `identifier` is registered. Empty and
    /// malformed identifiers never are.
    pub fn is_registered(&self, identifier: &str) -> bool {
        if ClientId::validate(identifier).is_err() {
            return false;
        }
        match self.inner().contains(identifier) {
            Ok(registered) => registered,
            Err(e) => {
                tracing::error!("Couldn't check registration of {}: {}", identifier, e);
                false
            }
        }
    }

    /// Registered clients, in storage order
    pub fn clients(&self) -> Vec<ClientId> {
        match self.inner().keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| !k.contains('/'))
                .filter_map(|k| ClientId::try_from(k).ok())
                .collect(),
            Err(e) => {
                tracing::error!("Couldn't list clients: {}", e);
                Vec::new()
            }
        }
    }

    /// The last time a live line was sent to `client`
    pub fn last_seen(&self, client: &ClientId) -> Watermark {
        self.read_time(client.as_str()).unwrap_or_else(|e| {
            tracing::error!("Couldn't read registration {}: {}", client, e);
            Watermark::NEVER
        })
    }

    /// Move `client`'s last-seen time forward to `ts`. Does nothing for an
    /// unregistered client.
    pub fn touch(&self, client: &ClientId, ts: Timestamp) -> bool {
        self.is_registered(client.as_str()) && self.advance_key(client.as_str(), ts)
    }
}
