use crate::{timestamp::*, utils::OrLog};
use clientbuffer_store::{KeyValueStore, StoreError};

/// Watermarks and registrations for one relay user, kept in that user's
/// key/value namespace.
///
/// Two families of key live side by side:
///
///  * `client`: present if `client` is registered; the value is the time a
///    live line was last sent to it, or empty.
///  * `client/target`: the watermark for `client` on `target`.
///
/// Every operation is total. Store errors are logged and reported as a
/// failed operation, never propagated.
pub struct ClientStore<S> {
    store: S,
}

impl<S: KeyValueStore> ClientStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read and decode the time stored under `key`. Values that don't decode
    /// are treated as absent.
    pub(crate) fn read_time(&self, key: &str) -> Result<Watermark, StoreError> {
        let Some(value) = self.store.get(key)? else {
            return Ok(Watermark::NEVER);
        };

        Ok(Watermark::decode(&value).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable value for {}: {}", key, e);
            Watermark::NEVER
        }))
    }

    /// Store `ts` under `key` iff it is strictly newer than what is there
    pub(crate) fn advance_key(&self, key: &str, ts: Timestamp) -> bool {
        let current = match self.read_time(key) {
            Ok(current) => current,
            Err(e) => {
                tracing::error!("Couldn't read {}: {}", key, e);
                return false;
            }
        };

        if current.covers(ts) {
            return false;
        }

        let result = self.store.set(key, &Watermark::at(ts).encode());
        result.or_log(format_args!("storing {} for {}", ts, key));
        result.is_ok()
    }
}
