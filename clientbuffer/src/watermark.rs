use crate::{key::WatermarkKey, prelude::*};

/// Per-target watermarks
impl<S: KeyValueStore> ClientStore<S> {
    /// The newest time `client` is known to have seen on `target`.
    /// [`Watermark::NEVER`] if there is no record or it can't be read.
    pub fn watermark(&self, client: &ClientId, target: &Target) -> Watermark {
        let key = WatermarkKey::new(client.clone(), target.clone()).storage_key();
        self.read_time(&key).unwrap_or_else(|e| {
            tracing::error!("Couldn't read {}: {}", key, e);
            Watermark::NEVER
        })
    }

    /// Record that `client` has seen `target` up to `ts`.
    ///
    /// Succeeds only if `ts` is strictly newer than the stored watermark;
    /// otherwise, or if the store can't be written, nothing changes and
    /// `false` is returned.
    pub fn advance(&self, client: &ClientId, target: &Target, ts: Timestamp) -> bool {
        let key = WatermarkKey::new(client.clone(), target.clone()).storage_key();
        let advanced = self.advance_key(&key, ts);
        tracing::trace!(%key, %ts, advanced, "advance");
        advanced
    }

    /// Whether `client` has seen something on `target` strictly newer than `ts`
    pub fn has_seen(&self, client: &ClientId, target: &Target, ts: Timestamp) -> bool {
        self.watermark(client, target).has_seen(ts)
    }

    /// All of `client`'s watermarks, in storage order
    pub fn watermarks(&self, client: &ClientId) -> Vec<(Target, Watermark)> {
        let keys = match self.inner().keys_with_prefix(&WatermarkKey::prefix_for(client)) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!("Couldn't list watermarks for {}: {}", client, e);
                return Vec::new();
            }
        };

        keys.iter()
            .filter_map(|key| WatermarkKey::parse(key))
            .map(|key| {
                let mark = self.watermark(&key.client, &key.target);
                (key.target, mark)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientbuffer_store::MemoryStore;
    use std::str::FromStr;

    fn ids() -> (ClientId, Target) {
        (
            ClientId::from_str("laptop").unwrap(),
            Target::from_str("#rust").unwrap(),
        )
    }

    fn t(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    #[test]
    fn absent_is_never() {
        let store = ClientStore::new(MemoryStore::new());
        let (client, target) = ids();

        assert_eq!(store.watermark(&client, &target), Watermark::NEVER);
        assert!(!store.has_seen(&client, &target, t(i64::MIN / 2)));
    }

    #[test]
    fn advance_is_strictly_monotonic() {
        let store = ClientStore::new(MemoryStore::new());
        let (client, target) = ids();

        assert!(store.advance(&client, &target, t(100)));
        assert!(!store.advance(&client, &target, t(100)));
        assert!(!store.advance(&client, &target, t(50)));
        assert!(store.advance(&client, &target, Timestamp::new(100, 1)));

        assert_eq!(
            store.watermark(&client, &target),
            Watermark::at(Timestamp::new(100, 1))
        );
    }

    #[test]
    fn seen_after_advance() {
        let store = ClientStore::new(MemoryStore::new());
        let (client, target) = ids();

        assert!(store.advance(&client, &target, t(100)));
        assert!(store.advance(&client, &target, t(200)));
        assert!(store.has_seen(&client, &target, t(100)));
        assert!(!store.has_seen(&client, &target, t(200)));
    }

    #[test]
    fn targets_are_independent() {
        let store = ClientStore::new(MemoryStore::new());
        let (client, target) = ids();
        let other = Target::from_str("#other").unwrap();

        assert!(store.advance(&client, &target, t(200)));
        assert!(store.advance(&client, &other, t(100)));
        assert!(!store.has_seen(&client, &other, t(150)));

        let phone = ClientId::from_str("phone").unwrap();
        assert!(store.advance(&phone, &target, t(100)));
    }

    #[test]
    fn storage_encoding() {
        let store = ClientStore::new(MemoryStore::new());
        let (client, target) = ids();

        store.advance(&client, &target, Timestamp::new(1700000000, 250));
        assert_eq!(
            store.inner().get("laptop/#rust").unwrap().as_deref(),
            Some("1700000000.000250")
        );
    }

    #[test]
    fn legacy_and_unreadable_values() {
        let store = ClientStore::new(MemoryStore::with_entries([
            ("laptop/#rust", "1700000000.5"),
            ("laptop/#broken", "yesterday"),
        ]));
        let client = ClientId::from_str("laptop").unwrap();

        assert_eq!(
            store.watermark(&client, &Target::from_str("#rust").unwrap()),
            Watermark::at(Timestamp::new(1700000000, 500_000))
        );

        let broken = Target::from_str("#broken").unwrap();
        assert_eq!(store.watermark(&client, &broken), Watermark::NEVER);
        assert!(store.advance(&client, &broken, t(1)));
    }

    #[test]
    fn list_watermarks() {
        let store = ClientStore::new(MemoryStore::new());
        let (client, target) = ids();
        let nick = Target::from_str("friend").unwrap();

        store.advance(&client, &target, t(1));
        store.advance(&client, &nick, t(2));
        store.advance(&ClientId::from_str("phone").unwrap(), &target, t(3));

        assert_eq!(
            store.watermarks(&client),
            vec![
                (target, Watermark::at(t(1))),
                (nick, Watermark::at(t(2))),
            ]
        );
    }
}
