use clientbuffer_store::{KeyValueStore, MemoryStore, Result, StoreError};
use std::{cell::RefCell, collections::HashSet};

/// A memory store whose writes can be made to fail, either for particular
/// keys or all at once
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_keys: RefCell<HashSet<String>>,
    all_failing: RefCell<bool>,
}

impl FlakyStore {
    pub fn fail_key(&self, key: &str) {
        self.failing_keys.borrow_mut().insert(key.to_string());
    }

    pub fn fail_all(&self, failing: bool) {
        *self.all_failing.borrow_mut() = failing;
    }

    fn check(&self, key: &str) -> Result<()> {
        if *self.all_failing.borrow() || self.failing_keys.borrow().contains(key) {
            Err(StoreError::Unavailable(format!("write to {} refused", key)))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.check(key)?;
        self.inner.delete(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}
