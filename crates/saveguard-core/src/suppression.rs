//! Persisted "don't show the conflict hint again" flag

use saveguard_host::StateStore;
use std::fmt;
use std::sync::Arc;

/// Suppression flag backed by the host's key-value store
///
/// Once set it stays set; there is no clearing path.
#[derive(Clone)]
pub struct SuppressionFlag {
    store: Arc<dyn StateStore>,
    key: String,
}

impl SuppressionFlag {
    /// Bind the flag to `key` in `store`
    #[inline]
    pub fn new(store: Arc<dyn StateStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// User opted out of the hint
    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.store.get_bool(&self.key)
    }

    /// Opt out of the hint
    pub fn set(&self) {
        tracing::debug!(key = %self.key, "Suppressing save conflict hint");
        self.store.store(&self.key, true);
    }

    /// Storage key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for SuppressionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuppressionFlag").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Store {}
        impl StateStore for Store {
            fn get_bool(&self, key: &str) -> bool;
            fn store(&self, key: &str, value: bool);
        }
    }

    #[test]
    fn suppression_reads_bound_key() {
        let mut store = MockStore::new();
        store
            .expect_get_bool()
            .with(eq("hint.off"))
            .times(1)
            .return_const(true);

        let flag = SuppressionFlag::new(Arc::new(store), "hint.off");
        assert!(flag.is_set());
    }

    #[test]
    fn suppression_set_persists_true() {
        let mut store = MockStore::new();
        store
            .expect_store()
            .with(eq("hint.off"), eq(true))
            .times(1)
            .return_const(());

        let flag = SuppressionFlag::new(Arc::new(store), "hint.off");
        flag.set();
    }
}
