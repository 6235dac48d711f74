use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-key async mutexes. Work holding the guard for a key runs strictly one
/// at a time; different keys never wait on each other.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl KeyedLocks {
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.retain(|k, m| k == key || Arc::strong_count(m) > 1);
            Arc::clone(map.entry(key.to_owned()).or_default())
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_key_waits() {
        let locks = KeyedLocks::default();
        let guard = locks.lock("s1").await;
        let pending = tokio::time::timeout(Duration::from_millis(20), locks.lock("s1")).await;
        assert!(pending.is_err());
        drop(guard);
        assert!(tokio::time::timeout(Duration::from_millis(200), locks.lock("s1")).await.is_ok());
    }

    #[tokio::test]
    async fn different_keys_are_independent() {
        let locks = KeyedLocks::default();
        let _a = locks.lock("a").await;
        assert!(tokio::time::timeout(Duration::from_millis(200), locks.lock("b")).await.is_ok());
    }

    #[tokio::test]
    async fn idle_entries_are_pruned() {
        let locks = KeyedLocks::default();
        drop(locks.lock("a").await);
        drop(locks.lock("b").await);
        let _c = locks.lock("c").await;
        assert_eq!(locks.len(), 1);
    }
}
