use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per FID. Holding a [`UserGuard`] serializes the
/// check-then-claim sequence for that user while other users proceed.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>,
}

pub struct UserGuard<'a> {
    fid: u64,
    owner: &'a UserLocks,
    _guard: OwnedMutexGuard<()>,
}

impl UserLocks {
    pub async fn acquire(&self, fid: u64) -> UserGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(fid).or_default())
        };

        UserGuard {
            fid,
            owner: self,
            _guard: lock.lock_owned().await,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.owner.locks.lock().unwrap_or_else(PoisonError::into_inner);

        // map + this guard; anything above means someone is queued
        if locks
            .get(&self.fid)
            .is_some_and(|lock| Arc::strong_count(lock) == 2)
        {
            locks.remove(&self.fid);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;

    #[tokio::test]
    async fn same_user_is_serialized() {
        let locks = UserLocks::default();
        let inside = AtomicUsize::new(0);
        let max_inside = AtomicUsize::new(0);

        let (locks, inside, max_inside) = (&locks, &inside, &max_inside);

        let critical = move || async move {
            let _guard = locks.acquire(7).await;
            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
            max_inside.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            inside.fetch_sub(1, Ordering::SeqCst);
        };

        tokio::join!(critical(), critical(), critical());

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn different_users_do_not_block() {
        let locks = UserLocks::default();

        let _first = locks.acquire(1).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;

        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
