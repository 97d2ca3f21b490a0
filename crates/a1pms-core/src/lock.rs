//! Per-RIC shared/exclusive lock
//!
//! Synchronization takes the lock exclusively for its whole run; status reads
//! and service-expiry deletes take it shared. Acquisition is FIFO, so an
//! exclusive request waits for the shared holders already inside and blocks
//! newcomers behind it.
//!
//! Every acquisition returns a [`LockGuard`]; dropping the guard releases the
//! lock, which keeps the outstanding count balanced on early returns, panics
//! and task cancellation alike.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Kind of acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    /// Concurrent readers
    Shared,
    /// Single writer
    Exclusive,
}

/// Reader/writer lock with an observable count of outstanding acquisitions.
pub struct Lock {
    inner: RwLock<()>,
    outstanding: AtomicUsize,
}

impl Lock {
    /// Create an unlocked lock.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(()),
            outstanding: AtomicUsize::new(0),
        }
    }

    /// Wait until the lock can be taken with the given kind.
    pub async fn lock(&self, kind: LockKind) -> LockGuard<'_> {
        let held = match kind {
            LockKind::Shared => Held::Shared(self.inner.read().await),
            LockKind::Exclusive => Held::Exclusive(self.inner.write().await),
        };
        self.acquired(kind, held)
    }

    /// Take the lock shared.
    pub async fn lock_shared(&self) -> LockGuard<'_> {
        self.lock(LockKind::Shared).await
    }

    /// Take the lock exclusively.
    pub async fn lock_exclusive(&self) -> LockGuard<'_> {
        self.lock(LockKind::Exclusive).await
    }

    /// Take the lock without waiting. Fails while an exclusive holder exists,
    /// or when exclusive access is requested while anyone holds it.
    pub fn try_lock(&self, kind: LockKind) -> Option<LockGuard<'_>> {
        let held = match kind {
            LockKind::Shared => Held::Shared(self.inner.try_read().ok()?),
            LockKind::Exclusive => Held::Exclusive(self.inner.try_write().ok()?),
        };
        Some(self.acquired(kind, held))
    }

    /// Number of guards currently alive.
    pub fn lock_count(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn acquired<'a>(&'a self, kind: LockKind, held: Held<'a>) -> LockGuard<'a> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(kind = ?kind, count = self.lock_count(), "lock acquired");
        LockGuard {
            lock: self,
            kind,
            _held: held,
        }
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock")
            .field("outstanding", &self.lock_count())
            .finish()
    }
}

enum Held<'a> {
    Shared(#[allow(dead_code)] RwLockReadGuard<'a, ()>),
    Exclusive(#[allow(dead_code)] RwLockWriteGuard<'a, ()>),
}

/// RAII handle for one acquisition of a [`Lock`].
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<'a> {
    lock: &'a Lock,
    kind: LockKind,
    _held: Held<'a>,
}

impl LockGuard<'_> {
    /// Kind this guard was acquired with.
    pub fn kind(&self) -> LockKind {
        self.kind
    }
}

impl fmt::Debug for LockGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard").field("kind", &self.kind).finish()
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        let previous = self.lock.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(
            previous > 0,
            "Number of unlocks must match the number of locks"
        );
        tracing::trace!(kind = ?self.kind, count = previous.saturating_sub(1), "lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shared_holders_coexist() {
        let lock = Lock::new();
        let a = lock.lock_shared().await;
        let b = lock.lock_shared().await;
        assert_eq!(lock.lock_count(), 2);
        assert!(lock.try_lock(LockKind::Exclusive).is_none());
        drop(a);
        drop(b);
        assert_eq!(lock.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_exclusive_blocks_everyone() {
        let lock = Lock::new();
        let guard = lock.lock_exclusive().await;
        assert_eq!(guard.kind(), LockKind::Exclusive);
        assert!(lock.try_lock(LockKind::Shared).is_none());
        assert!(lock.try_lock(LockKind::Exclusive).is_none());
        drop(guard);
        assert!(lock.try_lock(LockKind::Exclusive).is_some());
        assert_eq!(lock.lock_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exclusive_waits_for_shared_holder() {
        let lock = Arc::new(Lock::new());
        let shared = lock.lock_shared().await;

        let writer = {
            let lock = lock.clone();
            tokio::spawn(async move {
                let _guard = lock.lock_exclusive().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!writer.is_finished());

        drop(shared);
        writer.await.unwrap();
        assert_eq!(lock.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_count_balanced_after_panicking_holder() {
        let lock = Arc::new(Lock::new());
        let task = {
            let lock = lock.clone();
            tokio::spawn(async move {
                let _guard = lock.lock_exclusive().await;
                panic!("holder failed");
            })
        };

        assert!(task.await.is_err());
        assert_eq!(lock.lock_count(), 0);
        assert!(lock.try_lock(LockKind::Exclusive).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_balanced_after_cancelled_holder() {
        let lock = Lock::new();
        let hold_forever = async {
            let _guard = lock.lock_shared().await;
            std::future::pending::<()>().await;
        };

        let result = tokio::time::timeout(Duration::from_secs(1), hold_forever).await;

        assert!(result.is_err());
        assert_eq!(lock.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_interleaved_sequences_return_to_zero() {
        let lock = Lock::new();
        for round in 0..20 {
            let mut guards = Vec::new();
            for _ in 0..(round % 4) {
                guards.push(lock.lock_shared().await);
            }
            assert_eq!(lock.lock_count(), round % 4);
            guards.clear();
            let exclusive = lock.lock_exclusive().await;
            assert_eq!(lock.lock_count(), 1);
            drop(exclusive);
        }
        assert_eq!(lock.lock_count(), 0);
    }
}
