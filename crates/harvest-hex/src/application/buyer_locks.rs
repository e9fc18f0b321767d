use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-buyer mutual exclusion. Every cart mutation and checkout for one
/// buyer runs under the buyer's lock, so concurrent requests cannot
/// interleave their read-modify-write of cart lines and totals. Different
/// buyers never contend.
#[derive(Clone, Default)]
pub struct BuyerLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl BuyerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, buyer_id: &str) -> OwnedMutexGuard<()> {
        // Drop entries nobody holds any more, otherwise the map grows by one
        // mutex per buyer ever seen. A held or contended lock keeps its Arc
        // strong count above the map's own reference and survives the sweep.
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        let lock = self
            .locks
            .entry(buyer_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn same_buyer_is_serialized() {
        let locks = BuyerLocks::new();
        let counter = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("buyer@example.com").await;
                let seen = counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                // Nobody else entered the critical section meanwhile.
                assert_eq!(counter.load(Ordering::SeqCst), seen + 1);
                counter.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
    }

    #[tokio::test]
    async fn different_buyers_do_not_block_each_other() {
        let locks = BuyerLocks::new();
        let _a = locks.acquire("a@example.com").await;
        // Would deadlock if buyer keys shared a lock.
        let _b = locks.acquire("b@example.com").await;
    }

    #[tokio::test]
    async fn released_locks_are_evicted_from_the_map() {
        let locks = BuyerLocks::new();
        drop(locks.acquire("a@example.com").await);
        assert_eq!(locks.locks.len(), 1);

        // The next acquire sweeps the idle entry; the one being held stays.
        let _b = locks.acquire("b@example.com").await;
        assert!(!locks.locks.contains_key("a@example.com"));
        let _c = locks.acquire("c@example.com").await;
        assert!(locks.locks.contains_key("b@example.com"));
    }
}
