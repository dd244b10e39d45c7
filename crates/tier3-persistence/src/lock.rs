//! Per-LID serialization. Requests sharing a `normalized_id` must
//! serialize at least across (daily-count upsert, profile upsert,
//! manager-card decision) — spec.md §5. A DashMap of per-key async
//! mutexes gives exactly that without serializing unrelated LIDs.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct LidLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LidLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the lock for `normalized_id`, creating it on first use.
    /// Hold the returned guard for the duration of the critical section
    /// (daily-count upsert through the manager-card decision).
    pub async fn acquire(&self, normalized_id: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(normalized_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn serializes_same_lid() {
        let locks = Arc::new(LidLocks::new());
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let l1 = locks.clone();
        let o1 = order.clone();
        let h1 = tokio::spawn(async move {
            let _g = l1.acquire("555").await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            o1.lock().await.push(1);
        });

        tokio::time::sleep(Duration::from_millis(5)).await;

        let l2 = locks.clone();
        let o2 = order.clone();
        let h2 = tokio::spawn(async move {
            let _g = l2.acquire("555").await;
            o2.lock().await.push(2);
        });

        h1.await.unwrap();
        h2.await.unwrap();
        assert_eq!(*order.lock().await, vec![1, 2]);
    }

    #[tokio::test]
    async fn distinct_lids_do_not_block_each_other() {
        let locks = Arc::new(LidLocks::new());
        let g1 = locks.acquire("aaa").await;
        let g2 = locks.acquire("bbb").await;
        drop(g1);
        drop(g2);
    }
}
