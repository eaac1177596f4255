use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{hash::Hash, num::NonZeroU32, sync::Arc};

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// One in-memory limiter per key, created on first use and never evicted.
pub struct KeyedRateLimiters<K> {
    limiters: DashMap<K, Arc<Limiter>>,
    quota: Quota,
}

impl<K> KeyedRateLimiters<K>
where
    K: Eq + Hash + Clone,
{
    pub fn per_second(rate: u32) -> Self {
        Self::with_quota(Quota::per_second(non_zero(rate)))
    }

    pub fn per_minute(rate: u32) -> Self {
        Self::with_quota(Quota::per_minute(non_zero(rate)))
    }

    fn with_quota(quota: Quota) -> Self {
        Self {
            limiters: DashMap::new(),
            quota,
        }
    }

    /// Waits until `key` has a free cell.
    pub async fn acquire(&self, key: &K) {
        let limiter = self.get_or_create(key);
        limiter.until_ready().await;
    }

    /// Takes a cell for `key` if one is free, without waiting.
    pub fn try_acquire(&self, key: &K) -> bool {
        self.get_or_create(key).check().is_ok()
    }

    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }

    fn get_or_create(&self, key: &K) -> Arc<Limiter> {
        self.limiters
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)))
            .clone()
    }
}

fn non_zero(rate: u32) -> NonZeroU32 {
    NonZeroU32::new(rate).unwrap_or(NonZeroU32::MIN)
}
