//! A tiny single-value cache with an explicit time-to-live.

use chrono::{DateTime, Duration, Utc};

/// Caches one computed value together with its computation time.
///
/// Every read takes `now` as an argument so freshness is a pure function
/// of the supplied clock — tests never touch the wall clock.
#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Option<(T, DateTime<Utc>)>,
}

impl<T> TtlCache<T> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// True when a value is present and younger than the TTL.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|(_, computed_at)| now - *computed_at < self.ttl)
    }

    /// The cached value, only while fresh.
    #[must_use]
    pub fn get(&self, now: DateTime<Utc>) -> Option<&T> {
        if self.is_fresh(now) {
            self.entry.as_ref().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub fn put(&mut self, value: T, now: DateTime<Utc>) {
        self.entry = Some((value, now));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    #[test]
    fn empty_cache_is_stale() {
        let cache: TtlCache<i32> = TtlCache::new(Duration::hours(24));
        assert!(!cache.is_fresh(at(0)));
        assert!(cache.get(at(0)).is_none());
    }

    #[test]
    fn value_fresh_within_ttl() {
        let mut cache = TtlCache::new(Duration::hours(24));
        cache.put(42, at(0));

        assert_eq!(cache.get(at(12)), Some(&42));
        assert!(cache.is_fresh(at(23)));
    }

    #[test]
    fn value_expires_after_ttl() {
        let mut cache = TtlCache::new(Duration::hours(2));
        cache.put(42, at(0));

        assert!(cache.get(at(2)).is_none());
        assert!(!cache.is_fresh(at(3)));
    }

    #[test]
    fn invalidate_discards_the_entry() {
        let mut cache = TtlCache::new(Duration::hours(24));
        cache.put(42, at(0));
        cache.invalidate();

        assert!(cache.get(at(0)).is_none());
    }

    #[test]
    fn put_refreshes_the_clock() {
        let mut cache = TtlCache::new(Duration::hours(2));
        cache.put(1, at(0));
        cache.put(2, at(3));

        assert_eq!(cache.get(at(4)), Some(&2));
    }
}
