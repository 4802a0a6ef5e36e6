use std::time::Duration;

use tokio::time::Instant;

/// Time-boxed memo of a single value.
///
/// Every invalidation bumps a generation counter. A reader that started before an invalidation
/// can use [`ReadCache::put_if_current`] so its result does not overwrite the newer state.
#[derive(Debug)]
pub struct ReadCache<T> {
	ttl: Duration,
	entry: Option<(T, Instant)>,
	generation: u64,
}
impl<T> ReadCache<T>
where
	T: Clone,
{
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, entry: None, generation: 0 }
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// The cached value while `now` is before its expiry.
	pub fn get(&self, now: Instant) -> Option<T> {
		self.peek(now).cloned()
	}

	pub fn peek(&self, now: Instant) -> Option<&T> {
		match &self.entry {
			Some((value, expires_at)) if now < *expires_at => Some(value),
			_ => None,
		}
	}

	pub fn put(&mut self, value: T, now: Instant) {
		self.entry = Some((value, now + self.ttl));
	}

	/// Stores `value` only if nothing invalidated the cache since `generation` was read.
	pub fn put_if_current(&mut self, value: T, generation: u64, now: Instant) -> bool {
		if generation != self.generation {
			return false;
		}

		self.put(value, now);

		true
	}

	pub fn invalidate(&mut self) {
		self.entry = None;
		self.generation += 1;
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Remaining lifetime of a live entry.
	pub fn expires_in(&self, now: Instant) -> Option<Duration> {
		match &self.entry {
			Some((_, expires_at)) if now < *expires_at => Some(*expires_at - now),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TTL: Duration = Duration::from_millis(30_000);

	#[test]
	fn hit_until_ttl_then_miss() {
		let mut cache = ReadCache::new(TTL);
		let start = Instant::now();

		cache.put(vec![1, 2, 3], start);

		assert_eq!(cache.get(start + TTL - Duration::from_millis(1)), Some(vec![1, 2, 3]));
		assert_eq!(cache.get(start + TTL), None);
		assert_eq!(cache.get(start + TTL + Duration::from_millis(1)), None);
	}

	#[test]
	fn empty_cache_misses() {
		let cache: ReadCache<Vec<u8>> = ReadCache::new(TTL);

		assert!(cache.get(Instant::now()).is_none());
		assert!(cache.expires_in(Instant::now()).is_none());
	}

	#[test]
	fn invalidate_drops_value_before_expiry() {
		let mut cache = ReadCache::new(TTL);
		let start = Instant::now();

		cache.put("snapshot", start);
		cache.invalidate();

		assert!(cache.get(start).is_none());
	}

	#[test]
	fn stale_reader_cannot_repopulate_after_invalidation() {
		let mut cache = ReadCache::new(TTL);
		let start = Instant::now();
		let generation = cache.generation();

		cache.invalidate();

		assert!(!cache.put_if_current("old", generation, start));
		assert!(cache.get(start).is_none());
		assert!(cache.put_if_current("new", cache.generation(), start));
		assert_eq!(cache.get(start), Some("new"));
	}

	#[test]
	fn reports_remaining_lifetime() {
		let mut cache = ReadCache::new(TTL);
		let start = Instant::now();

		cache.put(0_u8, start);

		assert_eq!(
			cache.expires_in(start + Duration::from_millis(10_000)),
			Some(Duration::from_millis(20_000))
		);
	}
}
