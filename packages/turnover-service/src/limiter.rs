use std::time::Duration;

use tokio::{
	sync::Mutex,
	time::{self, Instant},
};

/// Paces outbound store requests so consecutive starts are at least `min_interval` apart.
///
/// Waiters queue in arrival order. This is not a concurrency cap: once a caller is released its
/// request may still be running when the next one is released.
#[derive(Debug)]
pub struct RateLimiter {
	min_interval: Duration,
	last_start: Mutex<Option<Instant>>,
}
impl RateLimiter {
	pub fn new(min_interval: Duration) -> Self {
		Self { min_interval, last_start: Mutex::new(None) }
	}

	pub fn min_interval(&self) -> Duration {
		self.min_interval
	}

	/// Waits for the next request slot and claims it.
	pub async fn acquire(&self) {
		let mut last_start = self.last_start.lock().await;

		if let Some(previous) = *last_start {
			let ready_at = previous + self.min_interval;
			let now = Instant::now();

			if now < ready_at {
				tracing::debug!(
					wait_ms = (ready_at - now).as_millis() as u64,
					"Waiting for the next request slot."
				);

				time::sleep_until(ready_at).await;
			}
		}

		*last_start = Some(Instant::now());
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;

	#[tokio::test(start_paused = true)]
	async fn first_acquire_does_not_wait() {
		let limiter = RateLimiter::new(Duration::from_millis(2_000));
		let start = Instant::now();

		limiter.acquire().await;

		assert_eq!(Instant::now(), start);
	}

	#[tokio::test(start_paused = true)]
	async fn consecutive_acquires_are_spaced() {
		let limiter = RateLimiter::new(Duration::from_millis(2_000));
		let mut starts = Vec::new();

		for _ in 0..4 {
			limiter.acquire().await;
			starts.push(Instant::now());
		}

		for pair in starts.windows(2) {
			assert!(pair[1] - pair[0] >= Duration::from_millis(2_000));
		}
	}

	#[tokio::test(start_paused = true)]
	async fn idle_time_counts_toward_the_interval() {
		let limiter = RateLimiter::new(Duration::from_millis(2_000));

		limiter.acquire().await;
		time::advance(Duration::from_millis(1_500)).await;

		let before = Instant::now();

		limiter.acquire().await;

		let waited = Instant::now() - before;

		assert!(waited >= Duration::from_millis(500), "Waited only {waited:?}.");
		assert!(waited < Duration::from_millis(2_000), "Waited a full interval: {waited:?}.");
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_waiters_are_released_one_interval_apart() {
		let limiter = Arc::new(RateLimiter::new(Duration::from_millis(100)));
		let mut handles = Vec::new();

		for _ in 0..3 {
			let limiter = limiter.clone();

			handles.push(tokio::spawn(async move {
				limiter.acquire().await;

				Instant::now()
			}));
		}

		let mut starts = Vec::new();

		for handle in handles {
			starts.push(handle.await.expect("acquire task panicked"));
		}

		starts.sort();

		for pair in starts.windows(2) {
			assert!(pair[1] - pair[0] >= Duration::from_millis(100));
		}
	}
}
