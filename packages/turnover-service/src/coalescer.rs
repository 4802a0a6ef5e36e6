use std::{
	mem,
	sync::{Arc, Mutex, MutexGuard},
};

use tokio::sync::oneshot;

use crate::{BoxFuture, Error, Result};

/// The underlying write a [`SaveCoalescer`] runs for the winning payload of each drain.
pub type WriteFn<P, T> = Arc<dyn Fn(P) -> BoxFuture<'static, Result<T>> + Send + Sync>;

struct Pending<P, T> {
	payload: P,
	reply: oneshot::Sender<Result<T>>,
}

struct Queue<P, T> {
	pending: Vec<Pending<P, T>>,
	draining: bool,
}

/// Serializes whole-state saves and collapses bursts into a single write.
///
/// Each drain takes the most recently enqueued payload, writes only that one, and settles every
/// request that was pending at that moment with the same result. Requests that arrive while a
/// write is in flight wait for the next drain. At most one write runs at a time.
///
/// Older payloads in a burst are never written. That is only sound because every payload is a
/// full snapshot of the collection.
pub struct SaveCoalescer<P, T> {
	queue: Arc<Mutex<Queue<P, T>>>,
	write: WriteFn<P, T>,
}
impl<P, T> SaveCoalescer<P, T>
where
	P: Send + 'static,
	T: Clone + Send + 'static,
{
	pub fn new(write: WriteFn<P, T>) -> Self {
		Self { queue: Arc::new(Mutex::new(Queue { pending: Vec::new(), draining: false })), write }
	}

	/// Queues `payload` and waits for the write that settles it.
	pub async fn enqueue(&self, payload: P) -> Result<T> {
		let (reply, settled) = oneshot::channel();
		let start_drain = {
			let mut queue = lock(&self.queue);

			queue.pending.push(Pending { payload, reply });

			!mem::replace(&mut queue.draining, true)
		};

		if start_drain {
			tokio::spawn(drain(self.queue.clone(), self.write.clone()));
		}

		settled.await.unwrap_or_else(|_| {
			Err(Error::Queue { message: "Save request was dropped before it settled.".to_string() })
		})
	}

	pub fn pending(&self) -> usize {
		lock(&self.queue).pending.len()
	}

	pub fn is_draining(&self) -> bool {
		lock(&self.queue).draining
	}
}

async fn drain<P, T>(queue: Arc<Mutex<Queue<P, T>>>, write: WriteFn<P, T>)
where
	P: Send + 'static,
	T: Clone + Send + 'static,
{
	loop {
		let (latest, superseded) = {
			let mut queue = lock(&queue);
			let Some(latest) = queue.pending.pop() else {
				queue.draining = false;

				return;
			};

			(latest, mem::take(&mut queue.pending))
		};
		let settles = superseded.len() + 1;

		tracing::debug!(settles, "Draining save queue.");

		let result = match tokio::spawn(write(latest.payload)).await {
			Ok(result) => result,
			Err(err) => Err(Error::Queue { message: format!("Save task did not complete: {err}.") }),
		};

		if let Err(err) = &result {
			tracing::error!(error = %err, settles, "Coalesced save failed.");
		}

		let _ = latest.reply.send(result.clone());

		for entry in superseded {
			let _ = entry.reply.send(result.clone());
		}
	}
}

fn lock<P, T>(queue: &Mutex<Queue<P, T>>) -> MutexGuard<'_, Queue<P, T>> {
	queue.lock().unwrap_or_else(|err| err.into_inner())
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use tokio::sync::Semaphore;

	use super::*;

	struct Recorder {
		writes: Mutex<Vec<u32>>,
		gate: Semaphore,
		fail: bool,
	}
	impl Recorder {
		fn new(permits: usize, fail: bool) -> Arc<Self> {
			Arc::new(Self { writes: Mutex::new(Vec::new()), gate: Semaphore::new(permits), fail })
		}

		fn writes(&self) -> Vec<u32> {
			self.writes.lock().unwrap_or_else(|err| err.into_inner()).clone()
		}
	}

	fn coalescer(recorder: Arc<Recorder>) -> SaveCoalescer<u32, usize> {
		SaveCoalescer::new(Arc::new(move |payload: u32| -> BoxFuture<'static, Result<usize>> {
			let recorder = recorder.clone();

			Box::pin(async move {
				recorder.writes.lock().unwrap_or_else(|err| err.into_inner()).push(payload);
				recorder
					.gate
					.acquire()
					.await
					.map_err(|err| Error::Queue { message: err.to_string() })?
					.forget();

				if recorder.fail {
					return Err(Error::TransportUnavailable { message: "boom".to_string() });
				}

				Ok(recorder.writes().len())
			})
		}))
	}

	#[tokio::test]
	async fn burst_collapses_into_one_write_of_the_last_payload() {
		let recorder = Recorder::new(usize::MAX >> 4, false);
		let saves = coalescer(recorder.clone());
		let (a, b, c, d) =
			tokio::join!(saves.enqueue(1), saves.enqueue(2), saves.enqueue(3), saves.enqueue(4));

		assert_eq!(recorder.writes(), vec![4]);

		for result in [a, b, c, d] {
			assert_eq!(result, Ok(1));
		}

		assert!(!saves.is_draining());
	}

	#[tokio::test]
	async fn arrivals_during_a_write_drain_next() {
		let recorder = Recorder::new(0, false);
		let saves = Arc::new(coalescer(recorder.clone()));
		let first = tokio::spawn({
			let saves = saves.clone();

			async move { saves.enqueue(1).await }
		});

		while recorder.writes().is_empty() {
			tokio::task::yield_now().await;
		}

		let mut later = Vec::new();

		for payload in [2, 3, 4] {
			let saves = saves.clone();

			later.push(tokio::spawn(async move { saves.enqueue(payload).await }));
		}

		while saves.pending() < 3 {
			tokio::task::yield_now().await;
		}

		recorder.gate.add_permits(2);

		assert_eq!(first.await.expect("first save panicked"), Ok(1));

		for handle in later {
			assert_eq!(handle.await.expect("later save panicked"), Ok(2));
		}

		assert_eq!(recorder.writes(), vec![1, 4]);
	}

	#[tokio::test]
	async fn failure_reaches_every_coalesced_caller() {
		let recorder = Recorder::new(usize::MAX >> 4, true);
		let saves = coalescer(recorder.clone());
		let (a, b, c) = tokio::join!(saves.enqueue(1), saves.enqueue(2), saves.enqueue(3));
		let expected = Err(Error::TransportUnavailable { message: "boom".to_string() });

		assert_eq!(a, expected);
		assert_eq!(b, expected);
		assert_eq!(c, expected);
		assert_eq!(recorder.writes(), vec![3]);
	}

	#[tokio::test]
	async fn queue_recovers_after_a_failed_drain() {
		let calls = Arc::new(AtomicUsize::new(0));
		let saves: SaveCoalescer<u32, u32> = SaveCoalescer::new(Arc::new({
			let calls = calls.clone();

			move |payload: u32| -> BoxFuture<'static, Result<u32>> {
				let attempt = calls.fetch_add(1, Ordering::SeqCst);

				Box::pin(async move {
					if attempt == 0 {
						return Err(Error::TransportUnavailable { message: "down".to_string() });
					}

					Ok(payload)
				})
			}
		}));

		assert!(saves.enqueue(1).await.is_err());
		assert_eq!(saves.enqueue(2).await, Ok(2));
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}
}
