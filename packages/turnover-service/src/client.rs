use std::{
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use tokio::time::Instant;

use turnover_config::SyncPolicy;
use turnover_domain::Company;
use turnover_sheets::{CellValue, StoreMetadata, TabularStore};

use crate::{
	BoxFuture, Error, Result,
	cache::ReadCache,
	codec,
	coalescer::{SaveCoalescer, WriteFn},
	layout,
	limiter::RateLimiter,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
	pub min_request_interval: Duration,
	pub cache_ttl: Duration,
	/// Last sheet row holding data.
	pub row_limit: u32,
}
impl ClientOptions {
	pub fn from_policy(policy: &SyncPolicy) -> Self {
		Self {
			min_request_interval: Duration::from_millis(policy.min_request_interval_ms),
			cache_ttl: Duration::from_millis(policy.cache_ttl_ms),
			row_limit: policy.row_limit,
		}
	}
}
impl Default for ClientOptions {
	fn default() -> Self {
		Self::from_policy(&SyncPolicy::default())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
	pub cached: bool,
	pub entries: usize,
	pub expires_in: Option<Duration>,
}

struct Shared {
	store: Arc<dyn TabularStore>,
	limiter: RateLimiter,
	cache: Mutex<ReadCache<Vec<Company>>>,
	row_limit: u32,
}
impl Shared {
	fn cache(&self) -> MutexGuard<'_, ReadCache<Vec<Company>>> {
		self.cache.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn invalidate(&self) {
		self.cache().invalidate();
	}

	async fn ensure_header(&self) -> Result<StoreMetadata> {
		self.limiter.acquire().await;

		let metadata = self.store.describe_store().await?;

		self.limiter.acquire().await;

		let existing = self.store.read_range(layout::header_range()).await?;
		let header = codec::header_row().into_cells();

		if let Some(row) = existing.first()
			&& !row.is_empty()
		{
			if *row != header {
				tracing::warn!(
					title = %metadata.title,
					columns = row.len(),
					expected = header.len(),
					"Sheet header does not match the row layout; leaving it in place."
				);
			}

			return Ok(metadata);
		}

		self.limiter.acquire().await;
		self.store.write_range(layout::header_range(), &[header]).await?;

		tracing::info!(spreadsheet_id = %metadata.spreadsheet_id, "Sheet header initialized.");

		Ok(metadata)
	}

	async fn replace_rows(&self, companies: Vec<Company>) -> Result<bool> {
		let result = self.write_rows(&companies).await;

		// Even a failed save may have cleared rows already.
		self.invalidate();

		result
	}

	async fn write_rows(&self, companies: &[Company]) -> Result<bool> {
		let capacity = layout::capacity(self.row_limit);

		if companies.len() > capacity {
			return Err(Error::InvalidRequest {
				message: format!(
					"Cannot store {} companies; the sheet holds at most {capacity}.",
					companies.len()
				),
			});
		}

		self.limiter.acquire().await;
		self.store.clear_range(layout::data_range(self.row_limit)).await?;

		if companies.is_empty() {
			tracing::info!("Cleared remote rows for an empty save.");

			return Ok(true);
		}

		let rows: Vec<Vec<CellValue>> =
			companies.iter().map(|company| codec::encode(company).into_cells()).collect();

		self.limiter.acquire().await;
		self.store.write_range(layout::write_range(rows.len()), &rows).await?;

		tracing::info!(count = rows.len(), "Saved companies to the remote sheet.");

		Ok(true)
	}
}

/// Rate-limited, cached, write-coalescing access to the company sheet.
///
/// All store calls from one client go through a single [`RateLimiter`]. Reads are served from a
/// time-boxed cache that every save clears. Saves go through a [`SaveCoalescer`] so overlapping
/// "replace everything" calls produce one write of the newest collection.
pub struct RemoteStoreClient {
	shared: Arc<Shared>,
	saves: SaveCoalescer<Vec<Company>, bool>,
}
impl RemoteStoreClient {
	pub fn new(store: Arc<dyn TabularStore>, options: ClientOptions) -> Self {
		let shared = Arc::new(Shared {
			store,
			limiter: RateLimiter::new(options.min_request_interval),
			cache: Mutex::new(ReadCache::new(options.cache_ttl)),
			row_limit: options.row_limit,
		});
		let writer = shared.clone();
		let write: WriteFn<Vec<Company>, bool> =
			Arc::new(move |companies: Vec<Company>| -> BoxFuture<'static, Result<bool>> {
				let shared = writer.clone();

				Box::pin(async move { shared.replace_rows(companies).await })
			});

		Self { shared, saves: SaveCoalescer::new(write) }
	}

	/// Confirms the store is reachable and writes the layout header into row 1 when that row is
	/// empty. An existing header is never overwritten. Failures are logged and reported as
	/// `false`.
	pub async fn initialize(&self) -> bool {
		match self.shared.ensure_header().await {
			Ok(metadata) => {
				tracing::info!(
					spreadsheet_id = %metadata.spreadsheet_id,
					title = %metadata.title,
					"Remote sheet ready."
				);

				true
			},
			Err(err) => {
				tracing::error!(error = %err, "Failed to initialize the remote sheet.");

				false
			},
		}
	}

	pub async fn list(&self) -> Result<Vec<Company>> {
		let generation = {
			let cache = self.shared.cache();

			if let Some(companies) = cache.get(Instant::now()) {
				tracing::debug!(count = companies.len(), "Returning cached companies.");

				return Ok(companies);
			}

			cache.generation()
		};

		self.shared.limiter.acquire().await;

		let grid = self.shared.store.read_range(layout::data_range(self.shared.row_limit)).await?;
		let companies = codec::decode_rows(&grid);
		let stored =
			self.shared.cache().put_if_current(companies.clone(), generation, Instant::now());

		if stored {
			tracing::debug!(count = companies.len(), "Cached companies.");
		} else {
			tracing::debug!("A save landed during the read; result not cached.");
		}

		Ok(companies)
	}

	/// Replaces every data row with `companies`. Concurrent calls are coalesced; each caller
	/// receives the result of the write that superseded or carried its payload.
	pub async fn replace_all(&self, companies: Vec<Company>) -> Result<bool> {
		self.saves.enqueue(companies).await
	}

	/// Blanks the whole sheet, header included.
	pub async fn clear_all(&self) -> Result<bool> {
		self.shared.limiter.acquire().await;
		self.shared.store.clear_range(layout::clear_all_range()).await?;
		self.shared.invalidate();

		tracing::info!("Cleared every cell in the remote sheet.");

		Ok(true)
	}

	pub async fn force_refresh(&self) -> Result<Vec<Company>> {
		self.shared.invalidate();

		self.list().await
	}

	pub fn invalidate_cache(&self) {
		self.shared.invalidate();
	}

	pub fn cache_status(&self) -> CacheStatus {
		let now = Instant::now();
		let cache = self.shared.cache();
		let entries = cache.peek(now).map(Vec::len);

		CacheStatus {
			cached: entries.is_some(),
			entries: entries.unwrap_or(0),
			expires_in: cache.expires_in(now),
		}
	}
}
