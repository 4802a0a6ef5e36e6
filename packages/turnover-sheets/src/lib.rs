pub mod http;
pub mod range;

mod error;

pub use error::{Error, Result};
pub use http::HttpSheetsStore;
pub use range::{CellRange, column_name};

use std::{future::Future, pin::Pin};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Cells travel as JSON values: strings, numbers, booleans, or null for blanks.
pub type CellValue = serde_json::Value;

/// Row-major cell values. Trailing blank rows and cells may be omitted by the store.
pub type Grid = Vec<Vec<CellValue>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreMetadata {
	pub spreadsheet_id: String,
	pub title: String,
}

/// Range-addressed access to a remote cell grid.
pub trait TabularStore
where
	Self: Send + Sync,
{
	/// Confirms the store is reachable.
	fn describe_store(&self) -> BoxFuture<'_, Result<StoreMetadata>>;

	fn read_range(&self, range: CellRange) -> BoxFuture<'_, Result<Grid>>;

	/// Overwrites the region with `rows`, row-major and left-aligned at the range origin.
	fn write_range<'a>(
		&'a self,
		range: CellRange,
		rows: &'a [Vec<CellValue>],
	) -> BoxFuture<'a, Result<()>>;

	/// Blanks every cell in the region.
	fn clear_range(&self, range: CellRange) -> BoxFuture<'_, Result<()>>;
}
