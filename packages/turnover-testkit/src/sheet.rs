use std::{
	collections::{BTreeMap, HashSet},
	sync::{Arc, Mutex, MutexGuard},
};

use serde_json::Value;
use tokio::{sync::Semaphore, time::Instant};

use turnover_sheets::{
	BoxFuture, CellRange, CellValue, Error, Grid, Result, StoreMetadata, TabularStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetCall {
	Describe,
	Read,
	Write,
	Clear,
}

#[derive(Debug, Clone)]
pub struct CallRecord {
	pub call: SheetCall,
	pub range: Option<CellRange>,
	/// When the call reached the store, before any write gate.
	pub at: Instant,
}

type Cells = BTreeMap<u32, BTreeMap<usize, CellValue>>;

/// In-memory [`TabularStore`] that behaves like a spreadsheet values API.
///
/// Every call is recorded with its arrival time. Calls of a given kind can be made to fail, and
/// writes can be held behind a gate so tests can pile up concurrent saves.
#[derive(Default)]
pub struct MemorySheet {
	cells: Mutex<Cells>,
	calls: Mutex<Vec<CallRecord>>,
	failing: Mutex<HashSet<SheetCall>>,
	writes: Mutex<Vec<Grid>>,
	write_gate: Option<Arc<Semaphore>>,
}
impl MemorySheet {
	pub fn new() -> Self {
		Self::default()
	}

	/// A sheet whose writes block until the returned semaphore hands out a permit.
	pub fn gated() -> (Self, Arc<Semaphore>) {
		let gate = Arc::new(Semaphore::new(0));

		(Self { write_gate: Some(gate.clone()), ..Self::default() }, gate)
	}

	pub fn fail(&self, call: SheetCall) {
		lock(&self.failing).insert(call);
	}

	pub fn recover(&self, call: SheetCall) {
		lock(&self.failing).remove(&call);
	}

	pub fn calls(&self) -> Vec<CallRecord> {
		lock(&self.calls).clone()
	}

	pub fn count(&self, call: SheetCall) -> usize {
		lock(&self.calls).iter().filter(|record| record.call == call).count()
	}

	/// Payloads of every completed write, in order.
	pub fn writes(&self) -> Vec<Grid> {
		lock(&self.writes).clone()
	}

	/// Raw cell values of a sheet row with trailing blanks trimmed.
	pub fn row(&self, row: u32) -> Vec<CellValue> {
		let cells = lock(&self.cells);
		let Some(stored) = cells.get(&row) else {
			return Vec::new();
		};
		let width = stored.keys().next_back().map(|last| last + 1).unwrap_or(0);

		trim_row(
			(0..width).map(|column| stored.get(&column).cloned().unwrap_or_default()).collect(),
		)
	}

	/// Places raw cells directly, bypassing call recording.
	pub fn put_row(&self, row: u32, values: Vec<CellValue>) {
		let mut cells = lock(&self.cells);
		let stored = cells.entry(row).or_default();

		for (column, value) in values.into_iter().enumerate() {
			stored.insert(column, value);
		}
	}

	fn begin(&self, call: SheetCall, range: Option<CellRange>) -> Result<()> {
		lock(&self.calls).push(CallRecord { call, range, at: Instant::now() });

		if lock(&self.failing).contains(&call) {
			return Err(Error::Unavailable { message: format!("Injected {call:?} failure.") });
		}

		Ok(())
	}

	async fn describe(&self) -> Result<StoreMetadata> {
		self.begin(SheetCall::Describe, None)?;

		Ok(StoreMetadata { spreadsheet_id: "memory".to_string(), title: "Memory".to_string() })
	}

	async fn read(&self, range: CellRange) -> Result<Grid> {
		self.begin(SheetCall::Read, Some(range))?;

		let cells = lock(&self.cells);
		let mut grid = Vec::new();

		for (row, stored) in cells.range(range.first_row()..) {
			if range.last_row().is_some_and(|last| *row > last) {
				break;
			}

			let index = (*row - range.first_row()) as usize;
			let values = trim_row(
				(range.first_column()..=range.last_column())
					.map(|column| stored.get(&column).cloned().unwrap_or_default())
					.collect(),
			);

			if values.is_empty() {
				continue;
			}

			grid.resize(index, Vec::new());
			grid.push(values);
		}

		Ok(grid)
	}

	async fn write(&self, range: CellRange, rows: &[Vec<CellValue>]) -> Result<()> {
		self.begin(SheetCall::Write, Some(range))?;

		if let Some(gate) = &self.write_gate {
			gate.acquire()
				.await
				.map_err(|_| Error::Unavailable { message: "Write gate closed.".to_string() })?
				.forget();
		}

		let mut cells = lock(&self.cells);

		for (offset, values) in rows.iter().enumerate() {
			let stored = cells.entry(range.first_row() + offset as u32).or_default();

			for (column, value) in values.iter().enumerate() {
				stored.insert(range.first_column() + column, value.clone());
			}
		}

		drop(cells);
		lock(&self.writes).push(rows.to_vec());

		Ok(())
	}

	async fn clear(&self, range: CellRange) -> Result<()> {
		self.begin(SheetCall::Clear, Some(range))?;

		let mut cells = lock(&self.cells);

		for (row, stored) in cells.iter_mut() {
			stored.retain(|column, _| !range.contains(*row, *column));
		}

		cells.retain(|_, stored| !stored.is_empty());

		Ok(())
	}
}
impl TabularStore for MemorySheet {
	fn describe_store(&self) -> BoxFuture<'_, Result<StoreMetadata>> {
		Box::pin(self.describe())
	}

	fn read_range(&self, range: CellRange) -> BoxFuture<'_, Result<Grid>> {
		Box::pin(self.read(range))
	}

	fn write_range<'a>(
		&'a self,
		range: CellRange,
		rows: &'a [Vec<CellValue>],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.write(range, rows))
	}

	fn clear_range(&self, range: CellRange) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.clear(range))
	}
}

fn trim_row(mut values: Vec<CellValue>) -> Vec<CellValue> {
	while values.last().is_some_and(is_blank) {
		values.pop();
	}

	values
}

fn is_blank(value: &CellValue) -> bool {
	match value {
		Value::Null => true,
		Value::String(text) => text.is_empty(),
		_ => false,
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}
