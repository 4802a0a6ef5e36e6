use std::fmt::{self, Display, Formatter};

/// A rectangular sheet region rendered in A1 notation.
///
/// Columns are 0-based indexes; rows are 1-based sheet rows. A range without rows spans whole
/// columns (`A:ZZ`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
	first_column: usize,
	last_column: usize,
	rows: Option<(u32, u32)>,
}
impl CellRange {
	pub fn new(first_column: usize, last_column: usize, first_row: u32, last_row: u32) -> Self {
		let first_row = first_row.max(1);

		Self {
			first_column: first_column.min(last_column),
			last_column: first_column.max(last_column),
			rows: Some((first_row.min(last_row), first_row.max(last_row))),
		}
	}

	pub fn columns(first_column: usize, last_column: usize) -> Self {
		Self {
			first_column: first_column.min(last_column),
			last_column: first_column.max(last_column),
			rows: None,
		}
	}

	pub fn first_column(&self) -> usize {
		self.first_column
	}

	pub fn last_column(&self) -> usize {
		self.last_column
	}

	pub fn first_row(&self) -> u32 {
		self.rows.map(|(first, _)| first).unwrap_or(1)
	}

	/// `None` for whole-column ranges.
	pub fn last_row(&self) -> Option<u32> {
		self.rows.map(|(_, last)| last)
	}

	pub fn width(&self) -> usize {
		self.last_column - self.first_column + 1
	}

	pub fn contains(&self, row: u32, column: usize) -> bool {
		let row_in_range = match self.rows {
			Some((first, last)) => (first..=last).contains(&row),
			None => row >= 1,
		};

		row_in_range && (self.first_column..=self.last_column).contains(&column)
	}
}
impl Display for CellRange {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let first = column_name(self.first_column);
		let last = column_name(self.last_column);

		match self.rows {
			Some((first_row, last_row)) => write!(f, "{first}{first_row}:{last}{last_row}"),
			None => write!(f, "{first}:{last}"),
		}
	}
}

/// Spreadsheet column letters for a 0-based index: 0 is `A`, 25 is `Z`, 26 is `AA`.
pub fn column_name(index: usize) -> String {
	let mut remaining = index + 1;
	let mut letters = Vec::new();

	while remaining > 0 {
		let offset = (remaining - 1) % 26;

		letters.push(char::from(b'A' + offset as u8));

		remaining = (remaining - 1) / 26;
	}

	letters.iter().rev().collect()
}
