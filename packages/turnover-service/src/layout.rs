//! Fixed sheet layout shared by the row codec and the remote client.

use turnover_domain::MILESTONE_COUNT;
use turnover_sheets::CellRange;

/// id, created date, address, contact name, contact email.
pub const SCALAR_COLUMNS: usize = 5;
/// completed, completed date, tags JSON, notes JSON.
pub const COLUMNS_PER_MILESTONE: usize = 4;
pub const ROW_WIDTH: usize = SCALAR_COLUMNS + COLUMNS_PER_MILESTONE * MILESTONE_COUNT;

pub const HEADER_ROW: u32 = 1;
pub const FIRST_DATA_ROW: u32 = 2;

/// `ZZ`. Wider than any layout this crate writes, so it also sweeps away stale columns.
pub const CLEAR_ALL_LAST_COLUMN: usize = 701;

const LAST_COLUMN: usize = ROW_WIDTH - 1;

pub fn milestone_column(position: usize) -> usize {
	SCALAR_COLUMNS + COLUMNS_PER_MILESTONE * position
}

pub fn header_range() -> CellRange {
	CellRange::new(0, LAST_COLUMN, HEADER_ROW, HEADER_ROW)
}

/// Every data row up to and including `row_limit`.
pub fn data_range(row_limit: u32) -> CellRange {
	CellRange::new(0, LAST_COLUMN, FIRST_DATA_ROW, row_limit)
}

/// Exactly `rows` contiguous data rows starting below the header. `rows` must be non-zero.
pub fn write_range(rows: usize) -> CellRange {
	CellRange::new(0, LAST_COLUMN, FIRST_DATA_ROW, FIRST_DATA_ROW + rows as u32 - 1)
}

pub fn clear_all_range() -> CellRange {
	CellRange::columns(0, CLEAR_ALL_LAST_COLUMN)
}

/// How many entities fit below the header when reads stop at `row_limit`.
pub fn capacity(row_limit: u32) -> usize {
	row_limit.saturating_sub(HEADER_ROW) as usize
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn row_is_125_cells_wide() {
		assert_eq!(ROW_WIDTH, 125);
		assert_eq!(milestone_column(0), 5);
		assert_eq!(milestone_column(29) + COLUMNS_PER_MILESTONE, ROW_WIDTH);
	}

	#[test]
	fn ranges_cover_the_layout() {
		assert_eq!(header_range().to_string(), "A1:DU1");
		assert_eq!(data_range(1_000).to_string(), "A2:DU1000");
		assert_eq!(write_range(3).to_string(), "A2:DU4");
		assert_eq!(clear_all_range().to_string(), "A:ZZ");
		assert_eq!(capacity(1_000), 999);
	}
}
