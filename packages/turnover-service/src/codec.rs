//! Row codec between [`Company`] and one fixed-width sheet row.
//!
//! Columns 0-4 hold the scalar fields. Each canonical milestone then owns four columns:
//! completed, completed date, tags (JSON array) and notes (JSON array). The layout never depends
//! on content, so every row is exactly [`ROW_WIDTH`] cells.
//!
//! Decoding degrades instead of failing: an unparsable id becomes 0 and a malformed tags or
//! notes cell becomes an empty list, so one damaged cell cannot block loading the rest.

use serde_json::Value;

use turnover_domain::{Company, MILESTONE_NAMES, Milestone};
use turnover_sheets::CellValue;

use crate::{
	Error, Result,
	layout::{ROW_WIDTH, milestone_column},
};

/// The sheet's rendering of a checked box.
const TRUE_LITERAL: &str = "TRUE";
const FALSE_LITERAL: &str = "FALSE";
const EMPTY_LIST: &str = "[]";

/// One sheet row, always exactly [`ROW_WIDTH`] cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(Vec<CellValue>);
impl Row {
	/// Accepts a row as read from the store. Missing trailing cells are padded with blanks;
	/// more cells than the layout has is an error.
	pub fn from_cells(mut cells: Vec<CellValue>) -> Result<Self> {
		if cells.len() > ROW_WIDTH {
			return Err(Error::InvalidRequest {
				message: format!("Row has {} cells; the layout holds {ROW_WIDTH}.", cells.len()),
			});
		}

		cells.resize(ROW_WIDTH, Value::Null);

		Ok(Self(cells))
	}

	pub fn cells(&self) -> &[CellValue] {
		&self.0
	}

	pub fn into_cells(self) -> Vec<CellValue> {
		self.0
	}

	/// A row whose id cell is empty marks unused sheet space rather than an entity.
	pub fn is_blank(&self) -> bool {
		is_falsy(&self.0[0])
	}

	fn cell(&self, column: usize) -> &CellValue {
		&self.0[column]
	}
}

/// Column titles matching [`encode`]'s layout.
pub fn header_row() -> Row {
	let mut cells = Vec::with_capacity(ROW_WIDTH);

	for title in ["ID", "Created Date", "Address", "Contact Name", "Contact Email"] {
		cells.push(Value::from(title));
	}
	for name in MILESTONE_NAMES {
		for suffix in ["Completed", "Date", "Tags", "Notes"] {
			cells.push(Value::from(format!("{name} {suffix}")));
		}
	}

	Row(cells)
}

pub fn encode(company: &Company) -> Row {
	let mut cells = Vec::with_capacity(ROW_WIDTH);

	cells.push(encode_id(company.id));
	cells.push(Value::from(company.created_date.as_str()));
	cells.push(Value::from(company.address.as_str()));
	cells.push(Value::from(company.contact_name.as_str()));
	cells.push(Value::from(company.contact_email.as_str()));

	for name in MILESTONE_NAMES {
		match company.milestone(name) {
			Some(milestone) => {
				cells.push(Value::Bool(milestone.completed));
				cells.push(Value::from(milestone.completed_date.as_str()));
				cells.push(Value::from(encode_list(&milestone.tags)));
				cells.push(Value::from(encode_list(&milestone.notes)));
			},
			None => {
				cells.push(Value::Bool(false));
				cells.push(Value::from(""));
				cells.push(Value::from(EMPTY_LIST));
				cells.push(Value::from(EMPTY_LIST));
			},
		}
	}

	Row(cells)
}

pub fn decode(row: &Row) -> Company {
	let milestones = MILESTONE_NAMES
		.iter()
		.enumerate()
		.map(|(position, name)| {
			let column = milestone_column(position);

			Milestone {
				id: position as u32 + 1,
				name: name.to_string(),
				completed: is_true(row.cell(column)),
				completed_date: cell_text(row.cell(column + 1)),
				tags: decode_list(row.cell(column + 2), name, "tags"),
				notes: decode_list(row.cell(column + 3), name, "notes"),
			}
		})
		.collect();

	Company {
		id: decode_id(row.cell(0)),
		created_date: cell_text(row.cell(1)),
		address: cell_text(row.cell(2)),
		contact_name: cell_text(row.cell(3)),
		contact_email: cell_text(row.cell(4)),
		milestones,
	}
}

/// Decodes a block of data rows, skipping blank ones.
pub fn decode_rows(grid: &[Vec<CellValue>]) -> Vec<Company> {
	let mut companies = Vec::with_capacity(grid.len());

	for cells in grid {
		if cells.first().is_none_or(is_falsy) {
			continue;
		}

		match Row::from_cells(cells.clone()) {
			Ok(row) => companies.push(decode(&row)),
			Err(err) => {
				tracing::warn!(error = %err, "Skipping sheet row that does not fit the layout.");
			},
		}
	}

	companies
}

/// Id 0 means "unassigned" and is written as a blank cell, which decoding then skips.
fn encode_id(id: i64) -> CellValue {
	if id == 0 { Value::from("") } else { Value::from(id) }
}

fn encode_list(values: &[Value]) -> String {
	Value::Array(values.to_vec()).to_string()
}

fn decode_id(value: &CellValue) -> i64 {
	match value {
		Value::Number(number) => {
			number
				.as_i64()
				.or_else(|| number.as_f64().map(|float| float.trunc() as i64))
				.unwrap_or(0)
		},
		Value::String(text) => parse_leading_int(text).unwrap_or(0),
		_ => 0,
	}
}

/// Integer prefix of `text` after leading whitespace, so `"12"` and `"12.0"` both give 12.
fn parse_leading_int(text: &str) -> Option<i64> {
	let trimmed = text.trim_start();
	let digits_start = usize::from(trimmed.starts_with(['-', '+']));
	let digits_len =
		trimmed[digits_start..].bytes().take_while(|byte| byte.is_ascii_digit()).count();

	if digits_len == 0 {
		return None;
	}

	trimmed[..digits_start + digits_len].parse().ok()
}

fn decode_list(value: &CellValue, milestone: &str, field: &str) -> Vec<Value> {
	let text = cell_text(value);

	if text.trim().is_empty() {
		return Vec::new();
	}

	match serde_json::from_str::<Vec<Value>>(&text) {
		Ok(values) => values,
		Err(err) => {
			tracing::debug!(
				milestone,
				field,
				error = %err,
				"Malformed list cell decoded as empty."
			);

			Vec::new()
		},
	}
}

fn is_true(value: &CellValue) -> bool {
	match value {
		Value::Bool(flag) => *flag,
		Value::String(text) => text == TRUE_LITERAL,
		_ => false,
	}
}

fn is_falsy(value: &CellValue) -> bool {
	match value {
		Value::Null => true,
		Value::Bool(flag) => !flag,
		Value::Number(number) => number.as_f64().is_none_or(|float| float == 0.0),
		Value::String(text) => text.is_empty(),
		Value::Array(_) | Value::Object(_) => false,
	}
}

fn cell_text(value: &CellValue) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(text) => text.clone(),
		Value::Bool(true) => TRUE_LITERAL.to_string(),
		Value::Bool(false) => FALSE_LITERAL.to_string(),
		other => other.to_string(),
	}
}
