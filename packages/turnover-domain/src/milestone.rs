use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The turnover checklist in canonical order.
///
/// Row encoding, row decoding and the sheet header all read this table; a milestone's position
/// here is its column group in the sheet and, plus one, its id.
pub const MILESTONE_NAMES: [&str; 30] = [
	"Keys",
	"Power",
	"Water",
	"Deposit held",
	"Balance",
	"Move-out",
	"Quote",
	"Contact owner",
	"Email inspection video + quote",
	"Follow up date",
	"Approval",
	"Funds",
	"Order of materials",
	"Prebill",
	"Wait list",
	"Rehab start",
	"Add ons",
	"Rehab ends",
	"Dump and pick up material left on site",
	"Vendor?",
	"Cleaning",
	"Quality control -final walkthrough",
	"Final inspection",
	"Open recurring task lawn care",
	"Move in inspection",
	"Assign all rehab tasks to bill",
	"Video upload",
	"Turn off utilities",
	"List property",
	"Billing finalized",
];

pub const MILESTONE_COUNT: usize = MILESTONE_NAMES.len();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
	/// 1-based position in [`MILESTONE_NAMES`]. Derived, never stored remotely.
	#[serde(default)]
	pub id: u32,
	pub name: String,
	#[serde(default)]
	pub completed: bool,
	#[serde(default)]
	pub completed_date: String,
	#[serde(default)]
	pub tags: Vec<Value>,
	#[serde(default)]
	pub notes: Vec<Value>,
}
impl Milestone {
	/// An untouched checklist entry for the canonical slot `position`.
	pub fn pending(position: usize, name: &str) -> Self {
		Self {
			id: position as u32 + 1,
			name: name.to_string(),
			completed: false,
			completed_date: String::new(),
			tags: Vec::new(),
			notes: Vec::new(),
		}
	}

	pub fn complete(&mut self, date: impl Into<String>) {
		self.completed = true;
		self.completed_date = date.into();
	}

	pub fn reopen(&mut self) {
		self.completed = false;
		self.completed_date.clear();
	}
}

pub fn milestone_index(name: &str) -> Option<usize> {
	MILESTONE_NAMES.iter().position(|candidate| *candidate == name)
}

pub fn default_milestones() -> Vec<Milestone> {
	MILESTONE_NAMES
		.iter()
		.enumerate()
		.map(|(position, name)| Milestone::pending(position, name))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn names_are_unique() {
		for (position, name) in MILESTONE_NAMES.iter().enumerate() {
			assert_eq!(milestone_index(name), Some(position), "Duplicate milestone name {name}.");
		}
	}

	#[test]
	fn default_checklist_follows_table_order() {
		let milestones = default_milestones();

		assert_eq!(milestones.len(), MILESTONE_COUNT);
		assert_eq!(milestones[0].name, "Keys");
		assert_eq!(milestones[0].id, 1);
		assert_eq!(milestones[29].name, "Billing finalized");
		assert_eq!(milestones[29].id, 30);
		assert!(milestones.iter().all(|milestone| !milestone.completed));
	}

	#[test]
	fn reopen_clears_completion_date() {
		let mut milestone = Milestone::pending(0, "Keys");

		milestone.complete("2025-03-01");

		assert!(milestone.completed);

		milestone.reopen();

		assert!(!milestone.completed);
		assert!(milestone.completed_date.is_empty());
	}
}
