use serde::{Deserialize, Serialize};
use time::Date;

use crate::milestone::{MILESTONE_NAMES, Milestone, default_milestones};

/// One tracked turnover job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
	#[serde(default)]
	pub id: i64,
	#[serde(default)]
	pub created_date: String,
	#[serde(default)]
	pub address: String,
	#[serde(default)]
	pub contact_name: String,
	#[serde(default)]
	pub contact_email: String,
	#[serde(default)]
	pub milestones: Vec<Milestone>,
}
impl Company {
	/// A new job with an unassigned id and the full default checklist.
	pub fn new(
		address: impl Into<String>,
		contact_name: impl Into<String>,
		contact_email: impl Into<String>,
	) -> Self {
		Self {
			id: 0,
			created_date: String::new(),
			address: address.into(),
			contact_name: contact_name.into(),
			contact_email: contact_email.into(),
			milestones: default_milestones(),
		}
	}

	pub fn milestone(&self, name: &str) -> Option<&Milestone> {
		self.milestones.iter().find(|milestone| milestone.name == name)
	}

	pub fn milestone_mut(&mut self, name: &str) -> Option<&mut Milestone> {
		self.milestones.iter_mut().find(|milestone| milestone.name == name)
	}

	pub fn stamp_created_date(&mut self, today: Date) {
		if self.created_date.trim().is_empty() {
			self.created_date = today.to_string();
		}
	}

	/// Rebuilds the checklist in canonical order.
	///
	/// Recorded progress is kept for every known name; missing names get pending entries and
	/// names outside the canonical table are dropped, since the sheet has no columns for them.
	pub fn normalize_milestones(&mut self) {
		let mut recorded = std::mem::take(&mut self.milestones);

		self.milestones = MILESTONE_NAMES
			.iter()
			.enumerate()
			.map(|(position, name)| {
				match recorded.iter().position(|milestone| milestone.name == *name) {
					Some(found) => {
						let mut milestone = recorded.swap_remove(found);

						milestone.id = position as u32 + 1;

						milestone
					},
					None => Milestone::pending(position, name),
				}
			})
			.collect();
	}
}

/// Next id for a new company: one past the largest existing id.
pub fn next_company_id(companies: &[Company]) -> i64 {
	companies.iter().map(|company| company.id).max().unwrap_or(0).max(0) + 1
}
