pub mod company;
pub mod milestone;

pub use company::{Company, next_company_id};
pub use milestone::{
	MILESTONE_COUNT, MILESTONE_NAMES, Milestone, default_milestones, milestone_index,
};
