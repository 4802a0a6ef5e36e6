use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_MIN_REQUEST_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_CACHE_TTL_MS: u64 = 30_000;
pub const DEFAULT_ROW_LIMIT: u32 = 1_000;
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_SHEETS_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	#[serde(default)]
	pub local: Local,
	#[serde(default)]
	pub sync: SyncPolicy,
	/// Absent until the remote spreadsheet has been set up.
	pub sheets: Option<Sheets>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: default_log_level() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Local {
	#[serde(default = "default_data_file")]
	pub data_file: PathBuf,
	/// Copied into place on first run when `data_file` does not exist yet.
	pub seed_file: Option<PathBuf>,
}
impl Default for Local {
	fn default() -> Self {
		Self { data_file: default_data_file(), seed_file: None }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncPolicy {
	#[serde(default = "default_min_request_interval_ms")]
	pub min_request_interval_ms: u64,
	#[serde(default = "default_cache_ttl_ms")]
	pub cache_ttl_ms: u64,
	/// Last sheet row addressed by reads and clears.
	#[serde(default = "default_row_limit")]
	pub row_limit: u32,
}
impl Default for SyncPolicy {
	fn default() -> Self {
		Self {
			min_request_interval_ms: default_min_request_interval_ms(),
			cache_ttl_ms: default_cache_ttl_ms(),
			row_limit: default_row_limit(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheets {
	pub spreadsheet_id: Option<String>,
	pub credentials_file: Option<PathBuf>,
	#[serde(default = "default_sheets_api_base")]
	pub api_base: String,
	#[serde(default = "default_sheets_timeout_ms")]
	pub timeout_ms: u64,
}
impl Sheets {
	/// Both identifiers are present; anything less is the "not configured yet" state.
	pub fn is_configured(&self) -> bool {
		self.spreadsheet_id.is_some() && self.credentials_file.is_some()
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_data_file() -> PathBuf {
	PathBuf::from("data").join("companies.json")
}

fn default_min_request_interval_ms() -> u64 {
	DEFAULT_MIN_REQUEST_INTERVAL_MS
}

fn default_cache_ttl_ms() -> u64 {
	DEFAULT_CACHE_TTL_MS
}

fn default_row_limit() -> u32 {
	DEFAULT_ROW_LIMIT
}

fn default_sheets_api_base() -> String {
	DEFAULT_SHEETS_API_BASE.to_string()
}

fn default_sheets_timeout_ms() -> u64 {
	DEFAULT_SHEETS_TIMEOUT_MS
}
