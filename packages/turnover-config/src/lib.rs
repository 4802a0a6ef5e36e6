mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_CACHE_TTL_MS, DEFAULT_MIN_REQUEST_INTERVAL_MS, DEFAULT_ROW_LIMIT,
	DEFAULT_SHEETS_API_BASE, DEFAULT_SHEETS_TIMEOUT_MS, Local, Service, Sheets, SyncPolicy,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.local.data_file.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "local.data_file must be non-empty.".to_string(),
		});
	}
	if cfg.sync.min_request_interval_ms == 0 {
		return Err(Error::Validation {
			message: "sync.min_request_interval_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.cache_ttl_ms == 0 {
		return Err(Error::Validation {
			message: "sync.cache_ttl_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.row_limit < 2 {
		return Err(Error::Validation {
			message: "sync.row_limit must be at least 2 to leave room below the header row."
				.to_string(),
		});
	}

	if let Some(sheets) = cfg.sheets.as_ref() {
		if sheets.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "sheets.api_base must be non-empty.".to_string(),
			});
		}
		if sheets.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "sheets.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.local.seed_file.as_deref().map(|path| path.as_os_str().is_empty()).unwrap_or(false) {
		cfg.local.seed_file = None;
	}

	if let Some(sheets) = cfg.sheets.as_mut() {
		sheets.spreadsheet_id = sheets
			.spreadsheet_id
			.take()
			.map(|id| id.trim().to_string())
			.filter(|id| !id.is_empty());

		if sheets
			.credentials_file
			.as_deref()
			.map(|path| path.as_os_str().is_empty())
			.unwrap_or(false)
		{
			sheets.credentials_file = None;
		}

		sheets.api_base = sheets.api_base.trim().trim_end_matches('/').to_string();
	}
}
