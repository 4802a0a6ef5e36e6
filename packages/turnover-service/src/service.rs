use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;

use turnover_config::{Config, Sheets};
use turnover_domain::{Company, next_company_id};
use turnover_sheets::{HttpSheetsStore, TabularStore};
use turnover_storage::LocalStore;

use crate::{
	Error, Result,
	client::{CacheStatus, ClientOptions, RemoteStoreClient},
};

/// Result of a caller-facing action that reports instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
	pub success: bool,
	pub message: String,
}
impl Outcome {
	pub fn ok(message: impl Into<String>) -> Self {
		Self { success: true, message: message.into() }
	}

	pub fn failed(message: impl Into<String>) -> Self {
		Self { success: false, message: message.into() }
	}
}

/// Company tracking over the remote sheet when one is configured, the local file otherwise.
pub struct TurnoverService {
	local: LocalStore,
	options: ClientOptions,
	remote: Option<RemoteStoreClient>,
}
impl TurnoverService {
	pub fn new(local: LocalStore, options: ClientOptions) -> Self {
		Self { local, options, remote: None }
	}

	/// Opens the local store and, when `[sheets]` is complete, connects the remote sheet.
	///
	/// A remote that fails to initialize is logged and left unattached; the service then runs on
	/// the local file.
	pub async fn open(cfg: &Config) -> Result<Self> {
		let local = LocalStore::open(&cfg.local.data_file, cfg.local.seed_file.as_deref()).await?;
		let mut service = Self::new(local, ClientOptions::from_policy(&cfg.sync));

		if let Some(sheets) = &cfg.sheets
			&& sheets.is_configured()
		{
			let outcome = service.configure_remote(sheets).await;

			if !outcome.success {
				tracing::warn!(reason = %outcome.message, "Running on the local data file.");
			}
		}

		Ok(service)
	}

	pub fn local(&self) -> &LocalStore {
		&self.local
	}

	pub fn remote(&self) -> Option<&RemoteStoreClient> {
		self.remote.as_ref()
	}

	pub fn is_remote_configured(&self) -> bool {
		self.remote.is_some()
	}

	pub async fn configure_remote(&mut self, sheets: &Sheets) -> Outcome {
		match HttpSheetsStore::from_config(sheets).await {
			Ok(store) => self.attach_remote(Arc::new(store)).await,
			Err(err) => {
				let err = Error::from(err);

				tracing::error!(error = %err, "Failed to build the sheet transport.");

				Outcome::failed(err.to_string())
			},
		}
	}

	/// Wraps `store` in a client and keeps it only if initialization succeeds.
	pub async fn attach_remote(&mut self, store: Arc<dyn TabularStore>) -> Outcome {
		let client = RemoteStoreClient::new(store, self.options.clone());

		if !client.initialize().await {
			return Outcome::failed("Could not initialize the remote sheet.");
		}

		self.remote = Some(client);

		Outcome::ok("Remote sheet connected.")
	}

	pub fn reset_remote(&mut self) {
		if self.remote.take().is_some() {
			tracing::info!("Remote sheet detached.");
		}
	}

	/// Loads from the remote sheet, falling back to the local file when the remote read fails.
	pub async fn load_companies(&self) -> Result<Vec<Company>> {
		if let Some(remote) = &self.remote {
			match remote.list().await {
				Ok(companies) => return Ok(companies),
				Err(err) => {
					tracing::warn!(
						error = %err,
						"Remote load failed; falling back to the local data file."
					);
				},
			}
		}

		self.load_local().await
	}

	/// Loads from the active store only. Edits start from this collection, so a failed remote
	/// read is returned instead of falling back to a possibly stale local file.
	pub async fn load_active(&self) -> Result<Vec<Company>> {
		match &self.remote {
			Some(remote) => remote.list().await,
			None => self.load_local().await,
		}
	}

	pub async fn save_companies(&self, companies: Vec<Company>) -> Outcome {
		let count = companies.len();

		match self.store(companies).await {
			Ok(()) => Outcome::ok(format!("Saved {count} companies.")),
			Err(err) => Outcome::failed(err.to_string()),
		}
	}

	/// Appends `company` with the next free id and returns it as stored.
	pub async fn add_company(&self, mut company: Company) -> Result<Company> {
		let mut companies = self.load_active().await?;

		company.id = next_company_id(&companies);
		company.stamp_created_date(OffsetDateTime::now_utc().date());
		company.normalize_milestones();
		companies.push(company.clone());

		self.store(companies).await?;

		tracing::info!(id = company.id, "Company added.");

		Ok(company)
	}

	/// Replaces the company with the same id. Returns `false` when there is none.
	pub async fn update_company(&self, mut company: Company) -> Result<bool> {
		let mut companies = self.load_active().await?;
		let Some(slot) = companies.iter_mut().find(|existing| existing.id == company.id) else {
			return Ok(false);
		};

		company.normalize_milestones();

		*slot = company;

		self.store(companies).await?;

		Ok(true)
	}

	/// Removes the company with `id`. Returns `false` when there is none.
	pub async fn delete_company(&self, id: i64) -> Result<bool> {
		let mut companies = self.load_active().await?;
		let before = companies.len();

		companies.retain(|company| company.id != id);

		if companies.len() == before {
			return Ok(false);
		}

		self.store(companies).await?;

		tracing::info!(id, "Company deleted.");

		Ok(true)
	}

	pub async fn force_refresh(&self) -> Result<Vec<Company>> {
		self.clear_cache();

		self.load_active().await
	}

	/// `None` when no remote is attached.
	pub fn cache_status(&self) -> Option<CacheStatus> {
		self.remote.as_ref().map(RemoteStoreClient::cache_status)
	}

	pub fn clear_cache(&self) {
		if let Some(remote) = &self.remote {
			remote.invalidate_cache();
		}
	}

	/// Empties the active store. A cleared sheet gets its header row back.
	pub async fn clear_all_data(&self) -> Outcome {
		let Some(remote) = &self.remote else {
			return match self.local.write_all(&[]).await {
				Ok(()) => Outcome::ok("Local data cleared."),
				Err(err) => Outcome::failed(Error::from(err).to_string()),
			};
		};

		if let Err(err) = remote.clear_all().await {
			tracing::error!(error = %err, "Failed to clear the remote sheet.");

			return Outcome::failed(err.to_string());
		}
		if !remote.initialize().await {
			return Outcome::failed("Sheet cleared but the header could not be restored.");
		}

		Outcome::ok("Remote sheet cleared.")
	}

	/// Copies the local file's collection to the remote sheet.
	pub async fn push_local(&self) -> Outcome {
		let remote = match self.require_remote() {
			Ok(remote) => remote,
			Err(err) => return Outcome::failed(err.to_string()),
		};
		let companies = match self.load_local().await {
			Ok(companies) => companies,
			Err(err) => return Outcome::failed(err.to_string()),
		};
		let count = companies.len();

		match remote.replace_all(companies).await {
			Ok(_) => Outcome::ok(format!("Pushed {count} companies to the remote sheet.")),
			Err(err) => Outcome::failed(err.to_string()),
		}
	}

	/// Overwrites the local file with a fresh read of the remote sheet.
	pub async fn pull_remote(&self) -> Outcome {
		let remote = match self.require_remote() {
			Ok(remote) => remote,
			Err(err) => return Outcome::failed(err.to_string()),
		};
		let companies = match remote.force_refresh().await {
			Ok(companies) => companies,
			Err(err) => return Outcome::failed(err.to_string()),
		};

		let count = companies.len();

		match self.local.write_all(&companies).await {
			Ok(()) => Outcome::ok(format!("Pulled {count} companies into the local file.")),
			Err(err) => Outcome::failed(Error::from(err).to_string()),
		}
	}

	fn require_remote(&self) -> Result<&RemoteStoreClient> {
		self.remote.as_ref().ok_or_else(|| Error::ConfigurationMissing {
			message: "No remote sheet is configured.".to_string(),
		})
	}

	async fn load_local(&self) -> Result<Vec<Company>> {
		let mut companies = self.local.read_all().await?;

		for company in &mut companies {
			company.normalize_milestones();
		}

		Ok(companies)
	}

	async fn store(&self, companies: Vec<Company>) -> Result<()> {
		match &self.remote {
			Some(remote) => {
				remote.replace_all(companies).await?;
			},
			None => {
				self.local.write_all(&companies).await?;

				tracing::info!(count = companies.len(), "Saved companies to the local file.");
			},
		}

		Ok(())
	}
}
