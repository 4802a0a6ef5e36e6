use std::path::{Path, PathBuf};

use tokio::fs;

use turnover_domain::Company;

use crate::{Error, Result};

/// Whole-collection JSON file used when no remote spreadsheet is configured.
#[derive(Debug, Clone)]
pub struct LocalStore {
	path: PathBuf,
}
impl LocalStore {
	/// Opens the data file, creating its directory and seeding it on first run.
	///
	/// A missing data file is copied from `seed` when that file exists, otherwise it starts as
	/// an empty collection.
	pub async fn open(path: impl Into<PathBuf>, seed: Option<&Path>) -> Result<Self> {
		let path = path.into();

		if let Some(parent) = path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent).await.map_err(|err| io_error(parent, err))?;
		}

		if !exists(&path).await? {
			if let Some(seed) = seed
				&& exists(seed).await?
			{
				fs::copy(seed, &path).await.map_err(|err| io_error(&path, err))?;

				tracing::info!(
					seed = %seed.display(),
					path = %path.display(),
					"Seeded local data file."
				);
			} else {
				fs::write(&path, "[]").await.map_err(|err| io_error(&path, err))?;

				tracing::info!(path = %path.display(), "Created empty local data file.");
			}
		}

		Ok(Self { path })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Reads the stored collection. A missing file is an empty collection.
	pub async fn read_all(&self) -> Result<Vec<Company>> {
		if !exists(&self.path).await? {
			return Ok(Vec::new());
		}

		let raw = fs::read_to_string(&self.path).await.map_err(|err| io_error(&self.path, err))?;

		if raw.trim().is_empty() {
			return Ok(Vec::new());
		}

		serde_json::from_str(&raw)
			.map_err(|err| Error::Decode { path: self.path.clone(), source: err })
	}

	pub async fn write_all(&self, companies: &[Company]) -> Result<()> {
		let raw = serde_json::to_string_pretty(companies)?;

		fs::write(&self.path, raw).await.map_err(|err| io_error(&self.path, err))
	}
}

async fn exists(path: &Path) -> Result<bool> {
	fs::try_exists(path).await.map_err(|err| io_error(path, err))
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
	Error::Io { path: path.to_path_buf(), source }
}
