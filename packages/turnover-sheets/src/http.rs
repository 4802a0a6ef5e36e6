use std::{path::Path, time::Duration};

use reqwest::{
	Client, Response,
	header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use serde_json::Value;
use tokio::fs;

use crate::{BoxFuture, CellRange, CellValue, Error, Grid, Result, StoreMetadata, TabularStore};

#[derive(Debug, Deserialize)]
struct Credentials {
	access_token: String,
}

/// [`TabularStore`] over the spreadsheet values REST API.
pub struct HttpSheetsStore {
	client: Client,
	api_base: String,
	spreadsheet_id: String,
}
impl HttpSheetsStore {
	pub fn new(
		api_base: &str,
		spreadsheet_id: &str,
		access_token: &str,
		timeout: Duration,
	) -> Result<Self> {
		let client = Client::builder()
			.timeout(timeout)
			.default_headers(auth_headers(access_token)?)
			.build()?;

		Ok(Self {
			client,
			api_base: api_base.trim_end_matches('/').to_string(),
			spreadsheet_id: spreadsheet_id.to_string(),
		})
	}

	pub async fn from_config(cfg: &turnover_config::Sheets) -> Result<Self> {
		let Some(spreadsheet_id) = cfg.spreadsheet_id.as_deref() else {
			return Err(Error::InvalidConfig {
				message: "sheets.spreadsheet_id is not configured.".to_string(),
			});
		};
		let Some(credentials_file) = cfg.credentials_file.as_deref() else {
			return Err(Error::InvalidConfig {
				message: "sheets.credentials_file is not configured.".to_string(),
			});
		};
		let access_token = load_access_token(credentials_file).await?;

		Self::new(
			&cfg.api_base,
			spreadsheet_id,
			&access_token,
			Duration::from_millis(cfg.timeout_ms),
		)
	}

	pub fn spreadsheet_id(&self) -> &str {
		&self.spreadsheet_id
	}

	fn values_url(&self, range: CellRange) -> String {
		format!("{}/spreadsheets/{}/values/{range}", self.api_base, self.spreadsheet_id)
	}

	async fn describe(&self) -> Result<StoreMetadata> {
		let url = format!("{}/spreadsheets/{}", self.api_base, self.spreadsheet_id);
		let res = self
			.client
			.get(url)
			.query(&[("fields", "spreadsheetId,properties.title")])
			.send()
			.await?;
		let json: Value = checked(res).await?.json().await?;

		parse_metadata_response(json)
	}

	async fn read(&self, range: CellRange) -> Result<Grid> {
		let res = self.client.get(self.values_url(range)).send().await?;
		let json: Value = checked(res).await?.json().await?;

		parse_values_response(json)
	}

	async fn write(&self, range: CellRange, rows: &[Vec<CellValue>]) -> Result<()> {
		let body = serde_json::json!({
			"range": range.to_string(),
			"majorDimension": "ROWS",
			"values": rows,
		});
		let res = self
			.client
			.put(self.values_url(range))
			.query(&[("valueInputOption", "RAW")])
			.json(&body)
			.send()
			.await?;

		checked(res).await?;

		Ok(())
	}

	async fn clear(&self, range: CellRange) -> Result<()> {
		let url = format!("{}:clear", self.values_url(range));
		let res = self.client.post(url).json(&serde_json::json!({})).send().await?;

		checked(res).await?;

		Ok(())
	}
}
impl TabularStore for HttpSheetsStore {
	fn describe_store(&self) -> BoxFuture<'_, Result<StoreMetadata>> {
		Box::pin(self.describe())
	}

	fn read_range(&self, range: CellRange) -> BoxFuture<'_, Result<Grid>> {
		Box::pin(self.read(range))
	}

	fn write_range<'a>(
		&'a self,
		range: CellRange,
		rows: &'a [Vec<CellValue>],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.write(range, rows))
	}

	fn clear_range(&self, range: CellRange) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.clear(range))
	}
}

pub fn auth_headers(access_token: &str) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();
	let mut value: HeaderValue = format!("Bearer {access_token}").parse()?;

	value.set_sensitive(true);
	headers.insert(AUTHORIZATION, value);

	Ok(headers)
}

pub async fn load_access_token(path: &Path) -> Result<String> {
	let raw = fs::read_to_string(path)
		.await
		.map_err(|err| Error::ReadCredentials { path: path.to_path_buf(), source: err })?;
	let credentials: Credentials = serde_json::from_str(&raw)?;
	let token = credentials.access_token.trim();

	if token.is_empty() {
		return Err(Error::InvalidConfig {
			message: format!("Credentials file at {path:?} has an empty access_token."),
		});
	}

	Ok(token.to_string())
}

async fn checked(res: Response) -> Result<Response> {
	let status = res.status();

	if status.is_success() {
		return Ok(res);
	}

	let body = res.text().await.unwrap_or_default();

	tracing::warn!(%status, "Spreadsheet request was rejected.");

	Err(Error::Unavailable { message: format!("Spreadsheet request failed with {status}: {body}") })
}

fn parse_metadata_response(json: Value) -> Result<StoreMetadata> {
	let spreadsheet_id = json
		.get("spreadsheetId")
		.and_then(Value::as_str)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Spreadsheet response is missing spreadsheetId.".to_string(),
		})?
		.to_string();
	let title = json
		.pointer("/properties/title")
		.and_then(Value::as_str)
		.unwrap_or_default()
		.to_string();

	Ok(StoreMetadata { spreadsheet_id, title })
}

fn parse_values_response(json: Value) -> Result<Grid> {
	let Some(values) = json.get("values") else {
		return Ok(Vec::new());
	};
	let rows = values.as_array().ok_or_else(|| Error::InvalidResponse {
		message: "Values response must hold an array of rows.".to_string(),
	})?;
	let mut grid = Vec::with_capacity(rows.len());

	for row in rows {
		let cells = row.as_array().ok_or_else(|| Error::InvalidResponse {
			message: "Values response rows must be arrays.".to_string(),
		})?;

		grid.push(cells.clone());
	}

	Ok(grid)
}
