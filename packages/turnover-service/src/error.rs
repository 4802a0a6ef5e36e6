pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced by the sync layer.
///
/// Every variant carries only a message so one coalesced save failure can be handed to each
/// waiting caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Configuration missing: {message}")]
	ConfigurationMissing { message: String },
	#[error("Transport unavailable: {message}")]
	TransportUnavailable { message: String },
	#[error("Save queue failure: {message}")]
	Queue { message: String },
	#[error("Local storage error: {message}")]
	Storage { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}
impl From<turnover_sheets::Error> for Error {
	fn from(err: turnover_sheets::Error) -> Self {
		match err {
			turnover_sheets::Error::InvalidConfig { message } => {
				Self::ConfigurationMissing { message }
			},
			err @ turnover_sheets::Error::ReadCredentials { .. } => {
				let message = match std::error::Error::source(&err) {
					Some(source) => format!("{err} {source}."),
					None => err.to_string(),
				};

				Self::ConfigurationMissing { message }
			},
			other => Self::TransportUnavailable { message: other.to_string() },
		}
	}
}

impl From<turnover_storage::Error> for Error {
	fn from(err: turnover_storage::Error) -> Self {
		let message = match std::error::Error::source(&err) {
			Some(source) => format!("{err} {source}."),
			None => err.to_string(),
		};

		Self::Storage { message }
	}
}
