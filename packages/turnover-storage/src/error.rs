#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to access {path:?}.")]
	Io { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to decode companies from {path:?}.")]
	Decode { path: std::path::PathBuf, source: serde_json::Error },
	#[error(transparent)]
	Encode(#[from] serde_json::Error),
}
