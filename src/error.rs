//! Error type shared by the board's persistence and export paths.

use thiserror::Error;

/// Failures the board can surface to the investigator.
///
/// None of these is fatal: load failures degrade to an empty board, save
/// failures keep the dirty graph for the next attempt and export failures
/// leave the graph alone.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
	/// The request never produced a response (network down, CORS, timeout).
	#[error("Network error: {0}")]
	Transport(String),
	/// The backend answered with a non-success status.
	#[error("Backend rejected the request ({status}): {detail}")]
	Status { status: u16, detail: String },
	/// The response body could not be decoded.
	#[error("Unexpected response: {0}")]
	Decode(String),
	/// A record the board depends on does not exist.
	#[error("Not found: {0}")]
	NotFound(String),
	/// Capturing or downloading the canvas snapshot failed.
	#[error("Export failed: {0}")]
	Export(String),
	/// The embedded configuration could not be read.
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Result alias used throughout the board modules.
pub type BoardResult<T> = Result<T, BoardError>;

impl From<reqwest::Error> for BoardError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_decode() {
			BoardError::Decode(err.to_string())
		} else if let Some(status) = err.status() {
			BoardError::Status {
				status: status.as_u16(),
				detail: err.to_string(),
			}
		} else {
			BoardError::Transport(err.to_string())
		}
	}
}

impl From<serde_json::Error> for BoardError {
	fn from(err: serde_json::Error) -> Self {
		BoardError::Decode(err.to_string())
	}
}

impl From<toml::de::Error> for BoardError {
	fn from(err: toml::de::Error) -> Self {
		BoardError::Config(err.to_string())
	}
}

impl BoardError {
	/// Short message suitable for a transient notification.
	pub fn user_message(&self) -> String {
		match self {
			BoardError::Status { detail, .. } if !detail.is_empty() => detail.clone(),
			other => other.to_string(),
		}
	}
}
