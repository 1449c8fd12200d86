//! Client settings embedded from `board.toml`.

use std::time::Duration;

use log::warn;
use serde::Deserialize;

use crate::error::BoardResult;

const EMBEDDED: &str = include_str!("../board.toml");

/// Settings for one board client build.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
	/// Origin of the REST backend, without a trailing slash.
	pub api_base_url: String,
	/// Autosave period for a dirty, editable session.
	pub autosave_interval_secs: u64,
	/// Role names allowed to mutate the board.
	pub editor_roles: Vec<String>,
	/// Download name prefix for exported snapshots.
	pub export_file_prefix: String,
	/// Local-storage key holding the API token.
	pub token_storage_key: String,
	/// Local-storage key holding the signed-in user record.
	pub user_storage_key: String,
}

impl Default for BoardConfig {
	fn default() -> Self {
		Self {
			api_base_url: "http://localhost:8000".into(),
			autosave_interval_secs: 60,
			editor_roles: vec!["Detective".into(), "Sergeant".into()],
			export_file_prefix: "detective-board-case".into(),
			token_storage_key: "auth_token".into(),
			user_storage_key: "user".into(),
		}
	}
}

impl BoardConfig {
	/// Parse settings from TOML; missing keys keep their defaults.
	pub fn from_toml_str(text: &str) -> BoardResult<Self> {
		let mut config: BoardConfig = toml::from_str(text)?;
		config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
		if config.autosave_interval_secs == 0 {
			config.autosave_interval_secs = BoardConfig::default().autosave_interval_secs;
		}
		Ok(config)
	}

	/// The embedded settings, with the build-time `BOARD_API_URL` override.
	pub fn load() -> Self {
		let mut config = Self::from_toml_str(EMBEDDED).unwrap_or_else(|err| {
			warn!("Falling back to default board settings: {err}");
			Self::default()
		});
		if let Some(url) = option_env!("BOARD_API_URL") {
			config.api_base_url = url.trim_end_matches('/').to_string();
		}
		config
	}

	pub fn autosave_interval(&self) -> Duration {
		Duration::from_secs(self.autosave_interval_secs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn embedded_settings_parse() {
		let config = BoardConfig::from_toml_str(EMBEDDED).unwrap();
		assert_eq!(config.autosave_interval(), Duration::from_secs(60));
		assert_eq!(config.editor_roles, vec!["Detective", "Sergeant"]);
	}

	#[test]
	fn partial_settings_keep_defaults() {
		let config = BoardConfig::from_toml_str(
			"api_base_url = \"https://cases.example/\"\nautosave_interval_secs = 0\n",
		)
		.unwrap();
		assert_eq!(config.api_base_url, "https://cases.example");
		assert_eq!(config.autosave_interval_secs, 60);
		assert_eq!(config.export_file_prefix, "detective-board-case");
	}

	#[test]
	fn malformed_settings_are_config_errors() {
		let err = BoardConfig::from_toml_str("editor_roles = 3").unwrap_err();
		assert!(matches!(err, crate::error::BoardError::Config(_)));
	}
}
