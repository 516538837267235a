//! Account list and progress files.
//!
//! Accounts are read from a JSON array of `{private_key, proxy}` records.
//! Progress is a JSON object keyed by account address and is rewritten at
//! the end of every run.

use agent_types::{AccountRecord, AccountState};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
	#[error("{path}: {source}")]
	Io {
		path: String,
		source: std::io::Error,
	},
	#[error("{path}: {source}")]
	Json {
		path: String,
		source: serde_json::Error,
	},
}

/// Progress of every known account, keyed by checksummed address.
pub type StateFile = BTreeMap<String, AccountState>;

fn io_error(path: &Path, source: std::io::Error) -> StateError {
	StateError::Io {
		path: path.display().to_string(),
		source,
	}
}

fn json_error(path: &Path, source: serde_json::Error) -> StateError {
	StateError::Json {
		path: path.display().to_string(),
		source,
	}
}

pub async fn load_accounts(path: &Path) -> Result<Vec<AccountRecord>, StateError> {
	let content = tokio::fs::read_to_string(path)
		.await
		.map_err(|e| io_error(path, e))?;
	serde_json::from_str(&content).map_err(|e| json_error(path, e))
}

/// Loads saved progress. A missing file means no progress yet.
pub async fn load_state(path: &Path) -> Result<StateFile, StateError> {
	match tokio::fs::read_to_string(path).await {
		Ok(content) => serde_json::from_str(&content).map_err(|e| json_error(path, e)),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StateFile::new()),
		Err(e) => Err(io_error(path, e)),
	}
}

/// Writes progress through a temporary file so a crash never leaves a partial file.
pub async fn save_state(path: &Path, state: &StateFile) -> Result<(), StateError> {
	let content = serde_json::to_string_pretty(state).map_err(|e| json_error(path, e))?;
	let tmp = path.with_extension("json.tmp");

	tokio::fs::write(&tmp, content)
		.await
		.map_err(|e| io_error(&tmp, e))?;
	tokio::fs::rename(&tmp, path)
		.await
		.map_err(|e| io_error(path, e))
}
