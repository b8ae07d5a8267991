//! Key-value blob storage for history and saved searches.
//!
//! Stores hold opaque JSON documents. The engine owns (de)serialization of
//! its collections and treats storage failures as non-fatal: they are logged
//! and the affected collection falls back to empty.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key under which the search history document is stored.
pub const HISTORY_KEY: &str = "search-history";
/// Key under which the saved-search registry document is stored.
pub const SAVED_SEARCHES_KEY: &str = "saved-searches";

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("failed to access '{key}' at {path}: {source}")]
	Io {
		key: String,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("stored document '{key}' is not valid JSON: {source}")]
	Corrupt {
		key: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("storage unavailable: {0}")]
	Unavailable(String),
}

/// Minimal blob store contract.
pub trait KeyValueStore: Send + Sync {
	/// Load the document under `key`, or `None` when nothing is stored.
	fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;

	fn save(&self, key: &str, value: &Value) -> Result<(), StorageError>;

	fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Store handle shared by the history manager and saved-search registry.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read a JSON array under `key`, degrading to an empty collection on any failure.
pub(crate) fn load_collection<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
	let value = match store.load(key) {
		Ok(Some(value)) => value,
		Ok(None) => return Vec::new(),
		Err(err) => {
			warn!(key, error = %err, "could not load stored collection; starting empty");
			return Vec::new();
		}
	};

	match serde_json::from_value(value) {
		Ok(items) => items,
		Err(source) => {
			let err = StorageError::Corrupt {
				key: key.to_string(),
				source,
			};
			warn!(key, error = %err, "discarding unreadable stored collection");
			Vec::new()
		}
	}
}

/// Write the whole collection under `key`. Failures are logged, not returned.
pub(crate) fn save_collection<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) {
	let value = match serde_json::to_value(items) {
		Ok(value) => value,
		Err(source) => {
			warn!(key, error = %source, "could not serialize collection");
			return;
		}
	};

	if let Err(err) = store.save(key, &value) {
		warn!(key, error = %err, "could not persist collection");
	}
}

/// Remove the document under `key`. Failures are logged, not returned.
pub(crate) fn remove_collection(store: &dyn KeyValueStore, key: &str) {
	if let Err(err) = store.remove(key) {
		warn!(key, error = %err, "could not remove stored collection");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn corrupt_documents_degrade_to_empty() {
		let store = MemoryStore::new();
		store
			.save(HISTORY_KEY, &serde_json::json!({"not": "a list"}))
			.unwrap();
		let items: Vec<u32> = load_collection(&store, HISTORY_KEY);
		assert!(items.is_empty());
	}

	#[test]
	fn missing_documents_load_empty() {
		let store = MemoryStore::new();
		let items: Vec<u32> = load_collection(&store, SAVED_SEARCHES_KEY);
		assert!(items.is_empty());
	}

	#[test]
	fn collections_round_trip() {
		let store = MemoryStore::new();
		save_collection(&store, SAVED_SEARCHES_KEY, &[1u32, 2, 3]);
		let items: Vec<u32> = load_collection(&store, SAVED_SEARCHES_KEY);
		assert_eq!(items, vec![1, 2, 3]);

		remove_collection(&store, SAVED_SEARCHES_KEY);
		assert!(store.load(SAVED_SEARCHES_KEY).unwrap().is_none());
	}
}
