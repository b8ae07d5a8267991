use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use super::{KeyValueStore, SharedStore, StorageError};

/// Process-local store, used for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Convenience constructor returning a [`SharedStore`].
	pub fn shared() -> SharedStore {
		Arc::new(Self::new())
	}

	fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Value>>, StorageError> {
		self.entries
			.lock()
			.map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))
	}
}

impl KeyValueStore for MemoryStore {
	fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
		Ok(self.entries()?.get(key).cloned())
	}

	fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
		self.entries()?.insert(key.to_string(), value.clone());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StorageError> {
		self.entries()?.remove(key);
		Ok(())
	}
}
