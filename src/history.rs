//! Bounded, most-recent-first log of executed queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::model::SearchQuery;
use crate::persistence::{self, HISTORY_KEY, SharedStore};

/// Upper bound on retained history entries.
pub const MAX_HISTORY_ENTRIES: usize = 50;

const HISTORY_ENTRY: &str = "history entry";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
	pub id: String,
	pub query: SearchQuery,
	pub timestamp: DateTime<Utc>,
	pub result_count: usize,
}

/// History backed by a shared [`KeyValueStore`](crate::persistence::KeyValueStore).
///
/// Every mutation writes the full list back under [`HISTORY_KEY`].
pub struct HistoryManager {
	store: SharedStore,
	entries: Vec<SearchHistoryEntry>,
	limit: usize,
}

impl HistoryManager {
	/// Load history from `store`, keeping at most [`MAX_HISTORY_ENTRIES`].
	pub fn new(store: SharedStore) -> Self {
		Self::with_limit(store, MAX_HISTORY_ENTRIES)
	}

	/// Like [`new`](Self::new) with a smaller cap. `limit` is clamped to
	/// `1..=MAX_HISTORY_ENTRIES`.
	pub fn with_limit(store: SharedStore, limit: usize) -> Self {
		let limit = limit.clamp(1, MAX_HISTORY_ENTRIES);
		let mut entries: Vec<SearchHistoryEntry> = persistence::load_collection(&*store, HISTORY_KEY);
		entries.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
		entries.truncate(limit);
		debug!(entries = entries.len(), limit, "loaded search history");
		Self {
			store,
			entries,
			limit,
		}
	}

	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Prepend an entry for `query`, evicting the oldest beyond the cap.
	pub fn record(&mut self, query: SearchQuery, result_count: usize) -> &SearchHistoryEntry {
		let entry = SearchHistoryEntry {
			id: Uuid::new_v4().to_string(),
			query,
			timestamp: Utc::now(),
			result_count,
		};
		self.entries.insert(0, entry);
		if self.entries.len() > self.limit {
			let evicted = self.entries.len() - self.limit;
			self.entries.truncate(self.limit);
			debug!(evicted, "trimmed search history");
		}
		self.persist();
		&self.entries[0]
	}

	/// Entries, newest first.
	pub fn entries(&self) -> &[SearchHistoryEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, id: &str) -> Option<&SearchHistoryEntry> {
		self.entries.iter().find(|entry| entry.id == id)
	}

	/// The stored query of entry `id`, verbatim.
	pub fn query_for(&self, id: &str) -> EngineResult<SearchQuery> {
		self.get(id)
			.map(|entry| entry.query.clone())
			.ok_or_else(|| EngineError::not_found(HISTORY_ENTRY, id))
	}

	pub fn remove(&mut self, id: &str) -> EngineResult<SearchHistoryEntry> {
		let index = self
			.entries
			.iter()
			.position(|entry| entry.id == id)
			.ok_or_else(|| EngineError::not_found(HISTORY_ENTRY, id))?;
		let removed = self.entries.remove(index);
		self.persist();
		Ok(removed)
	}

	pub fn clear(&mut self) {
		self.entries.clear();
		persistence::remove_collection(&*self.store, HISTORY_KEY);
	}

	fn persist(&self) {
		persistence::save_collection(&*self.store, HISTORY_KEY, &self.entries);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::persistence::{KeyValueStore, MemoryStore};

	fn query(n: usize) -> SearchQuery {
		SearchQuery::quick("/a", format!("file-{n}"))
	}

	#[test]
	fn newest_entries_come_first() {
		let mut history = HistoryManager::new(MemoryStore::shared());
		history.record(query(1), 0);
		history.record(query(2), 0);
		assert_eq!(history.entries()[0].query, query(2));
		assert_eq!(history.entries()[1].query, query(1));
	}

	#[test]
	fn the_fifty_first_entry_evicts_exactly_the_oldest() {
		let mut history = HistoryManager::new(MemoryStore::shared());
		for n in 0..MAX_HISTORY_ENTRIES {
			history.record(query(n), 0);
		}
		assert_eq!(history.len(), MAX_HISTORY_ENTRIES);

		history.record(query(99), 0);
		assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
		assert_eq!(history.entries()[0].query, query(99));
		assert_eq!(history.entries().last().unwrap().query, query(1));
		assert!(history.entries().iter().all(|entry| entry.query != query(0)));
	}

	#[test]
	fn limit_is_capped() {
		let history = HistoryManager::with_limit(MemoryStore::shared(), 500);
		assert_eq!(history.limit(), MAX_HISTORY_ENTRIES);
		let history = HistoryManager::with_limit(MemoryStore::shared(), 0);
		assert_eq!(history.limit(), 1);
	}

	#[test]
	fn persisted_history_reloads_identically() {
		let store = MemoryStore::shared();
		let mut history = HistoryManager::new(store.clone());
		let detailed = SearchQuery::new("/a")
			.with_name_pattern("*.ts")
			.with_content_pattern("TODO");
		history.record(query(1), 3);
		history.record(detailed.clone(), 7);
		let before = history.entries().to_vec();

		let reloaded = HistoryManager::new(store);
		assert_eq!(reloaded.entries(), before.as_slice());
		assert_eq!(reloaded.entries()[0].query, detailed);
		assert_eq!(reloaded.entries()[0].timestamp, before[0].timestamp);
	}

	#[test]
	fn remove_and_lookup_report_unknown_ids() {
		let mut history = HistoryManager::new(MemoryStore::shared());
		let id = history.record(query(1), 0).id.clone();

		assert_eq!(history.query_for(&id).unwrap(), query(1));
		assert!(matches!(
			history.query_for("missing"),
			Err(EngineError::NotFound { .. })
		));
		assert!(history.remove(&id).is_ok());
		assert!(matches!(
			history.remove(&id),
			Err(EngineError::NotFound { .. })
		));
	}

	#[test]
	fn clear_empties_storage() {
		let store = MemoryStore::shared();
		let mut history = HistoryManager::new(store.clone());
		history.record(query(1), 0);
		history.clear();
		assert!(history.is_empty());
		assert!(store.load(HISTORY_KEY).unwrap().is_none());
		assert!(HistoryManager::new(store).is_empty());
	}

	#[test]
	fn unreadable_history_starts_empty() {
		let store = MemoryStore::shared();
		store
			.save(HISTORY_KEY, &serde_json::json!([{"id": 1}]))
			.unwrap();
		assert!(HistoryManager::new(store).is_empty());
	}
}
