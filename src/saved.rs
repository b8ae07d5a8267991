//! User-named reusable queries with usage statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::model::SearchQuery;
use crate::persistence::{self, SAVED_SEARCHES_KEY, SharedStore};

const SAVED_SEARCH: &str = "saved search";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
	pub id: String,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub query: SearchQuery,
	#[serde(default)]
	pub tags: Vec<String>,
	pub created_at: DateTime<Utc>,
	#[serde(default)]
	pub use_count: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_used: Option<DateTime<Utc>>,
}

/// Caller-supplied part of a saved search. The registry assigns the id,
/// creation time and usage counters.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSavedSearch {
	pub name: String,
	pub description: Option<String>,
	pub query: SearchQuery,
	pub tags: Vec<String>,
}

impl NewSavedSearch {
	pub fn new(name: impl Into<String>, query: SearchQuery) -> Self {
		Self {
			name: name.into(),
			description: None,
			query,
			tags: Vec::new(),
		}
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags = tags.into_iter().map(Into::into).collect();
		self
	}
}

fn validate_name(name: &str) -> EngineResult<()> {
	if name.trim().is_empty() {
		return Err(EngineError::validation("saved search name must not be empty"));
	}
	Ok(())
}

/// Registry of saved searches in insertion order.
pub struct SavedSearchRegistry {
	store: SharedStore,
	entries: Vec<SavedSearch>,
}

impl SavedSearchRegistry {
	pub fn new(store: SharedStore) -> Self {
		let entries: Vec<SavedSearch> = persistence::load_collection(&*store, SAVED_SEARCHES_KEY);
		debug!(entries = entries.len(), "loaded saved searches");
		Self { store, entries }
	}

	pub fn save(&mut self, new: NewSavedSearch) -> EngineResult<&SavedSearch> {
		validate_name(&new.name)?;
		new.query.validate()?;
		let entry = SavedSearch {
			id: Uuid::new_v4().to_string(),
			name: new.name.trim().to_string(),
			description: new.description,
			query: new.query,
			tags: new.tags,
			created_at: Utc::now(),
			use_count: 0,
			last_used: None,
		};
		info!(id = %entry.id, name = %entry.name, "saved search");
		self.entries.push(entry);
		self.persist();
		Ok(&self.entries[self.entries.len() - 1])
	}

	/// Replace the entry with `entry.id` wholesale.
	pub fn update(&mut self, entry: SavedSearch) -> EngineResult<()> {
		validate_name(&entry.name)?;
		entry.query.validate()?;
		let slot = self
			.entries
			.iter_mut()
			.find(|existing| existing.id == entry.id)
			.ok_or_else(|| EngineError::not_found(SAVED_SEARCH, &entry.id))?;
		*slot = entry;
		self.persist();
		Ok(())
	}

	pub fn remove(&mut self, id: &str) -> EngineResult<SavedSearch> {
		let index = self
			.entries
			.iter()
			.position(|entry| entry.id == id)
			.ok_or_else(|| EngineError::not_found(SAVED_SEARCH, id))?;
		let removed = self.entries.remove(index);
		self.persist();
		Ok(removed)
	}

	/// The stored query of `id`, without counting a use.
	pub fn query_of(&self, id: &str) -> EngineResult<SearchQuery> {
		self.get(id)
			.map(|entry| entry.query.clone())
			.ok_or_else(|| EngineError::not_found(SAVED_SEARCH, id))
	}

	/// Record one use of `id` and hand back its query.
	pub fn mark_used(&mut self, id: &str) -> EngineResult<SearchQuery> {
		let entry = self
			.entries
			.iter_mut()
			.find(|entry| entry.id == id)
			.ok_or_else(|| EngineError::not_found(SAVED_SEARCH, id))?;
		entry.use_count = entry.use_count.saturating_add(1);
		entry.last_used = Some(Utc::now());
		let query = entry.query.clone();
		self.persist();
		Ok(query)
	}

	pub fn clear_all(&mut self) {
		self.entries.clear();
		persistence::remove_collection(&*self.store, SAVED_SEARCHES_KEY);
	}

	pub fn get(&self, id: &str) -> Option<&SavedSearch> {
		self.entries.iter().find(|entry| entry.id == id)
	}

	pub fn entries(&self) -> &[SavedSearch] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entries carrying `tag`, compared case-insensitively.
	pub fn find_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a SavedSearch> + 'a {
		self.entries
			.iter()
			.filter(move |entry| entry.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag)))
	}

	fn persist(&self) {
		persistence::save_collection(&*self.store, SAVED_SEARCHES_KEY, &self.entries);
	}
}
