use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::state::{Outcome, SearchId, SearchState, SearchStatus};
use crate::error::{EngineError, EngineResult};
use crate::model::{SearchQuery, SearchResult};
use crate::view::{Pagination, ResultFilter, SortSpec};

const SEARCH: &str = "search";

/// Canonical table of every known search session.
///
/// Lifecycle mutations (`add_results`, `finalize`, `cancel`) are silent no-ops
/// for unknown or already-terminal sessions so that late or duplicated backend
/// events cannot disturb a finished search. Presentation mutations report
/// [`EngineError::NotFound`] for unknown ids.
#[derive(Debug, Default)]
pub struct SessionStore {
	sessions: HashMap<SearchId, SearchState>,
}

impl SessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a freshly accepted search in the `running` state.
	pub fn create(&mut self, id: SearchId, query: SearchQuery, page_size: usize) -> &SearchState {
		if self.sessions.contains_key(&id) {
			warn!(search = %id, "backend reused a search id; replacing the previous session");
		}
		let state = SearchState::running(id.clone(), query, page_size);
		self.sessions.insert(id.clone(), state);
		&self.sessions[&id]
	}

	pub fn get(&self, id: &str) -> Option<&SearchState> {
		self.sessions.get(id)
	}

	pub fn require(&self, id: &str) -> EngineResult<&SearchState> {
		self.sessions
			.get(id)
			.ok_or_else(|| EngineError::not_found(SEARCH, id))
	}

	fn require_mut(&mut self, id: &str) -> EngineResult<&mut SearchState> {
		self.sessions
			.get_mut(id)
			.ok_or_else(|| EngineError::not_found(SEARCH, id))
	}

	pub fn is_running(&self, id: &str) -> bool {
		self.get(id).is_some_and(SearchState::is_running)
	}

	/// Append results in the given order. Returns `false` (dropping the
	/// batch) unless the session is running.
	pub fn add_results(&mut self, id: &str, results: Vec<SearchResult>) -> bool {
		let Some(state) = self.sessions.get_mut(id).filter(|state| state.is_running()) else {
			debug!(search = id, dropped = results.len(), "ignoring results for inactive search");
			return false;
		};
		state.results.extend(results);
		state.total_results = state.results.len();
		state.pagination.refresh(state.total_results);
		true
	}

	/// Move a running session into `completed` or `error`. Returns `false`
	/// when the session is unknown or already terminal.
	pub fn finalize(&mut self, id: &str, outcome: Outcome) -> bool {
		let Some(state) = self.sessions.get_mut(id).filter(|state| state.is_running()) else {
			debug!(search = id, "ignoring duplicate finalization");
			return false;
		};
		match outcome {
			Outcome::Completed => {
				state.finish(SearchStatus::Completed, None);
				info!(search = id, results = state.total_results, "search completed");
			}
			Outcome::Failed(message) => {
				warn!(search = id, error = %message, "search failed");
				state.finish(SearchStatus::Error, Some(message));
			}
		}
		true
	}

	/// Mark a running session cancelled, keeping whatever it already received.
	pub fn cancel(&mut self, id: &str) -> bool {
		let Some(state) = self.sessions.get_mut(id).filter(|state| state.is_running()) else {
			return false;
		};
		state.finish(SearchStatus::Cancelled, None);
		info!(search = id, kept = state.total_results, "search cancelled");
		true
	}

	/// Select a page, clamped into range. Returns the page actually selected.
	pub fn set_page(&mut self, id: &str, page: usize) -> EngineResult<usize> {
		Ok(self.require_mut(id)?.pagination.set_page(page))
	}

	pub fn set_page_size(&mut self, id: &str, page_size: usize) -> EngineResult<Pagination> {
		if page_size == 0 {
			return Err(EngineError::validation("page size must be at least 1"));
		}
		let state = self.require_mut(id)?;
		state
			.pagination
			.set_page_size(page_size, state.total_results);
		Ok(state.pagination)
	}

	pub fn set_sort(&mut self, id: &str, sort: SortSpec) -> EngineResult<()> {
		self.require_mut(id)?.sort = sort;
		Ok(())
	}

	/// Replace the session filter. An empty filter clears it.
	pub fn set_filter(&mut self, id: &str, filter: Option<ResultFilter>) -> EngineResult<()> {
		self.require_mut(id)?.filter = filter.filter(|filter| !filter.is_empty());
		Ok(())
	}

	pub fn remove(&mut self, id: &str) -> Option<SearchState> {
		self.sessions.remove(id)
	}

	pub fn clear(&mut self) {
		self.sessions.clear();
	}

	pub fn len(&self) -> usize {
		self.sessions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sessions.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &SearchState> {
		self.sessions.values()
	}

	pub fn running_ids(&self) -> Vec<SearchId> {
		self.sessions
			.values()
			.filter(|state| state.is_running())
			.map(|state| state.id.clone())
			.collect()
	}
}
