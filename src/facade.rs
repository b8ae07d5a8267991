//! Public entry point tying the backend, sessions, history and saved
//! searches together.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::events::{EventStreamAdapter, PumpReport, open_channel};
use crate::gateway::SearchBackend;
use crate::history::{HistoryManager, SearchHistoryEntry};
use crate::model::{SearchQuery, SearchResult};
use crate::persistence::SharedStore;
use crate::saved::{NewSavedSearch, SavedSearch, SavedSearchRegistry};
use crate::session::{SearchId, SearchState, SessionStore};
use crate::view::{
	Pagination, RenderMode, RenderOverride, ResultFilter, SortKey, SortOrder, SortSpec,
	derive_view, paginate, select_mode, total_pages,
};

/// Derived read of the active search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveResults<'a> {
	pub search_id: &'a SearchId,
	/// Filtered and sorted, not paginated.
	pub results: Vec<&'a SearchResult>,
	pub is_searching: bool,
	pub total_results: usize,
	/// Results left after the active filter.
	pub matching: usize,
	/// Pages the filtered view fills. `pagination` counts the unfiltered
	/// buffer, so pages at or past this index are empty.
	pub matching_pages: usize,
	pub error: Option<&'a str>,
	pub pagination: Pagination,
	pub render_mode: RenderMode,
}

/// Single-owner orchestrator over one [`SearchBackend`].
///
/// All mutation goes through `&mut self`; backend events are applied when the
/// caller runs [`process_events`](Self::process_events).
pub struct SearchFacade<B> {
	backend: B,
	sessions: SessionStore,
	events: EventStreamAdapter,
	history: HistoryManager,
	saved: SavedSearchRegistry,
	settings: EngineSettings,
	active: Option<SearchId>,
}

impl<B: SearchBackend> SearchFacade<B> {
	/// Build a facade, loading history and saved searches from `store`.
	pub fn new(backend: B, store: SharedStore, settings: EngineSettings) -> EngineResult<Self> {
		settings.validate()?;
		Ok(Self {
			backend,
			sessions: SessionStore::new(),
			events: EventStreamAdapter::new(),
			history: HistoryManager::with_limit(store.clone(), settings.history_limit),
			saved: SavedSearchRegistry::new(store),
			settings,
			active: None,
		})
	}

	/// Validate `query`, hand it to the backend and track the new session.
	///
	/// The session becomes active and is recorded in history. When the
	/// backend refuses, nothing is recorded.
	pub fn start(&mut self, query: SearchQuery) -> EngineResult<SearchId> {
		query.validate()?;

		let (sink, subscription) = open_channel();
		let id = self
			.backend
			.start(&query, sink)
			.map_err(|err| EngineError::BackendUnavailable(err.to_string()))?;

		info!(search = %id, root = %query.root_path, "search started");
		self.sessions
			.create(id.clone(), query.clone(), self.settings.page_size);
		self.events.subscribe(id.clone(), subscription);
		self.history.record(query, 0);
		self.active = Some(id.clone());
		Ok(id)
	}

	/// Stop a running search. Returns `false` for unknown or finished searches.
	///
	/// Local state becomes `cancelled` even when the backend cannot be reached.
	pub fn cancel(&mut self, id: &str) -> bool {
		let Some(state) = self.sessions.get(id).filter(|state| state.is_running()) else {
			return false;
		};
		let search_id = state.id().clone();

		if let Err(err) = self.backend.cancel(&search_id) {
			warn!(search = %search_id, error = %err, "backend cancel failed; cancelling locally");
		}
		self.events.unsubscribe(id);
		self.sessions.cancel(id)
	}

	/// Cancel (if running) and forget one search.
	pub fn clear(&mut self, id: &str) -> EngineResult<()> {
		self.sessions.require(id)?;
		self.cancel(id);
		self.events.unsubscribe(id);
		self.sessions.remove(id);
		if self.active.as_ref().is_some_and(|active| active.as_str() == id) {
			self.active = None;
		}
		Ok(())
	}

	/// Cancel every running search and forget all sessions.
	pub fn clear_all(&mut self) {
		for id in self.sessions.running_ids() {
			self.cancel(id.as_str());
		}
		self.events.unsubscribe_all();
		self.sessions.clear();
		self.active = None;
	}

	/// Apply all buffered backend events. One turn of the caller's loop.
	pub fn process_events(&mut self) -> PumpReport {
		self.events.pump(&mut self.sessions)
	}

	/// Whether any session is still waiting on its backend.
	pub fn has_running(&self) -> bool {
		self.events.active() > 0
	}

	pub fn sort(&mut self, id: &str, key: SortKey, order: SortOrder) -> EngineResult<()> {
		self.sessions.set_sort(id, SortSpec::new(key, order))
	}

	pub fn filter(&mut self, id: &str, filter: ResultFilter) -> EngineResult<()> {
		self.sessions.set_filter(id, Some(filter))
	}

	pub fn clear_filter(&mut self, id: &str) -> EngineResult<()> {
		self.sessions.set_filter(id, None)
	}

	/// Select a page, clamped into range. Returns the page actually selected.
	pub fn set_page(&mut self, id: &str, page: usize) -> EngineResult<usize> {
		self.sessions.set_page(id, page)
	}

	pub fn set_page_size(&mut self, id: &str, page_size: usize) -> EngineResult<Pagination> {
		self.sessions.set_page_size(id, page_size)
	}

	pub fn set_active(&mut self, id: &str) -> EngineResult<()> {
		let state = self.sessions.require(id)?;
		self.active = Some(state.id().clone());
		Ok(())
	}

	pub fn active_search_id(&self) -> Option<&SearchId> {
		self.active.as_ref()
	}

	pub fn search(&self, id: &str) -> Option<&SearchState> {
		self.sessions.get(id)
	}

	pub fn sessions(&self) -> &SessionStore {
		&self.sessions
	}

	/// Filtered and sorted view of one search.
	pub fn results(&self, id: &str) -> EngineResult<Vec<&SearchResult>> {
		let state = self.sessions.require(id)?;
		Ok(derive_view(state.results(), state.filter(), state.sort()))
	}

	/// The current page of [`results`](Self::results).
	pub fn page_results(&self, id: &str) -> EngineResult<Vec<&SearchResult>> {
		let state = self.sessions.require(id)?;
		let view = derive_view(state.results(), state.filter(), state.sort());
		let pagination = state.pagination();
		Ok(paginate(&view, pagination.page, pagination.page_size).to_vec())
	}

	pub fn render_mode(&self, id: &str) -> EngineResult<RenderMode> {
		let state = self.sessions.require(id)?;
		Ok(self.mode_for(state))
	}

	fn mode_for(&self, state: &SearchState) -> RenderMode {
		select_mode(
			state.total_results(),
			self.settings.virtualize_threshold,
			self.settings.render_mode,
		)
	}

	pub fn set_render_override(&mut self, preference: RenderOverride) {
		self.settings.render_mode = preference;
	}

	pub fn get_active_results(&self) -> Option<ActiveResults<'_>> {
		let state = self.sessions.get(self.active.as_ref()?.as_str())?;
		let results = derive_view(state.results(), state.filter(), state.sort());
		let pagination = state.pagination();
		Some(ActiveResults {
			search_id: state.id(),
			matching: results.len(),
			matching_pages: total_pages(results.len(), pagination.page_size),
			results,
			is_searching: state.is_running(),
			total_results: state.total_results(),
			error: state.error(),
			pagination,
			render_mode: self.mode_for(state),
		})
	}

	pub fn history(&self) -> &[SearchHistoryEntry] {
		self.history.entries()
	}

	pub fn remove_history(&mut self, id: &str) -> EngineResult<()> {
		self.history.remove(id).map(drop)
	}

	pub fn clear_history(&mut self) {
		self.history.clear();
	}

	/// Start a new search with the stored query of history entry `id`.
	pub fn rerun_history(&mut self, id: &str) -> EngineResult<SearchId> {
		let query = self.history.query_for(id)?;
		self.start(query)
	}

	pub fn saved_searches(&self) -> &[SavedSearch] {
		self.saved.entries()
	}

	pub fn saved_registry(&self) -> &SavedSearchRegistry {
		&self.saved
	}

	pub fn save_search(&mut self, new: NewSavedSearch) -> EngineResult<&SavedSearch> {
		self.saved.save(new)
	}

	pub fn update_saved(&mut self, entry: SavedSearch) -> EngineResult<()> {
		self.saved.update(entry)
	}

	pub fn remove_saved(&mut self, id: &str) -> EngineResult<()> {
		self.saved.remove(id).map(drop)
	}

	/// Start the query of saved search `id`, counting the use once it runs.
	pub fn use_saved(&mut self, id: &str) -> EngineResult<SearchId> {
		let query = self.saved.query_of(id)?;
		let search = self.start(query)?;
		self.saved.mark_used(id)?;
		Ok(search)
	}

	pub fn clear_saved(&mut self) {
		self.saved.clear_all();
	}

	pub fn settings(&self) -> &EngineSettings {
		&self.settings
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	pub fn backend_mut(&mut self) -> &mut B {
		&mut self.backend
	}
}
