use std::thread;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;
use trawl::{
	RenderMode, SearchBackend, SearchFacade, SearchId, SearchQuery, SearchResult, SearchStatus,
};

use crate::cli::ViewArgs;

/// Sleep between event pumps while a search has nothing new to apply.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One finished search, shaped for printing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchReport {
	pub(crate) search_id: SearchId,
	pub(crate) status: SearchStatus,
	pub(crate) query: SearchQuery,
	pub(crate) total_results: usize,
	/// Results left after the view filter.
	pub(crate) matching: usize,
	/// One-based page number.
	pub(crate) page: usize,
	pub(crate) total_pages: usize,
	pub(crate) page_size: usize,
	pub(crate) render_mode: RenderMode,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub(crate) elapsed_ms: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub(crate) error: Option<String>,
	pub(crate) results: Vec<SearchResult>,
}

/// Drives a facade from the command line: start, pump to completion, shape.
pub(crate) struct SearchWorkflow<B> {
	facade: SearchFacade<B>,
	poll_interval: Duration,
}

impl<B: SearchBackend> SearchWorkflow<B> {
	pub(crate) fn new(facade: SearchFacade<B>) -> Self {
		Self {
			facade,
			poll_interval: POLL_INTERVAL,
		}
	}

	pub(crate) fn facade(&self) -> &SearchFacade<B> {
		&self.facade
	}

	pub(crate) fn facade_mut(&mut self) -> &mut SearchFacade<B> {
		&mut self.facade
	}

	pub(crate) fn search(&mut self, query: SearchQuery, view: &ViewArgs) -> Result<SearchReport> {
		let id = self.facade.start(query)?;
		self.finish(id, view)
	}

	pub(crate) fn rerun_history(&mut self, entry: &str, view: &ViewArgs) -> Result<SearchReport> {
		let id = self.facade.rerun_history(entry)?;
		self.finish(id, view)
	}

	pub(crate) fn use_saved(&mut self, saved: &str, view: &ViewArgs) -> Result<SearchReport> {
		let id = self.facade.use_saved(saved)?;
		self.finish(id, view)
	}

	/// Apply backend events until `id` leaves the running state.
	fn wait(&mut self, id: &SearchId) {
		let mut turns = 0u64;
		loop {
			let report = self.facade.process_events();
			turns += 1;
			if !self
				.facade
				.search(id.as_str())
				.is_some_and(|state| state.is_running())
			{
				break;
			}
			if report.is_idle() {
				thread::sleep(self.poll_interval);
			}
		}
		debug!(search = %id, turns, "search settled");
	}

	/// Wait for `id`, then apply the view flags and collect the selected page.
	pub(crate) fn finish(&mut self, id: SearchId, view: &ViewArgs) -> Result<SearchReport> {
		self.wait(&id);

		if view.sort.is_some() || view.asc || view.desc {
			self.facade
				.sort(id.as_str(), view.sort.unwrap_or_default(), view.order())?;
		}
		if let Some(filter) = view.filter() {
			self.facade.filter(id.as_str(), filter)?;
		}
		self.facade.set_page(id.as_str(), view.page_index())?;

		let matching = self.facade.results(id.as_str())?.len();
		let results = self
			.facade
			.page_results(id.as_str())?
			.into_iter()
			.cloned()
			.collect();
		let render_mode = self.facade.render_mode(id.as_str())?;
		let state = self.facade.sessions().require(id.as_str())?;
		let pagination = state.pagination();

		Ok(SearchReport {
			search_id: id.clone(),
			status: state.status(),
			query: state.query().clone(),
			total_results: state.total_results(),
			matching,
			page: pagination.page + 1,
			total_pages: pagination.total_pages,
			page_size: pagination.page_size,
			render_mode,
			elapsed_ms: state.elapsed().map(|elapsed| elapsed.num_milliseconds()),
			error: state.error().map(str::to_string),
			results,
		})
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use tempfile::TempDir;
	use trawl::testing::ScriptedBackend;
	use trawl::{EngineSettings, LocalBackend, MatchType, MemoryStore, SortKey};

	use super::*;

	fn scored(path: &str, score: u8) -> SearchResult {
		SearchResult::new(path, MatchType::ExactName, score)
	}

	#[test]
	fn finish_applies_view_flags() {
		let settings = EngineSettings {
			page_size: 2,
			..EngineSettings::default()
		};
		let facade =
			SearchFacade::new(ScriptedBackend::new(), MemoryStore::shared(), settings).unwrap();
		let mut workflow = SearchWorkflow::new(facade);

		let id = workflow
			.facade_mut()
			.start(SearchQuery::new("/a"))
			.unwrap();
		let backend = workflow.facade().backend();
		backend.emit_results(
			id.as_str(),
			[
				scored("/a/c.rs", 10),
				scored("/a/a.rs", 30),
				scored("/a/b.rs", 20),
			],
		);
		backend.complete(id.as_str());

		let view = ViewArgs {
			page: 2,
			sort: Some(SortKey::Name),
			asc: true,
			..ViewArgs::default()
		};
		let report = workflow.finish(id, &view).unwrap();
		assert_eq!(report.status, SearchStatus::Completed);
		assert_eq!(report.total_results, 3);
		assert_eq!(report.page, 2);
		assert_eq!(report.total_pages, 2);
		assert_eq!(report.results.len(), 1);
		assert_eq!(report.results[0].name, "c.rs");
		assert!(report.elapsed_ms.is_some());
	}

	#[test]
	fn local_searches_run_to_completion() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("alpha.txt"), "needle\n").unwrap();
		fs::write(dir.path().join("beta.txt"), "hay\n").unwrap();

		let facade = SearchFacade::new(
			LocalBackend::new(),
			MemoryStore::shared(),
			EngineSettings::default(),
		)
		.unwrap();
		let mut workflow = SearchWorkflow::new(facade);
		let query = SearchQuery::new(dir.path().display().to_string()).with_content_pattern("needle");

		let report = workflow.search(query, &ViewArgs::default()).unwrap();
		assert_eq!(report.status, SearchStatus::Completed);
		assert_eq!(report.results.len(), 1);
		assert_eq!(report.results[0].name, "alpha.txt");
		assert_eq!(workflow.facade().history().len(), 1);
	}
}
