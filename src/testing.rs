//! Deterministic in-memory backend for driving the engine from tests.

use std::collections::HashMap;

use crate::gateway::{BackendError, BackendEvent, EventSink, SearchBackend};
use crate::model::{SearchQuery, SearchResult};
use crate::session::SearchId;

/// Backend that accepts every query and lets the caller push events by hand.
///
/// Ids are issued as `search-1`, `search-2`, ... Sinks stay available after
/// a cancel so tests can simulate results that race the cancellation.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
	issued: u64,
	sinks: HashMap<SearchId, EventSink>,
	started: Vec<(SearchId, SearchQuery)>,
	cancelled: Vec<SearchId>,
	start_failure: Option<String>,
	cancel_failure: Option<String>,
}

impl ScriptedBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Make every following `start` fail with `message` until reset.
	pub fn set_start_failure(&mut self, message: Option<&str>) {
		self.start_failure = message.map(str::to_string);
	}

	/// Make every following `cancel` fail with `message` until reset.
	pub fn set_cancel_failure(&mut self, message: Option<&str>) {
		self.cancel_failure = message.map(str::to_string);
	}

	/// Accepted searches with their queries, in start order.
	pub fn started(&self) -> &[(SearchId, SearchQuery)] {
		&self.started
	}

	pub fn cancelled(&self) -> &[SearchId] {
		&self.cancelled
	}

	/// Push `event` for `id`. Returns `false` if the engine stopped listening
	/// or the id was never issued.
	pub fn emit(&self, id: &str, event: BackendEvent) -> bool {
		self.sinks.get(id).is_some_and(|sink| sink.send(event))
	}

	pub fn emit_result(&self, id: &str, result: SearchResult) -> bool {
		self.emit(id, BackendEvent::Result(result))
	}

	/// Push every result in order, stopping at the first rejected send.
	pub fn emit_results(&self, id: &str, results: impl IntoIterator<Item = SearchResult>) -> usize {
		results
			.into_iter()
			.take_while(|result| self.emit_result(id, result.clone()))
			.count()
	}

	pub fn complete(&self, id: &str) -> bool {
		self.emit(id, BackendEvent::Complete)
	}

	pub fn fail(&self, id: &str, message: &str) -> bool {
		self.emit(id, BackendEvent::Error(message.to_string()))
	}

	/// Drop the producer half for `id` without a terminal event.
	pub fn disconnect(&mut self, id: &str) {
		self.sinks.remove(id);
	}
}

impl SearchBackend for ScriptedBackend {
	fn start(&mut self, query: &SearchQuery, sink: EventSink) -> Result<SearchId, BackendError> {
		if let Some(message) = &self.start_failure {
			return Err(BackendError::Unavailable(message.clone()));
		}
		self.issued += 1;
		let id = SearchId::new(format!("search-{}", self.issued));
		self.sinks.insert(id.clone(), sink);
		self.started.push((id.clone(), query.clone()));
		Ok(id)
	}

	fn cancel(&mut self, id: &SearchId) -> Result<(), BackendError> {
		self.cancelled.push(id.clone());
		match &self.cancel_failure {
			Some(message) => Err(BackendError::Unavailable(message.clone())),
			None => Ok(()),
		}
	}
}
