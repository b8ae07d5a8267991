use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{SearchQuery, SearchResult};
use crate::view::{Pagination, ResultFilter, SortSpec};

/// Backend-issued identifier of one search session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchId(String);

impl SearchId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for SearchId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for SearchId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl From<String> for SearchId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<&str> for SearchId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

/// Lifecycle of a session: `running` until exactly one terminal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
	Running,
	Completed,
	Error,
	Cancelled,
}

impl SearchStatus {
	pub fn is_terminal(self) -> bool {
		!matches!(self, Self::Running)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Running => "running",
			Self::Completed => "completed",
			Self::Error => "error",
			Self::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for SearchStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// How a backend ended a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	Completed,
	Failed(String),
}

/// One tracked search. Mutated only through [`SessionStore`](super::SessionStore).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
	pub(super) id: SearchId,
	pub(super) query: SearchQuery,
	pub(super) status: SearchStatus,
	pub(super) results: Vec<SearchResult>,
	pub(super) total_results: usize,
	pub(super) start_time: DateTime<Utc>,
	pub(super) end_time: Option<DateTime<Utc>>,
	pub(super) error: Option<String>,
	pub(super) pagination: Pagination,
	pub(super) sort: SortSpec,
	pub(super) filter: Option<ResultFilter>,
}

impl SearchState {
	pub(super) fn running(id: SearchId, query: SearchQuery, page_size: usize) -> Self {
		Self {
			id,
			query,
			status: SearchStatus::Running,
			results: Vec::new(),
			total_results: 0,
			start_time: Utc::now(),
			end_time: None,
			error: None,
			pagination: Pagination::new(page_size),
			sort: SortSpec::default(),
			filter: None,
		}
	}

	pub fn id(&self) -> &SearchId {
		&self.id
	}

	pub fn query(&self) -> &SearchQuery {
		&self.query
	}

	pub fn status(&self) -> SearchStatus {
		self.status
	}

	pub fn is_running(&self) -> bool {
		self.status == SearchStatus::Running
	}

	/// Results in arrival order.
	pub fn results(&self) -> &[SearchResult] {
		&self.results
	}

	pub fn total_results(&self) -> usize {
		self.total_results
	}

	pub fn start_time(&self) -> DateTime<Utc> {
		self.start_time
	}

	pub fn end_time(&self) -> Option<DateTime<Utc>> {
		self.end_time
	}

	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn pagination(&self) -> Pagination {
		self.pagination
	}

	pub fn sort(&self) -> SortSpec {
		self.sort
	}

	pub fn filter(&self) -> Option<&ResultFilter> {
		self.filter.as_ref()
	}

	/// Wall-clock time from start to finalization, if finalized.
	pub fn elapsed(&self) -> Option<chrono::Duration> {
		self.end_time.map(|end| end - self.start_time)
	}

	pub(super) fn finish(&mut self, status: SearchStatus, error: Option<String>) {
		self.status = status;
		self.error = error;
		self.end_time = Some(Utc::now());
	}
}
