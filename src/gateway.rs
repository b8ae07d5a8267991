//! Contract between the engine and an external search backend.

use thiserror::Error;

use crate::model::{SearchQuery, SearchResult};
use crate::session::SearchId;

/// Event pushed by a backend for one search.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
	Result(SearchResult),
	Complete,
	Error(String),
}

/// Producer half of a search subscription, handed to the backend on start.
pub type EventSink = trawl_stream::EventSink<BackendEvent>;

/// Consumer half kept by the engine.
pub type EventSubscription = trawl_stream::Subscription<BackendEvent>;

#[derive(Debug, Error)]
pub enum BackendError {
	/// The transport to the backend failed.
	#[error("backend unreachable: {0}")]
	Unavailable(String),

	/// The backend refused the query.
	#[error("backend rejected the query: {0}")]
	Rejected(String),

	#[error("backend does not know search '{0}'")]
	UnknownSearch(SearchId),
}

/// An external matcher the engine can drive.
///
/// `start` must either accept the query and return a fresh id, or fail
/// without emitting anything. After accepting, the backend pushes
/// [`BackendEvent`]s into `sink`, ending with exactly one `Complete` or
/// `Error`. A `false` from [`EventSink::send`] means the engine stopped
/// listening and the backend may abandon the work.
pub trait SearchBackend {
	fn start(&mut self, query: &SearchQuery, sink: EventSink) -> Result<SearchId, BackendError>;

	/// Best-effort request to stop a search.
	fn cancel(&mut self, id: &SearchId) -> Result<(), BackendError>;
}

impl<B: SearchBackend + ?Sized> SearchBackend for Box<B> {
	fn start(&mut self, query: &SearchQuery, sink: EventSink) -> Result<SearchId, BackendError> {
		(**self).start(query, sink)
	}

	fn cancel(&mut self, id: &SearchId) -> Result<(), BackendError> {
		(**self).cancel(id)
	}
}
