//! Binds backend event subscriptions to [`SessionStore`] mutations.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::gateway::{BackendEvent, EventSink, EventSubscription};
use crate::session::{Outcome, SearchId, SessionStore};

/// Message stored on sessions whose backend vanished without a terminal event.
pub const DISCONNECTED_MESSAGE: &str = "search backend disconnected before completing";

/// Create the sink/subscription pair for a search that is about to start.
pub fn open_channel() -> (EventSink, EventSubscription) {
	trawl_stream::channel()
}

/// What one [`EventStreamAdapter::pump`] turn did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PumpReport {
	/// Results appended to running sessions.
	pub applied: usize,
	/// Results discarded because their session was no longer running.
	pub dropped: usize,
	/// Sessions that reached a terminal state during this turn.
	pub finalized: Vec<SearchId>,
}

impl PumpReport {
	pub fn is_idle(&self) -> bool {
		self.applied == 0 && self.dropped == 0 && self.finalized.is_empty()
	}
}

/// Owns one live subscription per running search.
///
/// Every subscription registered with [`subscribe`](Self::subscribe) is torn
/// down exactly once: on completion, on error, on producer disconnect, or on
/// an explicit [`unsubscribe`](Self::unsubscribe), whichever happens first.
#[derive(Debug, Default)]
pub struct EventStreamAdapter {
	subscriptions: HashMap<SearchId, EventSubscription>,
	opened: u64,
	closed: u64,
}

impl EventStreamAdapter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn subscribe(&mut self, id: SearchId, subscription: EventSubscription) {
		self.opened += 1;
		if let Some(previous) = self.subscriptions.insert(id.clone(), subscription) {
			debug!(search = %id, "replacing an existing subscription");
			self.release(previous);
		}
	}

	/// Drop the subscription for `id`. Returns `false` if none was live.
	pub fn unsubscribe(&mut self, id: &str) -> bool {
		match self.subscriptions.remove(id) {
			Some(subscription) => {
				self.release(subscription);
				true
			}
			None => false,
		}
	}

	pub fn unsubscribe_all(&mut self) {
		let drained: Vec<EventSubscription> =
			self.subscriptions.drain().map(|(_, subscription)| subscription).collect();
		for subscription in drained {
			self.release(subscription);
		}
	}

	fn release(&mut self, subscription: EventSubscription) {
		let delivered = subscription.unsubscribe();
		self.closed += 1;
		trace!(delivered, "subscription released");
	}

	pub fn is_subscribed(&self, id: &str) -> bool {
		self.subscriptions.contains_key(id)
	}

	/// Number of live subscriptions.
	pub fn active(&self) -> usize {
		self.subscriptions.len()
	}

	/// Total subscriptions ever registered and ever released.
	pub fn lifetime_counts(&self) -> (u64, u64) {
		(self.opened, self.closed)
	}

	/// Apply everything currently buffered on every subscription.
	///
	/// Consecutive results are appended as one batch in arrival order. A
	/// terminal event finalizes the session and releases its subscription, so
	/// anything the backend sends afterwards is never read.
	pub fn pump(&mut self, store: &mut SessionStore) -> PumpReport {
		let mut report = PumpReport::default();

		for (id, subscription) in &mut self.subscriptions {
			let mut batch = Vec::new();
			let outcome = loop {
				match subscription.next_event() {
					trawl_stream::Next::Event(BackendEvent::Result(result)) => batch.push(result),
					trawl_stream::Next::Event(BackendEvent::Complete) => {
						break Some(Outcome::Completed);
					}
					trawl_stream::Next::Event(BackendEvent::Error(message)) => {
						break Some(Outcome::Failed(message));
					}
					trawl_stream::Next::Pending => break None,
					trawl_stream::Next::Closed => {
						break Some(Outcome::Failed(DISCONNECTED_MESSAGE.to_string()));
					}
				}
			};

			if !batch.is_empty() {
				let count = batch.len();
				if store.add_results(id.as_str(), batch) {
					report.applied += count;
				} else {
					report.dropped += count;
				}
			}

			if let Some(outcome) = outcome {
				store.finalize(id.as_str(), outcome);
				report.finalized.push(id.clone());
			}
		}

		for id in &report.finalized {
			self.unsubscribe(id.as_str());
		}

		report
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{MatchType, SearchQuery, SearchResult};
	use crate::session::SearchStatus;

	fn result(score: u8) -> BackendEvent {
		BackendEvent::Result(SearchResult::new(
			format!("/r/{score}"),
			MatchType::ExactName,
			score,
		))
	}

	fn running(store: &mut SessionStore, adapter: &mut EventStreamAdapter, id: &str) -> EventSink {
		let (sink, subscription) = open_channel();
		store.create(SearchId::from(id), SearchQuery::new("/r"), 10);
		adapter.subscribe(SearchId::from(id), subscription);
		sink
	}

	#[test]
	fn results_then_completion_finalize_and_release() {
		let mut store = SessionStore::new();
		let mut adapter = EventStreamAdapter::new();
		let sink = running(&mut store, &mut adapter, "s1");

		sink.send(result(1));
		sink.send(result(2));
		sink.send(BackendEvent::Complete);

		let report = adapter.pump(&mut store);
		assert_eq!(report.applied, 2);
		assert_eq!(report.finalized, vec![SearchId::from("s1")]);
		assert_eq!(store.get("s1").unwrap().status(), SearchStatus::Completed);
		assert_eq!(adapter.active(), 0);
		assert_eq!(adapter.lifetime_counts(), (1, 1));
	}

	#[test]
	fn events_after_completion_are_never_applied() {
		let mut store = SessionStore::new();
		let mut adapter = EventStreamAdapter::new();
		let sink = running(&mut store, &mut adapter, "s1");

		sink.send(result(1));
		sink.send(BackendEvent::Complete);
		sink.send(result(2));
		sink.send(BackendEvent::Complete);

		adapter.pump(&mut store);
		assert!(!sink.send(result(3)));
		assert!(adapter.pump(&mut store).is_idle());
		assert_eq!(store.get("s1").unwrap().total_results(), 1);
	}

	#[test]
	fn backend_error_becomes_terminal_state() {
		let mut store = SessionStore::new();
		let mut adapter = EventStreamAdapter::new();
		let sink = running(&mut store, &mut adapter, "s1");

		sink.send(result(5));
		sink.send(BackendEvent::Error("disk vanished".into()));
		adapter.pump(&mut store);

		let state = store.get("s1").unwrap();
		assert_eq!(state.status(), SearchStatus::Error);
		assert_eq!(state.error(), Some("disk vanished"));
		assert_eq!(state.total_results(), 1);
		assert!(!adapter.is_subscribed("s1"));
	}

	#[test]
	fn producer_disconnect_fails_the_session() {
		let mut store = SessionStore::new();
		let mut adapter = EventStreamAdapter::new();
		let sink = running(&mut store, &mut adapter, "s1");
		sink.send(result(5));
		drop(sink);

		adapter.pump(&mut store);
		let state = store.get("s1").unwrap();
		assert_eq!(state.status(), SearchStatus::Error);
		assert_eq!(state.error(), Some(DISCONNECTED_MESSAGE));
		assert_eq!(state.total_results(), 1);
	}

	#[test]
	fn pending_subscriptions_stay_open() {
		let mut store = SessionStore::new();
		let mut adapter = EventStreamAdapter::new();
		let sink = running(&mut store, &mut adapter, "s1");

		sink.send(result(5));
		let report = adapter.pump(&mut store);
		assert_eq!(report.applied, 1);
		assert!(report.finalized.is_empty());
		assert!(adapter.is_subscribed("s1"));
		assert!(store.is_running("s1"));
	}

	#[test]
	fn results_for_a_cancelled_session_are_dropped() {
		let mut store = SessionStore::new();
		let mut adapter = EventStreamAdapter::new();
		let sink = running(&mut store, &mut adapter, "s1");

		sink.send(result(5));
		store.cancel("s1");
		let report = adapter.pump(&mut store);
		assert_eq!(report.dropped, 1);
		assert_eq!(store.get("s1").unwrap().total_results(), 0);
	}

	#[test]
	fn searches_are_isolated() {
		let mut store = SessionStore::new();
		let mut adapter = EventStreamAdapter::new();
		let first = running(&mut store, &mut adapter, "s1");
		let second = running(&mut store, &mut adapter, "s2");

		first.send(result(1));
		second.send(result(2));
		second.send(result(3));
		second.send(BackendEvent::Complete);
		adapter.pump(&mut store);

		assert_eq!(store.get("s1").unwrap().total_results(), 1);
		assert!(store.is_running("s1"));
		assert_eq!(store.get("s2").unwrap().total_results(), 2);
		assert_eq!(store.get("s2").unwrap().status(), SearchStatus::Completed);
	}

	#[test]
	fn unsubscribe_is_counted_once() {
		let mut adapter = EventStreamAdapter::new();
		let (_sink, subscription) = open_channel();
		adapter.subscribe(SearchId::from("s1"), subscription);
		assert!(adapter.unsubscribe("s1"));
		assert!(!adapter.unsubscribe("s1"));
		assert_eq!(adapter.lifetime_counts(), (1, 1));
	}
}
