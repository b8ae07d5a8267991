//! Per-subscription event channels for streaming backend events into a
//! single-threaded consumer.
//!
//! A producer (usually a search backend running on its own thread) receives an
//! [`EventSink`] and pushes events into it. The consumer keeps the matching
//! [`Subscription`] and drains it on its own schedule, typically once per turn
//! of an event loop. Dropping or [`unsubscribing`](Subscription::unsubscribe)
//! the subscription closes the channel: subsequent [`EventSink::send`] calls
//! report `false`, which lets producers notice that nobody is listening and
//! stop early.
//!
//! ```
//! use trawl_stream::{Next, channel};
//!
//! let (sink, mut subscription) = channel::<&str>();
//! assert!(sink.send("first"));
//! assert!(sink.send("second"));
//!
//! let drained: Vec<_> = subscription.drain().collect();
//! assert_eq!(drained, vec!["first", "second"]);
//! assert!(matches!(subscription.next_event(), Next::Pending));
//!
//! subscription.unsubscribe();
//! assert!(!sink.send("late"));
//! ```

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Create a connected sink/subscription pair.
#[must_use]
pub fn channel<E>() -> (EventSink<E>, Subscription<E>) {
	let (tx, rx) = mpsc::channel();
	(
		EventSink { tx },
		Subscription {
			rx,
			closed: false,
			received: 0,
		},
	)
}

/// Producer half of a subscription.
pub struct EventSink<E> {
	tx: Sender<E>,
}

impl<E> EventSink<E> {
	/// Push an event to the subscriber.
	///
	/// Returns `false` once the subscription has been dropped; the event is
	/// discarded in that case.
	pub fn send(&self, event: E) -> bool {
		self.tx.send(event).is_ok()
	}
}

impl<E> Clone for EventSink<E> {
	fn clone(&self) -> Self {
		Self {
			tx: self.tx.clone(),
		}
	}
}

impl<E> fmt::Debug for EventSink<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("EventSink(..)")
	}
}

/// Result of polling a [`Subscription`] once.
#[derive(Debug, PartialEq, Eq)]
pub enum Next<E> {
	/// An event was waiting in the channel.
	Event(E),
	/// Nothing is buffered right now but producers are still connected.
	Pending,
	/// Every producer has gone away and the buffer is empty.
	Closed,
}

/// Consumer half of a subscription.
pub struct Subscription<E> {
	rx: Receiver<E>,
	closed: bool,
	received: u64,
}

impl<E> Subscription<E> {
	/// Poll for the next buffered event without blocking.
	pub fn next_event(&mut self) -> Next<E> {
		if self.closed {
			return Next::Closed;
		}

		match self.rx.try_recv() {
			Ok(event) => {
				self.received += 1;
				Next::Event(event)
			}
			Err(TryRecvError::Empty) => Next::Pending,
			Err(TryRecvError::Disconnected) => {
				self.closed = true;
				Next::Closed
			}
		}
	}

	/// Iterate over the events buffered right now, in arrival order.
	///
	/// The iterator stops at the first empty poll, so it never blocks. Use
	/// [`is_closed`](Self::is_closed) afterwards to learn whether producers are
	/// gone for good.
	pub fn drain(&mut self) -> Drain<'_, E> {
		Drain { subscription: self }
	}

	/// Whether all producers disconnected and the buffer was fully drained.
	#[must_use]
	pub fn is_closed(&self) -> bool {
		self.closed
	}

	/// Number of events handed out by this subscription so far.
	#[must_use]
	pub fn received(&self) -> u64 {
		self.received
	}

	/// Tear the subscription down, discarding anything still buffered.
	///
	/// Returns how many events were delivered over the subscription's lifetime.
	pub fn unsubscribe(self) -> u64 {
		self.received
	}
}

impl<E> fmt::Debug for Subscription<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("closed", &self.closed)
			.field("received", &self.received)
			.finish()
	}
}

/// Non-blocking iterator returned by [`Subscription::drain`].
pub struct Drain<'a, E> {
	subscription: &'a mut Subscription<E>,
}

impl<E> Iterator for Drain<'_, E> {
	type Item = E;

	fn next(&mut self) -> Option<E> {
		match self.subscription.next_event() {
			Next::Event(event) => Some(event),
			Next::Pending | Next::Closed => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::thread;

	use super::*;

	#[test]
	fn events_arrive_in_send_order() {
		let (sink, mut subscription) = channel();
		for value in 0..5 {
			assert!(sink.send(value));
		}

		let drained: Vec<i32> = subscription.drain().collect();
		assert_eq!(drained, vec![0, 1, 2, 3, 4]);
		assert_eq!(subscription.received(), 5);
	}

	#[test]
	fn send_reports_false_after_unsubscribe() {
		let (sink, subscription) = channel::<u8>();
		assert_eq!(subscription.unsubscribe(), 0);
		assert!(!sink.send(1));
	}

	#[test]
	fn closed_only_after_buffer_is_drained() {
		let (sink, mut subscription) = channel();
		sink.send("tail");
		drop(sink);

		assert!(!subscription.is_closed());
		assert_eq!(subscription.next_event(), Next::Event("tail"));
		assert_eq!(subscription.next_event(), Next::Closed);
		assert!(subscription.is_closed());
		assert_eq!(subscription.next_event(), Next::Closed);
	}

	#[test]
	fn pending_while_producer_is_alive() {
		let (sink, mut subscription) = channel::<()>();
		assert_eq!(subscription.next_event(), Next::Pending);
		assert!(!subscription.is_closed());
		drop(sink);
		assert_eq!(subscription.next_event(), Next::Closed);
	}

	#[test]
	fn cloned_sinks_feed_the_same_subscription() {
		let (sink, mut subscription) = channel();
		let other = sink.clone();
		let handle = thread::spawn(move || {
			other.send(2);
		});
		sink.send(1);
		handle.join().unwrap();
		drop(sink);

		let mut seen: Vec<i32> = subscription.drain().collect();
		seen.sort_unstable();
		assert_eq!(seen, vec![1, 2]);
		assert!(subscription.is_closed());
	}
}
