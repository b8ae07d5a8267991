//! In-memory search sessions and their `running -> terminal` state machine.

mod state;
mod store;

pub use state::{Outcome, SearchId, SearchState, SearchStatus};
pub use store::SessionStore;
