//! Built-in [`SearchBackend`](crate::gateway::SearchBackend) implementations.

mod local;
mod matcher;

pub use local::LocalBackend;
