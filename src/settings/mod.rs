//! Layered configuration for the `trawl` binary.
//!
//! Defaults, config files, `TRAWL__*` environment variables and CLI flags are
//! merged in that order. `load` returns a validated [`ResolvedConfig`].

mod loader;
mod raw;
mod resolved;
mod sources;

pub use loader::load;
pub use resolved::ResolvedConfig;
