use std::path::PathBuf;

use trawl::EngineSettings;

mod errors;
mod sources;
mod summary;
mod validation;

pub(crate) use errors::ConfigError;
pub(crate) use sources::{ConfigSources, SettingSource};

/// Engine settings plus the storage location, ready to build a facade from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
	pub engine: EngineSettings,
	pub data_dir: PathBuf,
}

impl ResolvedConfig {
	pub(super) fn validate(&self, sources: &ConfigSources) -> Result<(), ConfigError> {
		validation::validate(self, sources)
	}

	/// Print a human readable summary of the effective configuration.
	pub fn print_summary(&self) {
		summary::print_summary(self);
	}
}
