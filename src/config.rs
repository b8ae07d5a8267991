//! Tunables the engine reads at construction time.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::history::MAX_HISTORY_ENTRIES;
use crate::view::{DEFAULT_VIRTUALIZE_THRESHOLD, RenderOverride};

pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
	/// Page size assigned to every new search.
	pub page_size: usize,
	/// Result count at which `auto` rendering switches to virtualized.
	pub virtualize_threshold: usize,
	pub render_mode: RenderOverride,
	/// Retained history entries, at most [`MAX_HISTORY_ENTRIES`].
	pub history_limit: usize,
	/// Where file-backed persistence lives. `None` uses the platform data directory.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data_dir: Option<PathBuf>,
}

impl Default for EngineSettings {
	fn default() -> Self {
		Self {
			page_size: DEFAULT_PAGE_SIZE,
			virtualize_threshold: DEFAULT_VIRTUALIZE_THRESHOLD,
			render_mode: RenderOverride::Auto,
			history_limit: MAX_HISTORY_ENTRIES,
			data_dir: None,
		}
	}
}

impl EngineSettings {
	pub fn validate(&self) -> EngineResult<()> {
		if self.page_size == 0 {
			return Err(EngineError::validation("page size must be at least 1"));
		}
		if self.virtualize_threshold == 0 {
			return Err(EngineError::validation(
				"virtualize threshold must be at least 1",
			));
		}
		if self.history_limit == 0 || self.history_limit > MAX_HISTORY_ENTRIES {
			return Err(EngineError::validation(format!(
				"history limit must be between 1 and {MAX_HISTORY_ENTRIES}"
			)));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_valid() {
		let settings = EngineSettings::default();
		assert_eq!(settings.page_size, 50);
		assert_eq!(settings.virtualize_threshold, 500);
		assert_eq!(settings.history_limit, 50);
		assert!(settings.validate().is_ok());
	}

	#[test]
	fn out_of_range_values_are_rejected() {
		for settings in [
			EngineSettings {
				page_size: 0,
				..EngineSettings::default()
			},
			EngineSettings {
				virtualize_threshold: 0,
				..EngineSettings::default()
			},
			EngineSettings {
				history_limit: 51,
				..EngineSettings::default()
			},
		] {
			assert!(matches!(
				settings.validate(),
				Err(EngineError::Validation(_))
			));
		}
	}
}
