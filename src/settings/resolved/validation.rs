use trawl::MAX_HISTORY_ENTRIES;

use super::{ConfigError, ConfigSources, ResolvedConfig};

pub(super) fn validate(
	config: &ResolvedConfig,
	sources: &ConfigSources,
) -> Result<(), ConfigError> {
	let engine = &config.engine;

	if engine.page_size == 0 {
		return Err(ConfigError::invalid(
			"search.page_size",
			engine.page_size.to_string(),
			sources.source_for_page_size(),
			"must be greater than zero",
		));
	}

	if engine.virtualize_threshold == 0 {
		return Err(ConfigError::invalid(
			"search.virtualize_threshold",
			engine.virtualize_threshold.to_string(),
			sources.source_for_virtualize_threshold(),
			"must be greater than zero",
		));
	}

	if engine.history_limit == 0 || engine.history_limit > MAX_HISTORY_ENTRIES {
		return Err(ConfigError::invalid(
			"history.limit",
			engine.history_limit.to_string(),
			sources.source_for_history_limit(),
			format!("must be between 1 and {MAX_HISTORY_ENTRIES}"),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use trawl::EngineSettings;

	use super::super::SettingSource;
	use super::*;

	fn config(engine: EngineSettings) -> ResolvedConfig {
		ResolvedConfig {
			engine,
			data_dir: PathBuf::from("/tmp"),
		}
	}

	#[test]
	fn defaults_pass() {
		let config = config(EngineSettings::default());
		assert!(validate(&config, &ConfigSources::default()).is_ok());
	}

	#[test]
	fn validation_rejects_zero_page_size() {
		let config = config(EngineSettings {
			page_size: 0,
			..EngineSettings::default()
		});
		let sources = ConfigSources {
			page_size: Some(SettingSource::CliFlag("--page-size")),
			..ConfigSources::default()
		};

		let err = validate(&config, &sources).unwrap_err();
		assert_eq!(err.key, "search.page_size");
		let message = err.to_string();
		assert!(message.contains("value: 0"));
		assert!(message.contains("CLI flag"));
	}

	#[test]
	fn validation_rejects_oversized_history() {
		let config = config(EngineSettings {
			history_limit: 51,
			..EngineSettings::default()
		});
		let sources = ConfigSources {
			history_limit: Some(SettingSource::Environment("TRAWL__HISTORY__LIMIT")),
			..ConfigSources::default()
		};

		let err = validate(&config, &sources).unwrap_err();
		assert_eq!(err.key, "history.limit");
		assert!(err.to_string().contains("environment variable"));
	}

	#[test]
	fn unset_sources_fall_back_to_config_keys() {
		let config = config(EngineSettings {
			virtualize_threshold: 0,
			..EngineSettings::default()
		});

		let err = validate(&config, &ConfigSources::default()).unwrap_err();
		assert_eq!(
			err.origin,
			SettingSource::ConfigKey("search.virtualize_threshold")
		);
	}
}
