use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Error, Result};
use serde::Deserialize;
use trawl::{EngineSettings, RenderOverride, app_dirs};

use super::resolved::{ConfigError, ConfigSources, ResolvedConfig, SettingSource};
use crate::cli::CliArgs;

/// Mirror of the configuration file before CLI overrides and validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConfig {
	search: SearchSection,
	history: HistorySection,
	storage: StorageSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SearchSection {
	page_size: Option<usize>,
	virtualize_threshold: Option<usize>,
	render_mode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct HistorySection {
	limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct StorageSection {
	data_dir: Option<PathBuf>,
}

impl RawConfig {
	/// Apply CLI overrides on top of the raw configuration values.
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(value) = cli.page_size {
			self.search.page_size = Some(value);
		}
		if let Some(value) = cli.virtualize_threshold {
			self.search.virtualize_threshold = Some(value);
		}
		if let Some(mode) = cli.render_mode {
			self.search.render_mode = Some(mode.as_str().to_string());
		}
		if let Some(value) = cli.history_limit {
			self.history.limit = Some(value);
		}
		if let Some(dir) = cli.data_dir.clone() {
			self.storage.data_dir = Some(dir);
		}
	}

	/// Fill defaults, resolve the data directory and validate.
	pub(super) fn resolve(self, cli: &CliArgs) -> Result<ResolvedConfig> {
		let sources = ConfigSources {
			page_size: detect_source(
				cli.page_size.is_some(),
				self.search.page_size.is_some(),
				"TRAWL__SEARCH__PAGE_SIZE",
				"--page-size",
				"search.page_size",
			),
			virtualize_threshold: detect_source(
				cli.virtualize_threshold.is_some(),
				self.search.virtualize_threshold.is_some(),
				"TRAWL__SEARCH__VIRTUALIZE_THRESHOLD",
				"--virtualize-threshold",
				"search.virtualize_threshold",
			),
			render_mode: detect_source(
				cli.render_mode.is_some(),
				self.search.render_mode.is_some(),
				"TRAWL__SEARCH__RENDER_MODE",
				"--render-mode",
				"search.render_mode",
			),
			history_limit: detect_source(
				cli.history_limit.is_some(),
				self.history.limit.is_some(),
				"TRAWL__HISTORY__LIMIT",
				"--history-limit",
				"history.limit",
			),
		};

		let defaults = EngineSettings::default();
		let render_mode = match self.search.render_mode {
			Some(value) => RenderOverride::from_str(&value).map_err(|reason| {
				Error::new(ConfigError::invalid(
					"search.render_mode",
					value.clone(),
					sources.source_for_render_mode(),
					reason,
				))
			})?,
			None => defaults.render_mode,
		};

		let data_dir = match self.storage.data_dir {
			Some(dir) => dir,
			None => app_dirs::get_data_dir().context("failed to resolve the data directory")?,
		};

		let config = ResolvedConfig {
			engine: EngineSettings {
				page_size: self.search.page_size.unwrap_or(defaults.page_size),
				virtualize_threshold: self
					.search
					.virtualize_threshold
					.unwrap_or(defaults.virtualize_threshold),
				render_mode,
				history_limit: self.history.limit.unwrap_or(defaults.history_limit),
				data_dir: Some(data_dir.clone()),
			},
			data_dir,
		};

		config.validate(&sources).map_err(Error::new)?;

		Ok(config)
	}
}

fn detect_source(
	cli_present: bool,
	value_present: bool,
	env_var: &'static str,
	cli_flag: &'static str,
	key: &'static str,
) -> Option<SettingSource> {
	if !value_present {
		return None;
	}

	if cli_present {
		return Some(SettingSource::CliFlag(cli_flag));
	}

	if env::var_os(env_var).is_some() {
		return Some(SettingSource::Environment(env_var));
	}

	Some(SettingSource::ConfigKey(key))
}
