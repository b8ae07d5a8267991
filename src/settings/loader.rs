use anyhow::{Context, Result};
use tracing::debug;

use super::raw::RawConfig;
use super::resolved::ResolvedConfig;
use super::sources::build_config;
use crate::cli::CliArgs;

/// Merge config files, `TRAWL__*` variables and CLI flags into validated
/// engine settings.
pub fn load(cli: &CliArgs) -> Result<ResolvedConfig> {
	let mut raw: RawConfig = build_config(cli)?
		.try_deserialize()
		.context("configuration does not match the expected [search], [history] and [storage] tables")?;
	raw.apply_cli_overrides(cli);

	let resolved = raw.resolve(cli)?;
	debug!(
		page_size = resolved.engine.page_size,
		history_limit = resolved.engine.history_limit,
		data_dir = %resolved.data_dir.display(),
		"configuration resolved"
	);
	Ok(resolved)
}
