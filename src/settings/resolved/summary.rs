use super::ResolvedConfig;

pub(super) fn print_summary(config: &ResolvedConfig) {
	for line in summary_lines(config) {
		println!("{line}");
	}
}

fn summary_lines(config: &ResolvedConfig) -> Vec<String> {
	let engine = &config.engine;
	vec![
		"Effective configuration:".to_string(),
		format!("  Data directory: {}", config.data_dir.display()),
		format!("  Page size: {}", engine.page_size),
		format!("  Virtualize threshold: {}", engine.virtualize_threshold),
		format!("  Render mode: {}", engine.render_mode.as_str()),
		format!("  History limit: {}", engine.history_limit),
	]
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use trawl::{EngineSettings, RenderOverride};

	use super::*;

	#[test]
	fn summary_lists_every_setting() {
		let config = ResolvedConfig {
			engine: EngineSettings {
				render_mode: RenderOverride::Virtualized,
				..EngineSettings::default()
			},
			data_dir: PathBuf::from("/tmp/trawl"),
		};

		let lines = summary_lines(&config);
		assert_eq!(lines[1], "  Data directory: /tmp/trawl");
		assert_eq!(lines[2], "  Page size: 50");
		assert_eq!(lines[4], "  Render mode: virtualized");
		print_summary(&config);
	}
}
