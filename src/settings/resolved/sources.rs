use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SettingSource {
	CliFlag(&'static str),
	Environment(&'static str),
	ConfigKey(&'static str),
}

impl fmt::Display for SettingSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::CliFlag(flag) => write!(f, "CLI flag `{flag}`"),
			Self::Environment(var) => write!(f, "environment variable `{var}`"),
			Self::ConfigKey(key) => write!(f, "configuration key `{key}`"),
		}
	}
}

/// Where each validated setting came from, when it was set at all.
#[derive(Debug, Default, Clone)]
pub(crate) struct ConfigSources {
	pub(crate) page_size: Option<SettingSource>,
	pub(crate) virtualize_threshold: Option<SettingSource>,
	pub(crate) render_mode: Option<SettingSource>,
	pub(crate) history_limit: Option<SettingSource>,
}

impl ConfigSources {
	pub(crate) fn source_for_page_size(&self) -> SettingSource {
		self.page_size
			.clone()
			.unwrap_or(SettingSource::ConfigKey("search.page_size"))
	}

	pub(crate) fn source_for_virtualize_threshold(&self) -> SettingSource {
		self.virtualize_threshold
			.clone()
			.unwrap_or(SettingSource::ConfigKey("search.virtualize_threshold"))
	}

	pub(crate) fn source_for_render_mode(&self) -> SettingSource {
		self.render_mode
			.clone()
			.unwrap_or(SettingSource::ConfigKey("search.render_mode"))
	}

	pub(crate) fn source_for_history_limit(&self) -> SettingSource {
		self.history_limit
			.clone()
			.unwrap_or(SettingSource::ConfigKey("history.limit"))
	}
}
