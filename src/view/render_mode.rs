use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Result count at which automatic mode switches to virtualized rendering.
pub const DEFAULT_VIRTUALIZE_THRESHOLD: usize = 500;

/// How a result list should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
	Paginated,
	Virtualized,
}

/// User preference for [`RenderMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderOverride {
	#[default]
	Auto,
	Paginated,
	Virtualized,
}

impl RenderOverride {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Auto => "auto",
			Self::Paginated => "paginated",
			Self::Virtualized => "virtualized",
		}
	}
}

impl fmt::Display for RenderOverride {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RenderOverride {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"auto" => Ok(Self::Auto),
			"paginated" => Ok(Self::Paginated),
			"virtualized" => Ok(Self::Virtualized),
			other => Err(format!(
				"unknown render mode '{other}' (expected auto, paginated or virtualized)"
			)),
		}
	}
}

/// Choose a presentation for `total_results`.
///
/// Explicit overrides always win; in automatic mode the list is virtualized
/// once it reaches `threshold` results.
pub fn select_mode(total_results: usize, threshold: usize, preference: RenderOverride) -> RenderMode {
	match preference {
		RenderOverride::Paginated => RenderMode::Paginated,
		RenderOverride::Virtualized => RenderMode::Virtualized,
		RenderOverride::Auto if total_results >= threshold => RenderMode::Virtualized,
		RenderOverride::Auto => RenderMode::Paginated,
	}
}
