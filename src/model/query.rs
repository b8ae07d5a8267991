//! Search request types: the immutable query handed to a backend and the
//! option presets callers build it from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Immutable description of one search.
///
/// A query is frozen once a search starts and is stored verbatim in history
/// entries and saved searches so that reruns behave identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
	pub root_path: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name_pattern: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content_pattern: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size_filter: Option<SizeFilter>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub date_filter: Option<DateFilter>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_type_filter: Option<FileTypeFilter>,
	#[serde(default)]
	pub options: SearchOptions,
}

impl SearchQuery {
	/// Query rooted at `root_path` using [`SearchOptions::default`].
	pub fn new(root_path: impl Into<String>) -> Self {
		Self {
			root_path: root_path.into(),
			name_pattern: None,
			content_pattern: None,
			size_filter: None,
			date_filter: None,
			file_type_filter: None,
			options: SearchOptions::default(),
		}
	}

	/// Name search with the conservative quick-search options.
	pub fn quick(root_path: impl Into<String>, name_pattern: impl Into<String>) -> Self {
		Self::new(root_path)
			.with_name_pattern(name_pattern)
			.with_options(SearchOptions::conservative())
	}

	pub fn with_name_pattern(mut self, pattern: impl Into<String>) -> Self {
		self.name_pattern = Some(pattern.into());
		self
	}

	pub fn with_content_pattern(mut self, pattern: impl Into<String>) -> Self {
		self.content_pattern = Some(pattern.into());
		self
	}

	pub fn with_size_filter(mut self, filter: SizeFilter) -> Self {
		self.size_filter = Some(filter);
		self
	}

	pub fn with_date_filter(mut self, filter: DateFilter) -> Self {
		self.date_filter = Some(filter);
		self
	}

	pub fn with_file_types(mut self, filter: FileTypeFilter) -> Self {
		self.file_type_filter = Some(filter);
		self
	}

	pub fn with_options(mut self, options: SearchOptions) -> Self {
		self.options = options;
		self
	}

	/// Reject queries that cannot be sent to a backend.
	pub fn validate(&self) -> Result<(), EngineError> {
		if self.root_path.trim().is_empty() {
			return Err(EngineError::validation("search root path must not be empty"));
		}

		if let Some(size) = &self.size_filter
			&& let (Some(min), Some(max)) = (size.min_size, size.max_size)
			&& min > max
		{
			return Err(EngineError::validation(format!(
				"minimum size {min} exceeds maximum size {max}"
			)));
		}

		if let Some(dates) = &self.date_filter
			&& let (Some(start), Some(end)) = (dates.start_date, dates.end_date)
			&& start > end
		{
			return Err(EngineError::validation(
				"date filter starts after it ends",
			));
		}

		if self.options.fuzzy_threshold > 100 {
			return Err(EngineError::validation(format!(
				"fuzzy threshold {} is outside 0-100",
				self.options.fuzzy_threshold
			)));
		}

		Ok(())
	}
}

/// Matching flags and limits attached to every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
	pub case_sensitive: bool,
	pub use_regex: bool,
	pub use_fuzzy: bool,
	/// Minimum fuzzy score (0-100) a name needs to count as a match.
	pub fuzzy_threshold: u8,
	pub include_hidden: bool,
	pub follow_symlinks: bool,
	pub sort_by_relevance: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_results: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_depth: Option<usize>,
}

impl Default for SearchOptions {
	fn default() -> Self {
		Self {
			case_sensitive: false,
			use_regex: false,
			use_fuzzy: true,
			fuzzy_threshold: 60,
			include_hidden: false,
			follow_symlinks: false,
			sort_by_relevance: true,
			max_results: None,
			max_depth: None,
		}
	}
}

impl SearchOptions {
	/// Preset used by quick-search helpers: exact matching only, stricter threshold.
	pub fn conservative() -> Self {
		Self {
			use_fuzzy: false,
			fuzzy_threshold: 80,
			..Self::default()
		}
	}
}

/// Options a fresh search form starts with.
pub fn create_default_options() -> SearchOptions {
	SearchOptions::default()
}

/// Unit the bounds of a [`SizeFilter`] are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizeUnit {
	#[default]
	#[serde(rename = "B")]
	Bytes,
	#[serde(rename = "KB")]
	Kilobytes,
	#[serde(rename = "MB")]
	Megabytes,
	#[serde(rename = "GB")]
	Gigabytes,
}

impl SizeUnit {
	pub fn multiplier(self) -> u64 {
		match self {
			Self::Bytes => 1,
			Self::Kilobytes => 1024,
			Self::Megabytes => 1024 * 1024,
			Self::Gigabytes => 1024 * 1024 * 1024,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeFilter {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_size: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_size: Option<u64>,
	#[serde(default)]
	pub unit: SizeUnit,
}

impl SizeFilter {
	/// Whether `bytes` falls inside the inclusive bounds.
	pub fn contains(&self, bytes: u64) -> bool {
		let scale = self.unit.multiplier();
		let above_min = self
			.min_size
			.is_none_or(|min| bytes >= min.saturating_mul(scale));
		let below_max = self
			.max_size
			.is_none_or(|max| bytes <= max.saturating_mul(scale));
		above_min && below_max
	}
}

/// Which filesystem timestamp a [`DateFilter`] inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateType {
	#[default]
	Modified,
	Created,
	Accessed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFilter {
	#[serde(default)]
	pub date_type: DateType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub start_date: Option<DateTime<Utc>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub end_date: Option<DateTime<Utc>>,
}

impl DateFilter {
	pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
		self.start_date.is_none_or(|start| timestamp >= start)
			&& self.end_date.is_none_or(|end| timestamp <= end)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileTypeFilter {
	pub extensions: Vec<String>,
	pub categories: Vec<FileCategory>,
}

impl FileTypeFilter {
	pub fn is_empty(&self) -> bool {
		self.extensions.is_empty() && self.categories.is_empty()
	}

	/// Case-insensitive extension check against explicit extensions and categories.
	pub fn accepts(&self, extension: &str) -> bool {
		if self.is_empty() {
			return true;
		}
		let extension = extension.trim_start_matches('.').to_ascii_lowercase();
		self.extensions
			.iter()
			.any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&extension))
			|| self
				.categories
				.iter()
				.any(|category| category.extensions().contains(&extension.as_str()))
	}
}

/// Coarse file families usable in a [`FileTypeFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
	Images,
	Documents,
	Audio,
	Video,
	Archives,
	Code,
}

impl FileCategory {
	pub fn extensions(self) -> &'static [&'static str] {
		match self {
			Self::Images => &["png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "ico", "tiff"],
			Self::Documents => &[
				"pdf", "doc", "docx", "txt", "md", "rtf", "odt", "xls", "xlsx", "ppt", "pptx", "csv",
			],
			Self::Audio => &["mp3", "wav", "flac", "aac", "ogg", "m4a"],
			Self::Video => &["mp4", "mkv", "avi", "mov", "wmv", "webm"],
			Self::Archives => &["zip", "tar", "gz", "bz2", "xz", "7z", "rar"],
			Self::Code => &[
				"rs", "ts", "tsx", "js", "jsx", "py", "go", "java", "c", "h", "cpp", "hpp", "rb", "toml",
				"json", "yaml", "yml", "sh",
			],
		}
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;

	use super::*;

	#[test]
	fn default_and_conservative_presets_differ_only_in_fuzzy_settings() {
		let default = SearchOptions::default();
		assert!(default.use_fuzzy);
		assert_eq!(default.fuzzy_threshold, 60);
		assert!(default.sort_by_relevance);
		assert!(!default.include_hidden);
		assert!(!default.follow_symlinks);
		assert!(!default.case_sensitive);
		assert!(!default.use_regex);

		let conservative = SearchOptions::conservative();
		assert!(!conservative.use_fuzzy);
		assert_eq!(conservative.fuzzy_threshold, 80);
		assert_eq!(
			SearchOptions {
				use_fuzzy: true,
				fuzzy_threshold: 60,
				..conservative
			},
			default
		);
		assert_eq!(create_default_options(), default);
	}

	#[test]
	fn quick_queries_use_conservative_options() {
		let query = SearchQuery::quick("/src", "main");
		assert_eq!(query.name_pattern.as_deref(), Some("main"));
		assert_eq!(query.options, SearchOptions::conservative());
	}

	#[test]
	fn empty_root_is_rejected() {
		let err = SearchQuery::new("   ").validate().unwrap_err();
		assert!(matches!(err, EngineError::Validation(_)));
		assert!(SearchQuery::new("/").validate().is_ok());
	}

	#[test]
	fn inverted_size_bounds_are_rejected() {
		let query = SearchQuery::new("/").with_size_filter(SizeFilter {
			min_size: Some(10),
			max_size: Some(1),
			unit: SizeUnit::Kilobytes,
		});
		assert!(query.validate().is_err());
	}

	#[test]
	fn size_filter_scales_by_unit() {
		let filter = SizeFilter {
			min_size: Some(1),
			max_size: Some(2),
			unit: SizeUnit::Kilobytes,
		};
		assert!(!filter.contains(1023));
		assert!(filter.contains(1024));
		assert!(filter.contains(2048));
		assert!(!filter.contains(2049));
	}

	#[test]
	fn date_filter_bounds_are_inclusive() {
		let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
		let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
		let filter = DateFilter {
			date_type: DateType::Modified,
			start_date: Some(start),
			end_date: Some(end),
		};
		assert!(filter.contains(start));
		assert!(filter.contains(end));
		assert!(!filter.contains(end + chrono::Duration::seconds(1)));
	}

	#[test]
	fn file_type_filter_matches_extensions_and_categories() {
		let filter = FileTypeFilter {
			extensions: vec![".TS".into()],
			categories: vec![FileCategory::Images],
		};
		assert!(filter.accepts("ts"));
		assert!(filter.accepts("PNG"));
		assert!(!filter.accepts("rs"));
		assert!(FileTypeFilter::default().accepts("anything"));
	}

	#[test]
	fn json_uses_camel_case_and_omits_unset_fields() {
		let query = SearchQuery::new("/a").with_name_pattern("*.ts");
		let value = serde_json::to_value(&query).unwrap();
		assert_eq!(value["rootPath"], "/a");
		assert_eq!(value["namePattern"], "*.ts");
		assert_eq!(value["options"]["fuzzyThreshold"], 60);
		assert!(value.get("contentPattern").is_none());

		let parsed: SearchQuery =
			serde_json::from_str(r#"{"rootPath":"/b","sizeFilter":{"maxSize":5,"unit":"MB"}}"#)
				.unwrap();
		assert_eq!(parsed.options, SearchOptions::default());
		assert_eq!(parsed.size_filter.unwrap().unit, SizeUnit::Megabytes);
	}
}
