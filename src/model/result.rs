use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest relevance score a backend may assign.
pub const MAX_RELEVANCE: u8 = 100;

/// How a result matched its query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
	ExactName,
	FuzzyName,
	Content,
	Extension,
	Directory,
}

impl MatchType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::ExactName => "exact-name",
			Self::FuzzyName => "fuzzy-name",
			Self::Content => "content",
			Self::Extension => "extension",
			Self::Directory => "directory",
		}
	}
}

/// A single line of file content that matched a content pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineMatch {
	/// 1-based line number.
	pub line_number: usize,
	pub line_content: String,
	/// Byte offset of the match within `line_content`.
	pub match_start: usize,
	pub match_end: usize,
}

/// One hit streamed back by a backend. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
	pub path: String,
	pub name: String,
	pub size: u64,
	pub modified: Option<DateTime<Utc>>,
	pub match_type: MatchType,
	/// Backend-assigned ranking in `0..=100`.
	pub relevance_score: u8,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub snippet: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub matches: Option<Vec<LineMatch>>,
}

impl SearchResult {
	/// Build a result for `path`, deriving `name` from its final component.
	///
	/// Scores above [`MAX_RELEVANCE`] are clamped.
	pub fn new(path: impl Into<String>, match_type: MatchType, relevance_score: u8) -> Self {
		let path = path.into();
		let name = Path::new(&path)
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| path.clone());
		Self {
			path,
			name,
			size: 0,
			modified: None,
			match_type,
			relevance_score: relevance_score.min(MAX_RELEVANCE),
			snippet: None,
			matches: None,
		}
	}

	pub fn with_size(mut self, size: u64) -> Self {
		self.size = size;
		self
	}

	pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
		self.modified = Some(modified);
		self
	}

	pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
		self.snippet = Some(snippet.into());
		self
	}

	pub fn with_matches(mut self, matches: Vec<LineMatch>) -> Self {
		self.matches = Some(matches);
		self
	}

	/// Lower-cased extension of `name`, if any.
	pub fn extension(&self) -> Option<String> {
		Path::new(&self.name)
			.extension()
			.map(|ext| ext.to_string_lossy().to_ascii_lowercase())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn name_is_derived_from_path() {
		let result = SearchResult::new("/a/b/main.rs", MatchType::ExactName, 90);
		assert_eq!(result.name, "main.rs");
		assert_eq!(result.extension().as_deref(), Some("rs"));
	}

	#[test]
	fn scores_are_clamped() {
		let result = SearchResult::new("x", MatchType::FuzzyName, 250);
		assert_eq!(result.relevance_score, MAX_RELEVANCE);
	}

	#[test]
	fn match_type_serializes_kebab_case() {
		let json = serde_json::to_string(&MatchType::ExactName).unwrap();
		assert_eq!(json, "\"exact-name\"");
		assert_eq!(MatchType::FuzzyName.as_str(), "fuzzy-name");
		let parsed: MatchType = serde_json::from_str("\"directory\"").unwrap();
		assert_eq!(parsed, MatchType::Directory);
	}
}
