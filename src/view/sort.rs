use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::filter::ResultFilter;
use crate::model::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
	#[default]
	Relevance,
	Name,
	Path,
	Size,
	Modified,
	MatchType,
}

impl SortKey {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Relevance => "relevance",
			Self::Name => "name",
			Self::Path => "path",
			Self::Size => "size",
			Self::Modified => "modified",
			Self::MatchType => "match-type",
		}
	}
}

impl FromStr for SortKey {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"relevance" | "score" => Ok(Self::Relevance),
			"name" => Ok(Self::Name),
			"path" => Ok(Self::Path),
			"size" => Ok(Self::Size),
			"modified" | "date" => Ok(Self::Modified),
			"match-type" | "type" => Ok(Self::MatchType),
			other => Err(format!("unknown sort key '{other}'")),
		}
	}
}

impl fmt::Display for SortKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	Ascending,
	#[default]
	Descending,
}

/// Active ordering for a session. Defaults to relevance, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
	pub key: SortKey,
	pub order: SortOrder,
}

impl SortSpec {
	pub fn new(key: SortKey, order: SortOrder) -> Self {
		Self { key, order }
	}

	/// Compare two results under this key and order.
	///
	/// Ties on the requested key fall back to relevance descending; remaining
	/// ties keep arrival order because callers sort stably.
	pub fn compare(&self, left: &SearchResult, right: &SearchResult) -> Ordering {
		let primary = match self.key {
			SortKey::Relevance => left.relevance_score.cmp(&right.relevance_score),
			SortKey::Name => compare_text(&left.name, &right.name),
			SortKey::Path => compare_text(&left.path, &right.path),
			SortKey::Size => left.size.cmp(&right.size),
			SortKey::Modified => left.modified.cmp(&right.modified),
			SortKey::MatchType => left.match_type.as_str().cmp(right.match_type.as_str()),
		};
		let primary = match self.order {
			SortOrder::Ascending => primary,
			SortOrder::Descending => primary.reverse(),
		};
		primary.then_with(|| right.relevance_score.cmp(&left.relevance_score))
	}
}

fn compare_text(left: &str, right: &str) -> Ordering {
	left.to_lowercase()
		.cmp(&right.to_lowercase())
		.then_with(|| left.cmp(right))
}

/// Filter and order a result buffer for display without copying results.
pub fn derive_view<'a>(
	results: &'a [SearchResult],
	filter: Option<&ResultFilter>,
	sort: SortSpec,
) -> Vec<&'a SearchResult> {
	let mut view: Vec<&SearchResult> = match filter {
		Some(filter) => results.iter().filter(|result| filter.matches(result)).collect(),
		None => results.iter().collect(),
	};
	view.sort_by(|left, right| sort.compare(left, right));
	view
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::MatchType;

	fn scored(path: &str, score: u8) -> SearchResult {
		SearchResult::new(path, MatchType::ExactName, score)
	}

	fn scores(view: &[&SearchResult]) -> Vec<u8> {
		view.iter().map(|result| result.relevance_score).collect()
	}

	#[test]
	fn default_view_is_relevance_descending() {
		let results = vec![scored("a", 40), scored("b", 90), scored("c", 70)];
		let view = derive_view(&results, None, SortSpec::default());
		assert_eq!(scores(&view), vec![90, 70, 40]);
	}

	#[test]
	fn ties_fall_back_to_relevance_then_arrival() {
		let results = vec![
			scored("same", 10).with_size(5),
			scored("first", 80).with_size(5),
			scored("second", 80).with_size(5),
		];
		let view = derive_view(
			&results,
			None,
			SortSpec::new(SortKey::Size, SortOrder::Ascending),
		);
		let paths: Vec<&str> = view.iter().map(|result| result.path.as_str()).collect();
		assert_eq!(paths, vec!["first", "second", "same"]);
	}

	#[test]
	fn name_sort_is_case_insensitive() {
		let results = vec![scored("/b/beta", 1), scored("/a/Alpha", 1), scored("/c/gamma", 1)];
		let view = derive_view(
			&results,
			None,
			SortSpec::new(SortKey::Name, SortOrder::Ascending),
		);
		let names: Vec<&str> = view.iter().map(|result| result.name.as_str()).collect();
		assert_eq!(names, vec!["Alpha", "beta", "gamma"]);
	}

	#[test]
	fn filter_is_applied_before_sorting() {
		let results = vec![scored("a.rs", 10), scored("b.ts", 90), scored("c.rs", 50)];
		let filter = ResultFilter {
			extensions: vec!["rs".into()],
			..ResultFilter::default()
		};
		let view = derive_view(&results, Some(&filter), SortSpec::default());
		assert_eq!(scores(&view), vec![50, 10]);
	}

	#[test]
	fn parses_sort_keys() {
		assert_eq!("Size".parse(), Ok(SortKey::Size));
		assert_eq!("match-type".parse(), Ok(SortKey::MatchType));
		assert!("colour".parse::<SortKey>().is_err());
	}
}
