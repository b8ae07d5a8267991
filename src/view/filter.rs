use serde::{Deserialize, Serialize};

use crate::model::{MatchType, SearchResult};

/// Client-side narrowing of a session's results.
///
/// Every populated criterion must hold for a result to be shown. An empty
/// filter shows everything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultFilter {
	/// Case-insensitive substring looked up in the name and path.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub match_types: Vec<MatchType>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_score: Option<u8>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub extensions: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_size: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_size: Option<u64>,
}

impl ResultFilter {
	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}

	pub fn matches(&self, result: &SearchResult) -> bool {
		if let Some(text) = self.text.as_deref().map(str::trim)
			&& !text.is_empty()
		{
			let needle = text.to_lowercase();
			if !result.name.to_lowercase().contains(&needle)
				&& !result.path.to_lowercase().contains(&needle)
			{
				return false;
			}
		}

		if !self.match_types.is_empty() && !self.match_types.contains(&result.match_type) {
			return false;
		}

		if self.min_score.is_some_and(|min| result.relevance_score < min) {
			return false;
		}

		if !self.extensions.is_empty() {
			let Some(extension) = result.extension() else {
				return false;
			};
			let accepted = self
				.extensions
				.iter()
				.any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&extension));
			if !accepted {
				return false;
			}
		}

		self.min_size.is_none_or(|min| result.size >= min)
			&& self.max_size.is_none_or(|max| result.size <= max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> SearchResult {
		SearchResult::new("/src/Lib.rs", MatchType::Content, 65).with_size(2_000)
	}

	#[test]
	fn empty_filter_accepts_everything() {
		let filter = ResultFilter::default();
		assert!(filter.is_empty());
		assert!(filter.matches(&sample()));
	}

	#[test]
	fn text_matches_name_or_path_ignoring_case() {
		let by_name = ResultFilter {
			text: Some("lib".into()),
			..ResultFilter::default()
		};
		let by_path = ResultFilter {
			text: Some("SRC/".into()),
			..ResultFilter::default()
		};
		let miss = ResultFilter {
			text: Some("main".into()),
			..ResultFilter::default()
		};
		assert!(by_name.matches(&sample()));
		assert!(by_path.matches(&sample()));
		assert!(!miss.matches(&sample()));
	}

	#[test]
	fn criteria_are_combined() {
		let filter = ResultFilter {
			match_types: vec![MatchType::Content],
			min_score: Some(60),
			extensions: vec![".RS".into()],
			max_size: Some(4_096),
			..ResultFilter::default()
		};
		assert!(filter.matches(&sample()));

		let stricter = ResultFilter {
			min_score: Some(70),
			..filter.clone()
		};
		assert!(!stricter.matches(&sample()));

		let smaller = ResultFilter {
			max_size: Some(1_000),
			..filter
		};
		assert!(!smaller.matches(&sample()));
	}

	#[test]
	fn extension_filter_rejects_extensionless_names() {
		let filter = ResultFilter {
			extensions: vec!["rs".into()],
			..ResultFilter::default()
		};
		assert!(!filter.matches(&SearchResult::new("/bin/tool", MatchType::ExactName, 10)));
	}
}
