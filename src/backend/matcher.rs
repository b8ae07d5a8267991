//! Name and content matching for the local backend.

use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexBuilder};

use crate::gateway::BackendError;
use crate::model::{LineMatch, MatchType, SearchOptions};

/// Longest line excerpt kept in a [`LineMatch`].
const MAX_LINE_CHARS: usize = 240;
/// Per-file cap on reported content matches.
pub(crate) const MAX_LINE_MATCHES: usize = 100;

fn looks_like_glob(pattern: &str) -> bool {
	pattern.contains(['*', '?', '[', '{'])
}

fn rejected(kind: &str, pattern: &str, err: impl std::fmt::Display) -> BackendError {
	BackendError::Rejected(format!("invalid {kind} pattern '{pattern}': {err}"))
}

/// Compiled form of a query's name pattern.
#[derive(Debug)]
pub(crate) enum NameMatcher {
	Glob(GlobMatcher),
	Regex(Regex),
	Text {
		needle: String,
		case_sensitive: bool,
		/// Minimum fuzzy score, when fuzzy matching is enabled.
		fuzzy_threshold: Option<u8>,
	},
}

impl NameMatcher {
	pub(crate) fn compile(pattern: &str, options: &SearchOptions) -> Result<Self, BackendError> {
		if options.use_regex {
			let regex = RegexBuilder::new(pattern)
				.case_insensitive(!options.case_sensitive)
				.build()
				.map_err(|err| rejected("regex", pattern, err))?;
			return Ok(Self::Regex(regex));
		}

		if looks_like_glob(pattern) {
			let glob = GlobBuilder::new(pattern)
				.case_insensitive(!options.case_sensitive)
				.literal_separator(false)
				.build()
				.map_err(|err| rejected("glob", pattern, err))?;
			return Ok(Self::Glob(glob.compile_matcher()));
		}

		let needle = if options.case_sensitive {
			pattern.to_string()
		} else {
			pattern.to_lowercase()
		};
		Ok(Self::Text {
			needle,
			case_sensitive: options.case_sensitive,
			fuzzy_threshold: options.use_fuzzy.then_some(options.fuzzy_threshold),
		})
	}

	/// Classify `name`, returning the match kind and a 0-100 score.
	pub(crate) fn score(&self, name: &str) -> Option<(MatchType, u8)> {
		match self {
			Self::Glob(glob) => glob.is_match(name).then_some((MatchType::ExactName, 90)),
			Self::Regex(regex) => {
				let found = regex.find(name)?;
				let score = if found.start() == 0 && found.end() == name.len() {
					100
				} else {
					80
				};
				Some((MatchType::ExactName, score))
			}
			Self::Text {
				needle,
				case_sensitive,
				fuzzy_threshold,
			} => {
				let haystack = if *case_sensitive {
					name.to_string()
				} else {
					name.to_lowercase()
				};
				if haystack == *needle {
					return Some((MatchType::ExactName, 100));
				}
				let stem = haystack.rsplit_once('.').map_or(haystack.as_str(), |(stem, _)| stem);
				if stem == needle {
					return Some((MatchType::ExactName, 95));
				}
				if haystack.starts_with(needle.as_str()) {
					return Some((MatchType::ExactName, 90));
				}
				if haystack.contains(needle.as_str()) {
					return Some((MatchType::ExactName, 75));
				}
				let threshold = (*fuzzy_threshold)?;
				let score = fuzzy_score(needle, &haystack)?;
				(score >= threshold).then_some((MatchType::FuzzyName, score))
			}
		}
	}
}

/// Score `needle` as an in-order subsequence of `haystack`.
///
/// Coverage of the haystack and runs of adjacent matched characters both raise
/// the score. Returns `None` when some needle character cannot be placed.
pub(crate) fn fuzzy_score(needle: &str, haystack: &str) -> Option<u8> {
	let needle: Vec<char> = needle.chars().collect();
	if needle.is_empty() {
		return None;
	}

	let mut positions = Vec::with_capacity(needle.len());
	let mut wanted = needle.iter().peekable();
	for (index, ch) in haystack.chars().enumerate() {
		if wanted.peek().is_some_and(|&&next| next == ch) {
			positions.push(index);
			wanted.next();
		}
	}
	if wanted.peek().is_some() {
		return None;
	}

	let haystack_len = haystack.chars().count().max(1);
	let coverage = needle.len() as f64 / haystack_len as f64;
	let adjacency = if needle.len() > 1 {
		let adjacent = positions.windows(2).filter(|pair| pair[1] == pair[0] + 1).count();
		adjacent as f64 / (needle.len() - 1) as f64
	} else {
		1.0
	};
	let leading = if positions.first() == Some(&0) { 1.0 } else { 0.0 };

	let score = 35.0 * coverage + 45.0 * adjacency + 10.0 * leading;
	Some(score.round().clamp(0.0, 90.0) as u8)
}

/// Compiled form of a query's content pattern.
#[derive(Debug)]
pub(crate) struct ContentMatcher {
	regex: Regex,
}

impl ContentMatcher {
	pub(crate) fn compile(pattern: &str, options: &SearchOptions) -> Result<Self, BackendError> {
		let source = if options.use_regex {
			pattern.to_string()
		} else {
			regex::escape(pattern)
		};
		let regex = RegexBuilder::new(&source)
			.case_insensitive(!options.case_sensitive)
			.build()
			.map_err(|err| rejected("content", pattern, err))?;
		Ok(Self { regex })
	}

	/// Every matching line of `text`, 1-based.
	///
	/// Offsets are byte positions of the first hit inside `line_content`, so
	/// `line_content[match_start..match_end]` is always in bounds.
	pub(crate) fn scan(&self, text: &str) -> Vec<LineMatch> {
		text.lines()
			.enumerate()
			.filter_map(|(index, line)| {
				let found = self.regex.find(line)?;
				let (line_content, match_start, match_end) =
					excerpt(line, found.start(), found.end());
				Some(LineMatch {
					line_number: index + 1,
					line_content,
					match_start,
					match_end,
				})
			})
			.take(MAX_LINE_MATCHES)
			.collect()
	}
}

/// Cut `line` to at most [`MAX_LINE_CHARS`] characters around the hit at
/// `start..end`, then rebase and clamp the hit to the excerpt.
fn excerpt(line: &str, start: usize, end: usize) -> (String, usize, usize) {
	let total = line.chars().count();
	let (from, to) = if total <= MAX_LINE_CHARS {
		(0, line.len())
	} else {
		let start_char = line[..start].chars().count();
		let hit_chars = line[start..end].chars().count();
		let slack = MAX_LINE_CHARS.saturating_sub(hit_chars) / 2;
		let first = start_char.saturating_sub(slack).min(total - MAX_LINE_CHARS);
		(byte_at(line, first), byte_at(line, first + MAX_LINE_CHARS))
	};

	let content = line[from..to].trim_end();
	let len = content.len();
	let match_start = start.saturating_sub(from).min(len);
	let match_end = end.saturating_sub(from).clamp(match_start, len);
	(content.to_string(), match_start, match_end)
}

fn byte_at(line: &str, char_index: usize) -> usize {
	line.char_indices()
		.nth(char_index)
		.map_or(line.len(), |(at, _)| at)
}

/// Score for a content hit: more matching lines rank higher.
pub(crate) fn content_score(matches: usize) -> u8 {
	let bonus = matches.saturating_sub(1).min(4) * 10;
	(50 + bonus) as u8
}
