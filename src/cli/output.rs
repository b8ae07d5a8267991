use std::fmt::Write;

use anyhow::Result;
use serde::Serialize;
use trawl::{RenderMode, SavedSearch, SearchHistoryEntry, SearchQuery, SearchStatus};

use crate::workflow::SearchReport;

/// One-line summary of a query: root plus whichever patterns are set.
fn describe_query(query: &SearchQuery) -> String {
	let mut text = query.root_path.clone();
	if let Some(name) = &query.name_pattern {
		let _ = write!(text, " name={name}");
	}
	if let Some(content) = &query.content_pattern {
		let _ = write!(text, " content={content}");
	}
	if let Some(types) = &query.file_type_filter
		&& !types.extensions.is_empty()
	{
		let _ = write!(text, " ext={}", types.extensions.join(","));
	}
	text
}

pub(crate) fn format_report_plain(report: &SearchReport) -> String {
	let mut out = String::new();

	for result in &report.results {
		let _ = writeln!(out, "{:>3}  {}", result.relevance_score, result.path);
		for line in result.matches.iter().flatten() {
			let _ = writeln!(out, "       {}: {}", line.line_number, line.line_content.trim());
		}
	}

	let _ = writeln!(
		out,
		"{} of {} results, page {}/{} ({}, {})",
		report.matching,
		report.total_results,
		report.page,
		report.total_pages.max(1),
		match report.render_mode {
			RenderMode::Paginated => "paginated",
			RenderMode::Virtualized => "virtualized",
		},
		report.status,
	);
	if report.status == SearchStatus::Error
		&& let Some(error) = &report.error
	{
		let _ = writeln!(out, "error: {error}");
	}
	out
}

pub(crate) fn format_history_plain(entries: &[SearchHistoryEntry]) -> String {
	if entries.is_empty() {
		return "No search history\n".to_string();
	}
	let mut out = String::new();
	for entry in entries {
		let _ = writeln!(
			out,
			"{}  {}  {}",
			entry.id,
			entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
			describe_query(&entry.query)
		);
	}
	out
}

pub(crate) fn format_saved_plain<'a>(entries: impl IntoIterator<Item = &'a SavedSearch>) -> String {
	let mut out = String::new();
	for entry in entries {
		let _ = write!(
			out,
			"{}  {}  uses={}  {}",
			entry.id,
			entry.name,
			entry.use_count,
			describe_query(&entry.query)
		);
		if !entry.tags.is_empty() {
			let _ = write!(out, "  [{}]", entry.tags.join(", "));
		}
		out.push('\n');
	}
	if out.is_empty() {
		out.push_str("No saved searches\n");
	}
	out
}

/// Pretty JSON for any printable payload.
pub(crate) fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
	Ok(serde_json::to_string_pretty(value)?)
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
	println!("{}", format_json(value)?);
	Ok(())
}

pub(crate) fn print_plain(text: &str) {
	print!("{text}");
}

#[cfg(test)]
mod tests {
	use serde_json::Value;
	use trawl::{LineMatch, MatchType, SearchId, SearchResult};

	use super::*;

	fn report() -> SearchReport {
		let result = SearchResult::new("/a/main.rs", MatchType::Content, 70).with_matches(vec![
			LineMatch {
				line_number: 2,
				line_content: "    // TODO".into(),
				match_start: 7,
				match_end: 11,
			},
		]);
		SearchReport {
			search_id: SearchId::from("search-1"),
			status: SearchStatus::Completed,
			query: SearchQuery::new("/a").with_content_pattern("TODO"),
			total_results: 1,
			matching: 1,
			page: 1,
			total_pages: 1,
			page_size: 50,
			render_mode: RenderMode::Paginated,
			elapsed_ms: Some(3),
			error: None,
			results: vec![result],
		}
	}

	#[test]
	fn plain_report_lists_hits_and_lines() {
		let text = format_report_plain(&report());
		assert!(text.contains(" 70  /a/main.rs"));
		assert!(text.contains("2: // TODO"));
		assert!(text.contains("1 of 1 results, page 1/1 (paginated, completed)"));
	}

	#[test]
	fn json_report_uses_camel_case() {
		let json = format_json(&report()).unwrap();
		let value: Value = serde_json::from_str(&json).unwrap();
		assert_eq!(value["searchId"], "search-1");
		assert_eq!(value["status"], "completed");
		assert_eq!(value["renderMode"], "paginated");
		assert_eq!(value["results"][0]["matchType"], "content");
		assert_eq!(value["query"]["contentPattern"], "TODO");
	}

	#[test]
	fn empty_listings_say_so() {
		assert_eq!(format_history_plain(&[]), "No search history\n");
		assert_eq!(format_saved_plain([]), "No saved searches\n");
	}
}
