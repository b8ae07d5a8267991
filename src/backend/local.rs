use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::matcher::{ContentMatcher, NameMatcher, content_score};
use crate::gateway::{BackendError, BackendEvent, EventSink, SearchBackend};
use crate::model::{DateType, LineMatch, MatchType, SearchQuery, SearchResult};
use crate::session::SearchId;

/// Files larger than this are never scanned for content.
const MAX_CONTENT_BYTES: u64 = 8 * 1024 * 1024;
/// Leading bytes inspected for NUL when deciding whether a file is binary.
const BINARY_SNIFF_BYTES: usize = 8 * 1024;

/// Filesystem backend: one worker thread per search.
#[derive(Debug, Default)]
pub struct LocalBackend {
	cancel_flags: HashMap<SearchId, Arc<AtomicBool>>,
}

impl LocalBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Searches whose workers have not yet exited.
	pub fn in_flight(&self) -> usize {
		self.cancel_flags
			.values()
			.filter(|flag| Arc::strong_count(flag) > 1)
			.count()
	}

	fn prune_finished(&mut self) {
		self.cancel_flags.retain(|_, flag| Arc::strong_count(flag) > 1);
	}
}

impl SearchBackend for LocalBackend {
	fn start(&mut self, query: &SearchQuery, sink: EventSink) -> Result<SearchId, BackendError> {
		self.prune_finished();

		let root = PathBuf::from(&query.root_path);
		if !root.is_dir() {
			return Err(BackendError::Rejected(format!(
				"search root {} is not a readable directory",
				root.display()
			)));
		}
		let plan = SearchPlan::compile(query, root)?;

		let id = SearchId::new(Uuid::new_v4().to_string());
		let cancelled = Arc::new(AtomicBool::new(false));
		self.cancel_flags.insert(id.clone(), Arc::clone(&cancelled));

		let worker_id = id.clone();
		thread::Builder::new()
			.name(format!("trawl-search-{id}"))
			.spawn(move || plan.run(&worker_id, &sink, &cancelled))
			.map_err(|err| BackendError::Unavailable(format!("failed to spawn search worker: {err}")))?;

		Ok(id)
	}

	fn cancel(&mut self, id: &SearchId) -> Result<(), BackendError> {
		let flag = self
			.cancel_flags
			.remove(id)
			.ok_or_else(|| BackendError::UnknownSearch(id.clone()))?;
		flag.store(true, Ordering::Relaxed);
		Ok(())
	}
}

/// Everything a worker needs, compiled up front so bad patterns fail `start`.
struct SearchPlan {
	root: PathBuf,
	query: SearchQuery,
	name: Option<NameMatcher>,
	content: Option<ContentMatcher>,
}

/// Why a worker stopped walking.
enum Stop {
	Exhausted,
	Limit,
	Abandoned,
	Failed(String),
}

impl SearchPlan {
	fn compile(query: &SearchQuery, root: PathBuf) -> Result<Self, BackendError> {
		let name = query
			.name_pattern
			.as_deref()
			.filter(|pattern| !pattern.is_empty())
			.map(|pattern| NameMatcher::compile(pattern, &query.options))
			.transpose()?;
		let content = query
			.content_pattern
			.as_deref()
			.filter(|pattern| !pattern.is_empty())
			.map(|pattern| ContentMatcher::compile(pattern, &query.options))
			.transpose()?;
		Ok(Self {
			root,
			query: query.clone(),
			name,
			content,
		})
	}

	fn run(self, id: &SearchId, sink: &EventSink, cancelled: &AtomicBool) {
		debug!(search = %id, root = %self.root.display(), "local search started");
		let mut sent = 0usize;
		let stop = self.walk(sink, cancelled, &mut sent);

		match stop {
			Stop::Abandoned => debug!(search = %id, sent, "local search abandoned"),
			Stop::Exhausted | Stop::Limit => {
				info!(search = %id, sent, "local search finished");
				sink.send(BackendEvent::Complete);
			}
			Stop::Failed(message) => {
				warn!(search = %id, sent, error = %message, "local search failed");
				sink.send(BackendEvent::Error(message));
			}
		}
	}

	fn walk(&self, sink: &EventSink, cancelled: &AtomicBool, sent: &mut usize) -> Stop {
		if let Err(err) = fs::read_dir(&self.root) {
			return Stop::Failed(format!(
				"cannot read search root {}: {err}",
				self.root.display()
			));
		}

		let options = &self.query.options;
		let walker = WalkBuilder::new(&self.root)
			.hidden(!options.include_hidden)
			.follow_links(options.follow_symlinks)
			.max_depth(options.max_depth)
			.git_ignore(true)
			.git_exclude(true)
			.ignore(true)
			.parents(true)
			.build();

		for entry in walker {
			if cancelled.load(Ordering::Relaxed) {
				return Stop::Abandoned;
			}
			if options.max_results.is_some_and(|limit| *sent >= limit) {
				return Stop::Limit;
			}

			let entry = match entry {
				Ok(entry) => entry,
				Err(err) if err.depth() == Some(0) => {
					return Stop::Failed(format!(
						"cannot read search root {}: {err}",
						self.root.display()
					));
				}
				Err(err) => {
					trace!(error = %err, "skipping unreadable entry");
					continue;
				}
			};
			if entry.depth() == 0 {
				continue;
			}
			let Some(file_type) = entry.file_type() else {
				continue;
			};

			let result = if file_type.is_dir() {
				self.match_directory(entry.path())
			} else if file_type.is_file() {
				self.match_file(entry.path())
			} else {
				None
			};

			if let Some(result) = result {
				if !sink.send(BackendEvent::Result(result)) {
					return Stop::Abandoned;
				}
				*sent += 1;
			}
		}

		Stop::Exhausted
	}

	/// Directories only match a bare name search.
	fn match_directory(&self, path: &Path) -> Option<SearchResult> {
		let typed = self
			.query
			.file_type_filter
			.as_ref()
			.is_some_and(|filter| !filter.is_empty());
		if self.content.is_some() || typed {
			return None;
		}
		let name = file_name(path)?;
		let (_, score) = self.name.as_ref()?.score(&name)?;
		Some(SearchResult::new(path.display().to_string(), MatchType::Directory, score))
	}

	fn match_file(&self, path: &Path) -> Option<SearchResult> {
		let name = file_name(path)?;

		let extension_filtered = match &self.query.file_type_filter {
			Some(filter) if !filter.is_empty() => {
				let extension = path.extension()?.to_string_lossy().to_string();
				if !filter.accepts(&extension) {
					return None;
				}
				true
			}
			_ => false,
		};

		let name_match = match &self.name {
			Some(matcher) => Some(matcher.score(&name)?),
			None => None,
		};

		let metadata = fs::metadata(path).ok()?;
		if let Some(size) = &self.query.size_filter
			&& !size.contains(metadata.len())
		{
			return None;
		}
		if let Some(dates) = &self.query.date_filter {
			let stamp = match dates.date_type {
				DateType::Modified => metadata.modified(),
				DateType::Created => metadata.created(),
				DateType::Accessed => metadata.accessed(),
			};
			let stamp: DateTime<Utc> = stamp.ok()?.into();
			if !dates.contains(stamp) {
				return None;
			}
		}

		let mut result = match (&self.content, name_match) {
			(Some(content), name_match) => {
				let matches = scan_file(content, path, metadata.len())?;
				let score = match name_match {
					Some((_, name_score)) => name_score.max(content_score(matches.len())),
					None => content_score(matches.len()),
				};
				let snippet = matches[0].line_content.trim().to_string();
				SearchResult::new(path.display().to_string(), MatchType::Content, score)
					.with_snippet(snippet)
					.with_matches(matches)
			}
			(None, Some((kind, score))) => SearchResult::new(path.display().to_string(), kind, score),
			(None, None) if extension_filtered => {
				SearchResult::new(path.display().to_string(), MatchType::Extension, 60)
			}
			(None, None) => SearchResult::new(path.display().to_string(), MatchType::ExactName, 50),
		};

		result = result.with_size(metadata.len());
		if let Ok(modified) = metadata.modified() {
			result = result.with_modified(modified.into());
		}
		Some(result)
	}
}

fn file_name(path: &Path) -> Option<String> {
	path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Scan a text file, returning `None` for binary, oversized, unreadable or
/// non-matching files.
fn scan_file(matcher: &ContentMatcher, path: &Path, len: u64) -> Option<Vec<LineMatch>> {
	if len > MAX_CONTENT_BYTES {
		return None;
	}
	let bytes = fs::read(path).ok()?;
	let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
	if sniff.contains(&0) {
		return None;
	}
	let text = String::from_utf8_lossy(&bytes);
	let matches = matcher.scan(&text);
	(!matches.is_empty()).then_some(matches)
}
