use std::fmt::Write;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{
	ArgAction, Args, ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use trawl::app_dirs;
use trawl::{
	DateFilter, DateType, FileCategory, FileTypeFilter, ResultFilter, SearchOptions, SearchQuery,
	SizeFilter, SizeUnit, SortKey, SortOrder,
};

/// Produce the full version banner including config and data directories.
fn long_version() -> &'static str {
	let config_dir = match app_dirs::get_config_dir() {
		Ok(path) => path.display().to_string(),
		Err(err) => format!("unavailable ({err})"),
	};
	let data_dir = match app_dirs::get_data_dir() {
		Ok(path) => path.display().to_string(),
		Err(err) => format!("unavailable ({err})"),
	};

	let mut details = format!("trawl {}", env!("CARGO_PKG_VERSION"));
	let _ = writeln!(details);
	let _ = writeln!(details, "config directory: {config_dir}");
	let _ = writeln!(details, "data directory: {data_dir}");

	Box::leak(details.into_boxed_str())
}

fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().effects(Effects::BOLD))
		.usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Yellow.on_default())
}

/// Parse command line arguments into [`CliArgs`], exiting on error.
pub(crate) fn parse_cli() -> CliArgs {
	let mut matches = CliArgs::command().get_matches();
	CliArgs::from_arg_matches_mut(&mut matches).unwrap_or_else(|err| err.exit())
}

/// Print the top-level help text.
pub(crate) fn print_help() -> std::io::Result<()> {
	CliArgs::command().print_help()
}

#[derive(Parser, Debug)]
#[command(
	name = "trawl",
	version,
	long_version = long_version(),
	about = "Stream file-search results into paginated sessions with history and saved searches",
	color = ColorChoice::Auto,
	styles = cli_styles()
)]
pub(crate) struct CliArgs {
	#[arg(
		short,
		long = "config",
		value_name = "FILE",
		env = "TRAWL_CONFIG",
		action = ArgAction::Append,
		global = true,
		help = "Additional configuration file to merge (default: none)"
	)]
	pub(crate) config: Vec<PathBuf>,
	#[arg(
		short = 'n',
		long = "no-config",
		global = true,
		help = "Skip loading default configuration files"
	)]
	pub(crate) no_config: bool,
	#[arg(
		short,
		long,
		action = ArgAction::Count,
		global = true,
		help = "Increase log verbosity (repeatable; TRAWL_LOG overrides)"
	)]
	pub(crate) verbose: u8,
	#[arg(
		long = "print-config",
		global = true,
		help = "Print the effective configuration"
	)]
	pub(crate) print_config: bool,
	#[arg(
		long = "page-size",
		value_name = "N",
		global = true,
		help = "Results per page (default: 50)"
	)]
	pub(crate) page_size: Option<usize>,
	#[arg(
		long = "virtualize-threshold",
		value_name = "N",
		global = true,
		help = "Result count at which automatic rendering virtualizes (default: 500)"
	)]
	pub(crate) virtualize_threshold: Option<usize>,
	#[arg(
		long = "render-mode",
		value_enum,
		global = true,
		help = "Force a presentation mode (default: auto)"
	)]
	pub(crate) render_mode: Option<RenderModeArg>,
	#[arg(
		long = "history-limit",
		value_name = "N",
		global = true,
		help = "History entries to keep, at most 50 (default: 50)"
	)]
	pub(crate) history_limit: Option<usize>,
	#[arg(
		long = "data-dir",
		value_name = "PATH",
		global = true,
		help = "Directory for history and saved searches (default: platform data dir)"
	)]
	pub(crate) data_dir: Option<PathBuf>,
	#[arg(
		short = 'o',
		long = "output",
		value_enum,
		default_value_t = OutputFormat::Plain,
		global = true,
		help = "Choose how to print results"
	)]
	pub(crate) output: OutputFormat,
	#[command(subcommand)]
	pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
	/// Run a search and print one page of its results.
	Search(SearchArgs),
	/// Inspect or replay previously executed searches.
	History {
		#[command(subcommand)]
		action: HistoryAction,
	},
	/// Manage named, reusable searches.
	Saved {
		#[command(subcommand)]
		action: SavedAction,
	},
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
	#[command(flatten)]
	pub(crate) query: QueryArgs,
	#[command(flatten)]
	pub(crate) view: ViewArgs,
}

#[derive(Subcommand, Debug)]
pub(crate) enum HistoryAction {
	/// List history, newest first.
	List,
	/// Forget every history entry.
	Clear,
	/// Forget one history entry.
	Remove { id: String },
	/// Run the query of a history entry again.
	Rerun {
		id: String,
		#[command(flatten)]
		view: ViewArgs,
	},
}

#[derive(Subcommand, Debug)]
pub(crate) enum SavedAction {
	/// List saved searches.
	List {
		#[arg(long, value_name = "TAG", help = "Only show searches carrying this tag")]
		tag: Option<String>,
	},
	/// Save a query under a name.
	Add {
		#[arg(value_name = "NAME")]
		label: String,
		#[arg(long, value_name = "TEXT")]
		description: Option<String>,
		#[arg(long, value_name = "TAG", value_delimiter = ',')]
		tags: Vec<String>,
		#[command(flatten)]
		query: QueryArgs,
	},
	/// Delete a saved search.
	Remove { id: String },
	/// Run a saved search, counting the use.
	Use {
		id: String,
		#[command(flatten)]
		view: ViewArgs,
	},
	/// Delete every saved search.
	Clear,
}

/// Flags describing the query sent to the backend.
#[derive(Args, Debug, Clone)]
pub(crate) struct QueryArgs {
	#[arg(value_name = "ROOT", help = "Directory to search")]
	pub(crate) root: PathBuf,
	#[arg(long, value_name = "PATTERN", help = "Match file names (glob, text or regex)")]
	pub(crate) name: Option<String>,
	#[arg(long, value_name = "PATTERN", help = "Match file contents line by line")]
	pub(crate) content: Option<String>,
	#[arg(
		long = "ext",
		value_name = "EXT",
		value_delimiter = ',',
		help = "Only files with these extensions"
	)]
	pub(crate) extensions: Vec<String>,
	#[arg(
		long = "category",
		value_enum,
		value_delimiter = ',',
		help = "Only files in these categories"
	)]
	pub(crate) categories: Vec<CategoryArg>,
	#[arg(long, help = "Treat patterns as regular expressions")]
	pub(crate) regex: bool,
	#[arg(long = "case-sensitive", help = "Match case exactly")]
	pub(crate) case_sensitive: bool,
	#[arg(long = "no-fuzzy", help = "Disable fuzzy name matching")]
	pub(crate) no_fuzzy: bool,
	#[arg(
		long = "fuzzy-threshold",
		value_name = "0-100",
		value_parser = clap::value_parser!(u8).range(0..=100),
		help = "Minimum fuzzy score (default: 60)"
	)]
	pub(crate) fuzzy_threshold: Option<u8>,
	#[arg(long, help = "Include hidden files and directories")]
	pub(crate) hidden: bool,
	#[arg(long = "follow-symlinks", help = "Follow symbolic links")]
	pub(crate) follow_symlinks: bool,
	#[arg(long = "max-results", value_name = "N")]
	pub(crate) max_results: Option<usize>,
	#[arg(long = "max-depth", value_name = "N")]
	pub(crate) max_depth: Option<usize>,
	#[arg(long = "min-size", value_name = "N")]
	pub(crate) min_size: Option<u64>,
	#[arg(long = "max-size", value_name = "N")]
	pub(crate) max_size: Option<u64>,
	#[arg(
		long = "size-unit",
		value_enum,
		default_value_t = SizeUnitArg::B,
		help = "Unit of --min-size and --max-size"
	)]
	pub(crate) size_unit: SizeUnitArg,
	#[arg(
		long = "after",
		value_name = "YYYY-MM-DD",
		value_parser = parse_day,
		help = "Only files modified on or after this day (UTC)"
	)]
	pub(crate) after: Option<NaiveDate>,
	#[arg(
		long = "before",
		value_name = "YYYY-MM-DD",
		value_parser = parse_day,
		help = "Only files modified on or before this day (UTC)"
	)]
	pub(crate) before: Option<NaiveDate>,
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
	NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn start_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
	day.and_hms_opt(0, 0, 0).map(|time| time.and_utc())
}

fn end_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
	day.and_hms_opt(23, 59, 59).map(|time| time.and_utc())
}

impl QueryArgs {
	/// Assemble the backend query. The root is resolved against the working
	/// directory so history entries stay meaningful elsewhere.
	pub(crate) fn to_query(&self) -> SearchQuery {
		let root = std::path::absolute(&self.root).unwrap_or_else(|_| self.root.clone());
		let mut query = SearchQuery::new(root.display().to_string()).with_options(self.options());

		if let Some(name) = &self.name {
			query = query.with_name_pattern(name.clone());
		}
		if let Some(content) = &self.content {
			query = query.with_content_pattern(content.clone());
		}
		if !self.extensions.is_empty() || !self.categories.is_empty() {
			query = query.with_file_types(FileTypeFilter {
				extensions: self.extensions.clone(),
				categories: self.categories.iter().map(|c| c.category()).collect(),
			});
		}
		if self.min_size.is_some() || self.max_size.is_some() {
			query = query.with_size_filter(SizeFilter {
				min_size: self.min_size,
				max_size: self.max_size,
				unit: self.size_unit.unit(),
			});
		}
		if self.after.is_some() || self.before.is_some() {
			query = query.with_date_filter(DateFilter {
				date_type: DateType::Modified,
				start_date: self.after.and_then(start_of_day),
				end_date: self.before.and_then(end_of_day),
			});
		}
		query
	}

	fn options(&self) -> SearchOptions {
		let defaults = SearchOptions::default();
		SearchOptions {
			case_sensitive: self.case_sensitive,
			use_regex: self.regex,
			use_fuzzy: !self.no_fuzzy,
			fuzzy_threshold: self.fuzzy_threshold.unwrap_or(defaults.fuzzy_threshold),
			include_hidden: self.hidden,
			follow_symlinks: self.follow_symlinks,
			max_results: self.max_results,
			max_depth: self.max_depth,
			..defaults
		}
	}
}

/// Flags shaping how a finished search is displayed.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ViewArgs {
	#[arg(long, value_name = "N", default_value_t = 1, help = "Page to print, starting at 1")]
	pub(crate) page: usize,
	#[arg(long, value_name = "KEY", help = "Sort key (default: relevance)")]
	pub(crate) sort: Option<SortKey>,
	#[arg(long, conflicts_with = "desc", help = "Sort ascending")]
	pub(crate) asc: bool,
	#[arg(long, help = "Sort descending (default)")]
	pub(crate) desc: bool,
	#[arg(long = "filter", value_name = "TEXT", help = "Only show results whose name or path contains TEXT")]
	pub(crate) filter: Option<String>,
	#[arg(long = "min-score", value_name = "0-100")]
	pub(crate) min_score: Option<u8>,
}

impl ViewArgs {
	pub(crate) fn order(&self) -> SortOrder {
		if self.asc {
			SortOrder::Ascending
		} else {
			SortOrder::Descending
		}
	}

	/// Zero-based page index.
	pub(crate) fn page_index(&self) -> usize {
		self.page.saturating_sub(1)
	}

	pub(crate) fn filter(&self) -> Option<ResultFilter> {
		let filter = ResultFilter {
			text: self.filter.clone(),
			min_score: self.min_score,
			..ResultFilter::default()
		};
		(!filter.is_empty()).then_some(filter)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
	Plain,
	Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum RenderModeArg {
	Auto,
	Paginated,
	Virtualized,
}

impl RenderModeArg {
	pub(crate) fn as_str(self) -> &'static str {
		match self {
			Self::Auto => "auto",
			Self::Paginated => "paginated",
			Self::Virtualized => "virtualized",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum SizeUnitArg {
	B,
	Kb,
	Mb,
	Gb,
}

impl SizeUnitArg {
	fn unit(self) -> SizeUnit {
		match self {
			Self::B => SizeUnit::Bytes,
			Self::Kb => SizeUnit::Kilobytes,
			Self::Mb => SizeUnit::Megabytes,
			Self::Gb => SizeUnit::Gigabytes,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum CategoryArg {
	Images,
	Documents,
	Audio,
	Video,
	Archives,
	Code,
}

impl CategoryArg {
	fn category(self) -> FileCategory {
		match self {
			Self::Images => FileCategory::Images,
			Self::Documents => FileCategory::Documents,
			Self::Audio => FileCategory::Audio,
			Self::Video => FileCategory::Video,
			Self::Archives => FileCategory::Archives,
			Self::Code => FileCategory::Code,
		}
	}
}

#[cfg(test)]
mod tests;
