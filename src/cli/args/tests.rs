use clap::{CommandFactory, Parser};

use super::*;

#[test]
fn command_definition_is_consistent() {
	CliArgs::command().debug_assert();
}

#[test]
fn bare_invocation_has_no_command() {
	let parsed = CliArgs::parse_from(["trawl"]);
	assert!(parsed.command.is_none());
	assert_eq!(parsed.output, OutputFormat::Plain);
	assert_eq!(parsed.verbose, 0);
}

#[test]
fn search_flags_build_the_query() {
	let parsed = CliArgs::parse_from([
		"trawl",
		"search",
		"/srv/code",
		"--name",
		"*.ts",
		"--ext",
		"ts,tsx",
		"--no-fuzzy",
		"--max-results",
		"10",
		"--min-size",
		"2",
		"--size-unit",
		"kb",
		"--after",
		"2024-01-01",
		"-vv",
		"-o",
		"json",
	]);
	assert_eq!(parsed.verbose, 2);
	assert_eq!(parsed.output, OutputFormat::Json);

	let Some(Command::Search(args)) = parsed.command else {
		panic!("expected search command");
	};
	let query = args.query.to_query();
	assert_eq!(query.root_path, "/srv/code");
	assert_eq!(query.name_pattern.as_deref(), Some("*.ts"));
	assert!(!query.options.use_fuzzy);
	assert_eq!(query.options.max_results, Some(10));
	assert_eq!(
		query.file_type_filter.unwrap().extensions,
		vec!["ts".to_string(), "tsx".to_string()]
	);
	let size = query.size_filter.unwrap();
	assert_eq!(size.min_size, Some(2));
	assert_eq!(size.unit, SizeUnit::Kilobytes);
	let dates = query.date_filter.unwrap();
	assert!(dates.start_date.is_some());
	assert!(dates.end_date.is_none());
}

#[test]
fn view_flags_translate_to_engine_values() {
	let parsed = CliArgs::parse_from([
		"trawl", "history", "rerun", "abc", "--page", "3", "--sort", "name", "--asc", "--filter",
		"main",
	]);
	let Some(Command::History {
		action: HistoryAction::Rerun { id, view },
	}) = parsed.command
	else {
		panic!("expected history rerun");
	};
	assert_eq!(id, "abc");
	assert_eq!(view.page_index(), 2);
	assert_eq!(view.sort, Some(SortKey::Name));
	assert_eq!(view.order(), SortOrder::Ascending);
	assert_eq!(view.filter().unwrap().text.as_deref(), Some("main"));
}

#[test]
fn empty_view_flags_mean_no_filter() {
	let view = ViewArgs::default();
	assert!(view.filter().is_none());
	assert_eq!(view.order(), SortOrder::Descending);
	assert_eq!(view.page_index(), 0);
}

#[test]
fn asc_and_desc_conflict() {
	let result = CliArgs::try_parse_from(["trawl", "search", "/a", "--asc", "--desc"]);
	assert!(result.is_err());
}

#[test]
fn global_settings_flags_parse_after_subcommands() {
	let parsed = CliArgs::parse_from([
		"trawl",
		"saved",
		"list",
		"--page-size",
		"25",
		"--render-mode",
		"virtualized",
	]);
	assert_eq!(parsed.page_size, Some(25));
	assert_eq!(parsed.render_mode, Some(RenderModeArg::Virtualized));
}
