mod args;
mod output;

pub(crate) use args::{
	CliArgs, Command, HistoryAction, OutputFormat, SavedAction, ViewArgs, parse_cli, print_help,
};
pub(crate) use output::{
	format_history_plain, format_report_plain, format_saved_plain, print_json, print_plain,
};
