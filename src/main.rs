mod cli;
mod settings;
mod workflow;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use cli::{
	Command, HistoryAction, OutputFormat, SavedAction, format_history_plain, format_report_plain,
	format_saved_plain, parse_cli, print_help, print_json, print_plain,
};
use settings::ResolvedConfig;
use trawl::{
	FileStore, LocalBackend, NewSavedSearch, SearchFacade, SearchStatus, logging,
};
use workflow::{SearchReport, SearchWorkflow};

fn main() -> Result<()> {
	let cli = parse_cli();
	logging::initialize(cli.verbose);

	let resolved = settings::load(&cli)?;

	if cli.print_config {
		resolved.print_summary();
		if cli.command.is_none() {
			return Ok(());
		}
	}

	let Some(command) = cli.command else {
		print_help()?;
		return Ok(());
	};

	let mut workflow = open_workflow(&resolved)?;
	run_command(&mut workflow, command, cli.output)
}

/// Build the facade over the local filesystem backend and the on-disk store.
fn open_workflow(config: &ResolvedConfig) -> Result<SearchWorkflow<LocalBackend>> {
	let store = FileStore::open(&config.data_dir).with_context(|| {
		format!(
			"failed to open the data directory {}",
			config.data_dir.display()
		)
	})?;
	let facade = SearchFacade::new(LocalBackend::new(), Arc::new(store), config.engine.clone())?;
	Ok(SearchWorkflow::new(facade))
}

fn run_command(
	workflow: &mut SearchWorkflow<LocalBackend>,
	command: Command,
	format: OutputFormat,
) -> Result<()> {
	match command {
		Command::Search(args) => {
			let report = workflow.search(args.query.to_query(), &args.view)?;
			emit_report(&report, format)
		}
		Command::History { action } => match action {
			HistoryAction::List => {
				let entries = workflow.facade().history();
				match format {
					OutputFormat::Plain => print_plain(&format_history_plain(entries)),
					OutputFormat::Json => print_json(entries)?,
				}
				Ok(())
			}
			HistoryAction::Clear => {
				workflow.facade_mut().clear_history();
				Ok(())
			}
			HistoryAction::Remove { id } => {
				workflow.facade_mut().remove_history(&id)?;
				Ok(())
			}
			HistoryAction::Rerun { id, view } => {
				let report = workflow.rerun_history(&id, &view)?;
				emit_report(&report, format)
			}
		},
		Command::Saved { action } => match action {
			SavedAction::List { tag } => {
				let registry = workflow.facade().saved_registry();
				let entries: Vec<_> = match tag.as_deref() {
					Some(tag) => registry.find_by_tag(tag).collect(),
					None => registry.entries().iter().collect(),
				};
				match format {
					OutputFormat::Plain => print_plain(&format_saved_plain(entries)),
					OutputFormat::Json => print_json(&entries)?,
				}
				Ok(())
			}
			SavedAction::Add {
				label,
				description,
				tags,
				query,
			} => {
				let mut new = NewSavedSearch::new(label, query.to_query()).with_tags(tags);
				if let Some(description) = description {
					new = new.with_description(description);
				}
				let saved = workflow.facade_mut().save_search(new)?;
				match format {
					OutputFormat::Plain => println!("{}", saved.id),
					OutputFormat::Json => print_json(saved)?,
				}
				Ok(())
			}
			SavedAction::Remove { id } => {
				workflow.facade_mut().remove_saved(&id)?;
				Ok(())
			}
			SavedAction::Use { id, view } => {
				let report = workflow.use_saved(&id, &view)?;
				emit_report(&report, format)
			}
			SavedAction::Clear => {
				workflow.facade_mut().clear_saved();
				Ok(())
			}
		},
	}
}

/// Print a finished search and turn a failed one into a non-zero exit.
fn emit_report(report: &SearchReport, format: OutputFormat) -> Result<()> {
	match format {
		OutputFormat::Plain => print_plain(&format_report_plain(report)),
		OutputFormat::Json => print_json(report)?,
	}

	if report.status == SearchStatus::Error {
		bail!(
			"search {} failed: {}",
			report.search_id,
			report.error.as_deref().unwrap_or("unknown error")
		);
	}
	Ok(())
}
