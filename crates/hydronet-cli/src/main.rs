//! `hydronet`: inspect and replay persisted worktrees

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod demo;

use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::CliConfig;
use hydronet_store::{HydraulicModel, ModelStore};
use hydronet_worktree::{BranchSummary, Worktree, WorktreeConfig, WorktreeLayout};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let layout_arg = Arg::new("layout")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Persisted worktree (JSON)");

    Command::new("hydronet")
        .version(hydronet_worktree::VERSION)
        .about("Scenario branches for hydraulic network models")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("inspect")
                .about("List branches of a persisted worktree")
                .arg(layout_arg.clone())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Materialize one branch and report the resulting document")
                .arg(layout_arg)
                .arg(
                    Arg::new("branch")
                        .long("branch")
                        .default_value("main")
                        .help("Branch name to switch to"),
                ),
        )
        .subcommand(
            Command::new("demo")
                .about("Run the built-in scenario walkthrough")
                .arg(
                    Arg::new("save")
                        .long("save")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the resulting worktree to this path"),
                ),
        )
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

fn open(path: &Path, config: WorktreeConfig) -> Result<(Worktree, HydraulicModel)> {
    let layout = WorktreeLayout::load(path).with_context(|| format!("loading {}", path.display()))?;
    let mut store = HydraulicModel::new();
    let worktree = Worktree::from_layout(layout, &mut store, config)?;
    tracing::debug!(path = %path.display(), branches = worktree.branch_count(), "opened worktree");
    Ok((worktree, store))
}

fn print_summaries(summaries: &[BranchSummary]) {
    for summary in summaries {
        let marker = if summary.is_active { '*' } else { ' ' };
        println!(
            "{marker} {:<24} deltas={:<4} puts={:<4} deletes={:<4} pointer={}{}",
            summary.name,
            summary.stats.deltas,
            summary.stats.puts,
            summary.stats.deletes,
            summary.pointer,
            if summary.has_draft { " (draft)" } else { "" },
        );
    }
}

fn print_document(worktree: &Worktree, store: &HydraulicModel) -> Result<()> {
    let branch = worktree.active_branch()?;
    println!("Branch:      {}", branch.name);
    println!("Elements:    {}", store.asset_count());
    println!("Version:     {}", store.model_version());
    println!("Fingerprint: {}", store.fingerprint()?);
    Ok(())
}

fn inspect(args: &ArgMatches, config: WorktreeConfig) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("layout")
        .ok_or_else(|| anyhow!("layout path required"))?;
    let (worktree, _store) = open(path, config)?;
    let summaries = worktree.branches()?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_summaries(&summaries);
    }
    Ok(())
}

fn replay(args: &ArgMatches, config: WorktreeConfig) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("layout")
        .ok_or_else(|| anyhow!("layout path required"))?;
    let name = args
        .get_one::<String>("branch")
        .ok_or_else(|| anyhow!("branch name required"))?;
    let (mut worktree, mut store) = open(path, config)?;

    let target = worktree
        .branch_by_name(name)
        .map(|branch| branch.id.clone())
        .ok_or_else(|| anyhow!("no branch named '{name}'"))?;
    let outcome = worktree.switch_branch(&mut store, &target)?;
    if outcome.changed() {
        println!("Replayed:    {} deltas", outcome.replayed);
    }
    print_document(&worktree, &store)
}

fn run_demo(args: &ArgMatches, config: WorktreeConfig) -> Result<()> {
    let (worktree, store) = demo::run(config)?;
    print_summaries(&worktree.branches()?);
    print_document(&worktree, &store)?;

    if let Some(path) = args.get_one::<PathBuf>("save") {
        worktree.to_layout(&store).save(path)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = CliConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    init_tracing(&config.log_level, matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("inspect", args)) => inspect(args, config.worktree),
        Some(("replay", args)) => replay(args, config.worktree),
        Some(("demo", args)) => run_demo(args, config.worktree),
        _ => Ok(()),
    }
}
