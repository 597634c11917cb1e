use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use gitslim::manifest::{read_file_list, AllowListSource};
use gitslim::paths::resolve_root;
use gitslim::report::{failure_line, root_name, root_summary, Totals};
use gitslim::selection::Selection;
use gitslim::{prune_with, MarkerPattern, PruneEvent, PruneOptions, Removal, SlimConfig};
use indicatif::{ProgressBar, ProgressStyle};
use path_absolutize::Absolutize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prune installed source trees down to their declared files",
    long_about = None
)]
struct Args {
    /// Root directories to prune
    #[arg(required = true)]
    roots: Vec<PathBuf>,

    /// Path, relative to each root, that must survive (repeatable)
    #[arg(long, short = 'k', value_name = "PATH")]
    keep: Vec<PathBuf>,

    /// Read allowed paths from a file, one per line ('-' reads stdin)
    #[arg(long, short = 'f', value_name = "FILE")]
    files_from: Vec<PathBuf>,

    /// Keep the files git tracks in each root
    #[arg(long)]
    git: bool,

    /// Extra root-level marker pattern that always survives, e.g. 'LICENSE*'
    #[arg(long, short = 'm', value_name = "PATTERN")]
    marker: Vec<String>,

    /// Only prune roots strictly below this directory
    #[arg(long, value_name = "DIR")]
    base: Option<PathBuf>,

    /// Prune roots even when no allowed files are declared
    #[arg(long)]
    allow_empty: bool,

    /// Configuration file, replacing the built-in defaults
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show what would be removed, but don't delete anything
    #[arg(long, short = 'n')]
    dry_run: bool,

    /// Show every removed entry and debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_options(args: &Args, config: &SlimConfig) -> Result<PruneOptions> {
    let mut markers = config.marker_set()?;
    for pattern in &args.marker {
        let pattern = MarkerPattern::new(pattern)
            .with_context(|| format!("Invalid --marker pattern '{}'", pattern))?;
        markers.push(pattern);
    }
    Ok(PruneOptions {
        markers,
        dry_run: args.dry_run,
    })
}

fn build_source(args: &Args) -> Result<AllowListSource> {
    let mut listed = Vec::new();
    for list in &args.files_from {
        listed.extend(read_file_list(list)?);
    }
    Ok(AllowListSource {
        inline: args.keep.clone(),
        listed,
        git: args.git,
    })
}

fn slim_roots(args: &Args) -> Result<()> {
    let config = SlimConfig::load(args.config.as_deref())?;
    let options = build_options(args, &config)?;
    let source = build_source(args)?;

    let base = match args.base.as_ref().or(config.selection.base.as_ref()) {
        Some(base) => Some(
            base.absolutize()
                .with_context(|| format!("Failed to resolve base {}", base.display()))?
                .to_path_buf(),
        ),
        None => None,
    };
    let selection = Selection {
        base: base.as_deref(),
        allow_empty: args.allow_empty || config.selection.allow_empty,
    };

    println!("Slimming {} tree(s)...", args.roots.len());
    if args.verbose {
        let names: Vec<&str> = options.markers.patterns().iter().map(|p| p.as_str()).collect();
        if names.is_empty() {
            println!("Markers: none");
        } else {
            println!("Markers: {}", names.join(", "));
        }
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    progress.enable_steady_tick(Duration::from_millis(100));

    let mut totals = Totals::default();
    let mut failed = 0usize;

    for root_arg in &args.roots {
        let root = match resolve_root(root_arg) {
            Ok(root) => root,
            Err(err) => {
                progress.suspend(|| eprintln!("{} {}", "Error:".red().bold(), err));
                failed += 1;
                continue;
            }
        };

        let allowed = match source.collect(&root) {
            Ok(allowed) => allowed,
            Err(err) => {
                progress.suspend(|| eprintln!("{} {:#}", "Error:".red().bold(), err));
                failed += 1;
                continue;
            }
        };

        if let Err(skip) = selection.check(&root, allowed.len()) {
            progress.suspend(|| println!("Skipping {}: {}", root.display(), skip.reason()));
            continue;
        }

        let name = root_name(&root);
        progress.set_message(format!("Slimming {}", name));

        let mut report_entry = |event: &PruneEvent<'_>| {
            if !(args.verbose || args.dry_run) || !event.outcome.is_removed() {
                return;
            }
            let kind = match event.outcome {
                Removal::Directory => "directory",
                _ => "file",
            };
            let verb = if args.dry_run { "Would remove" } else { "Removed" };
            progress.suspend(|| println!("{} {}: {}", verb, kind, event.path.display()));
        };

        let result = match prune_with(&root, &allowed, &options, &mut report_entry) {
            Ok(result) => result,
            Err(err) => {
                progress.suspend(|| eprintln!("{} {}", "Error:".red().bold(), err));
                failed += 1;
                continue;
            }
        };

        progress.suspend(|| {
            if let Some(line) = root_summary(&name, &result) {
                println!("{}", line.yellow());
            }
            if !result.failures.is_empty() {
                println!(
                    "  {}",
                    format!("{} entries could not be removed", result.failures.len()).red()
                );
                for failure in &result.failures {
                    println!("    {}", failure_line(failure).red());
                }
            }
        });
        totals.add(&result);
    }

    progress.finish_and_clear();

    if totals.roots == 0 {
        if failed == 0 {
            println!("No eligible trees found.");
        }
    } else {
        println!("{}", totals.summary(args.dry_run).bold());
        if args.dry_run {
            println!("Dry run mode: No files were deleted.");
        }
    }

    if failed > 0 {
        bail!("{} root(s) could not be slimmed", failed);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    slim_roots(&args)
}
