use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use sigscout::{
    check, config::ScanOverrides, scan, Algorithm, Outcome, ScanConfig, ScanReport, Strategy,
};
use std::{num::NonZeroUsize, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliScanConfig {
    /// Directory containing the files to classify
    root: Option<PathBuf>,

    /// Pattern database (one `priority;"signature";"type"` record per line)
    patterns: Option<PathBuf>,

    /// Search algorithm (naive|kmp|rabin-karp)
    #[arg(short, long)]
    algorithm: Option<String>,

    /// Scheduling strategy (per-file|wavefront)
    #[arg(short, long)]
    strategy: Option<String>,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only classify files directly inside the directory
    #[arg(long)]
    no_recursive: bool,

    /// Files to leave out (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Print how long the scan took
    #[arg(short, long)]
    timing: bool,

    /// Print a summary after the results
    #[arg(long)]
    stats: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every file in a directory against a pattern database
    Scan(Box<CliScanConfig>),

    /// Test one signature against a file or the files of a directory
    Check {
        /// File or directory to check
        path: PathBuf,

        /// Signature to look for
        signature: String,

        /// Type name reported when the signature is found
        type_name: String,

        /// Search algorithm (naive|kmp|rabin-karp)
        #[arg(short, long, default_value = "kmp")]
        algorithm: String,

        /// Number of worker threads
        #[arg(short = 'j', long, default_value = "10")]
        threads: NonZeroUsize,

        /// Print how long the check took
        #[arg(short, long)]
        timing: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            let overrides = ScanOverrides {
                root_path: args.root,
                patterns_path: args.patterns,
                algorithm: args.algorithm.as_deref().map(str::parse::<Algorithm>).transpose()?,
                strategy: args.strategy.as_deref().map(str::parse::<Strategy>).transpose()?,
                thread_count: args.threads,
                recursive: args.no_recursive.then_some(false),
                ignore_patterns: args.ignore,
                log_level: args.log_level,
                timing: args.timing.then_some(true),
            };

            let config = ScanConfig::load_from(args.config.as_deref())
                .context("failed to load configuration")?
                .merge_with_cli(overrides);
            init_tracing(&config.log_level);
            debug!("Effective configuration: {:?}", config);

            let report = scan(&config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, config.timing, args.stats);
            }
            Ok(())
        }
        Commands::Check {
            path,
            signature,
            type_name,
            algorithm,
            threads,
            timing,
        } => {
            init_tracing("warn");
            let algorithm: Algorithm = algorithm.parse()?;
            debug!(
                "Checking {} for {:?} with {} on {} threads",
                path.display(),
                signature,
                algorithm,
                threads
            );
            let report = check(&path, signature.as_bytes(), &type_name, algorithm, threads)
                .with_context(|| format!("failed to check {}", path.display()))?;
            if path.is_file() {
                // A single file is answered with its type alone.
                for outcome in &report.outcomes {
                    println!("{}", outcome.outcome);
                }
                print_timing(&report, timing);
            } else {
                print_report(&report, timing, false);
            }
            Ok(())
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_report(report: &ScanReport, timing: bool, stats: bool) {
    for outcome in &report.outcomes {
        match outcome.outcome {
            Outcome::Unreadable(_) | Outcome::Skipped => println!("{}", outcome.to_string().red()),
            _ => println!("{}", outcome),
        }
    }

    if stats {
        println!(
            "\n{} files: {} matched, {} unknown, {} unreadable",
            report.files_scanned.to_string().blue(),
            report.files_matched.to_string().green(),
            report.files_unknown,
            report.files_unreadable.to_string().red()
        );
    }

    print_timing(report, timing);
}

fn print_timing(report: &ScanReport, timing: bool) {
    if timing {
        println!("It took {:.3} seconds", report.elapsed.as_secs_f64());
    }
}
