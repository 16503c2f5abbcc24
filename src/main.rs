use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bareimport::config::{self, RewriteConfig};
use bareimport::driver::{self, DriverOptions};
use bareimport::rewrite::Rewriter;

#[derive(Parser)]
#[command(name = "bareimport")]
#[command(version)]
#[command(about = "Rewrites generated namespace imports into side-effect-only imports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every eligible file under a path
    Rewrite {
        /// File or directory to process (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file (defaults to bareimport.json in the current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Marker function name; repeat for several
        #[arg(short, long = "marker")]
        markers: Vec<String>,

        /// Glob pattern for specifiers to rewrite; repeat for several
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,

        /// Write results back instead of reporting them
        #[arg(short, long)]
        write: bool,

        /// Write a .map file next to every rewritten file
        #[arg(long)]
        source_map: bool,

        /// Refuse rewrites that break the syntax of a file
        #[arg(long)]
        check_syntax: bool,

        /// Also process files under node_modules
        #[arg(long)]
        include_node_modules: bool,

        /// Print the rewritten text of a single file instead of a report
        #[arg(long, conflicts_with = "write")]
        stdout: bool,

        /// Report every rewritten specifier
        #[arg(short, long)]
        verbose: bool,
    },
    /// Validate a config file and print the resolved settings
    CheckConfig {
        /// Config file (defaults to bareimport.json in the current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Some(Commands::Rewrite { verbose: true, .. }));
    init_tracing(verbose);

    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Some(Commands::Rewrite {
            path,
            config,
            markers,
            patterns,
            write,
            source_map,
            check_syntax,
            include_node_modules,
            stdout,
            verbose,
        }) => {
            let mut settings = load_config(config.as_deref())?;
            if !markers.is_empty() {
                settings.markers = markers;
            }
            if !patterns.is_empty() {
                settings.patterns = patterns;
            }
            settings.verbose |= verbose;
            settings.source_maps |= source_map;
            settings.check_syntax |= check_syntax;
            settings.include_node_modules |= include_node_modules;

            let rewriter = Rewriter::from_config(&settings).context("invalid configuration")?;

            if stdout {
                return print_single(&path, &rewriter);
            }

            let options = DriverOptions {
                write,
                ..DriverOptions::from(&settings)
            };
            let summary = driver::run(&path, &rewriter, &options)?;

            for (file, specifiers) in &summary.specifiers {
                println!("{}: {}", file.display(), specifiers.join(", "));
            }
            for (file, reason) in &summary.failed {
                eprintln!("failed: {}: {}", file.display(), reason);
            }
            println!(
                "{} scanned, {} {}, {} unchanged, {} failed",
                summary.scanned,
                summary.rewritten,
                if write { "rewritten" } else { "would be rewritten" },
                summary.unchanged,
                summary.failed.len()
            );

            Ok(if summary.has_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Some(Commands::CheckConfig { config }) => {
            let settings = load_config(config.as_deref())?;
            let rewriter = Rewriter::from_config(&settings).context("invalid configuration")?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            println!("markers in effect: {}", settings.marker_names().join(", "));
            println!("patterns in effect: {}", rewriter.filter().patterns().join(", "));
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Version) => {
            println!("bareimport v{}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("bareimport - side-effect import rewriter");
            println!("Run 'bareimport rewrite <path>' to report what would change");
            println!("Run 'bareimport --help' for more information");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RewriteConfig> {
    match path {
        Some(path) => config::parse_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => config::discover(Path::new(".")).context("failed to load bareimport.json"),
    }
}

fn print_single(path: &Path, rewriter: &Rewriter) -> Result<ExitCode> {
    let code =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let result = rewriter.rewrite(&path.display().to_string(), &code)?;
    print!("{}", result.code);
    Ok(ExitCode::SUCCESS)
}
