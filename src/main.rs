use anyhow::Result;
use clap::Parser;
use log::{error, warn};
use std::process::ExitCode;

use pindex::commands::{self, NullInstallationReporter};
use pindex::error::DistributionNotFound;
use pindex::finder::{FormatControl, PyPiFinder, SelectionPolicy};
use pindex::http::{self, NonRetryableError};
use pindex::version::{StandardVersion, Version};

/// pindex - package index inspector
///
/// Query a Python package index for the versions it advertises.
///
/// Examples:
///   pindex versions requests          # Every version of requests
///   pindex latest requests flask      # The newest version of each
#[derive(Parser, Debug)]
#[command(author, version = env!("PINDEX_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the package index (also via PINDEX_INDEX_URL)
    #[arg(
        long = "index-url",
        short = 'i',
        env = "PINDEX_INDEX_URL",
        value_name = "URL",
        default_value = "https://pypi.org",
        global = true
    )]
    index_url: String,

    /// Include pre-release and development versions
    #[arg(long = "pre", global = true)]
    pre: bool,

    /// Include versions yanked by their publisher
    #[arg(long = "allow-yanked", global = true)]
    allow_yanked: bool,

    /// Python interpreter version to check requires-python metadata against
    #[arg(
        long = "python-version",
        value_name = "VERSION",
        value_parser = parse_python_version,
        global = true
    )]
    python_version: Option<Version>,

    /// Keep versions whose requires-python rejects the target Python
    #[arg(long = "ignore-requires-python", global = true)]
    ignore_requires_python: bool,

    /// Only consider source distributions
    #[arg(long = "no-binary", conflicts_with = "only_binary", global = true)]
    no_binary: bool,

    /// Only consider wheels
    #[arg(long = "only-binary", global = true)]
    only_binary: bool,
}

// Variants stay in alphabetical order so usage output lists the verbs
// alphabetically.
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the latest version of one or more packages
    Latest(LatestArgs),

    /// List all versions of a package available on the index
    Versions(VersionsArgs),
}

#[derive(clap::Args, Debug)]
struct VersionsArgs {
    /// The package to look up
    #[arg(value_name = "PACKAGE")]
    package: String,
}

#[derive(clap::Args, Debug)]
struct LatestArgs {
    /// The packages to look up
    #[arg(value_name = "PACKAGE", required = true, num_args = 1..)]
    packages: Vec<String>,
}

fn parse_python_version(s: &str) -> Result<Version, String> {
    StandardVersion::parse(s)
        .map(Version::Standard)
        .ok_or_else(|| format!("{:?} is not a valid Python version", s))
}

impl Cli {
    fn selection_policy(&self) -> SelectionPolicy {
        let format_control = if self.no_binary {
            FormatControl::NoBinary
        } else if self.only_binary {
            FormatControl::OnlyBinary
        } else {
            FormatControl::AllowAll
        };

        SelectionPolicy {
            allow_prereleases: self.pre,
            allow_yanked: self.allow_yanked,
            ignore_requires_python: self.ignore_requires_python.then_some(true),
            format_control,
            target_python: self.python_version.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Emitted on every invocation, before argument validation can bail out.
    warn!(
        "pindex is currently an experimental tool. It may be removed or \
         changed in a future release without prior warning."
    );

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // The recognized error class is reported as a single line; anything
        // else is a crash and propagates with its full context.
        Err(e) if is_reportable(&e) => {
            error!("{:#}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let policy = cli.selection_policy();

    // One network session per invocation, dropped on every exit path.
    let session = http::build_session()?;
    let finder = PyPiFinder::new(session, &cli.index_url, policy.clone());

    match cli.command {
        Commands::Versions(args) => {
            commands::versions(&finder, &policy, &args.package, &NullInstallationReporter).await
        }
        Commands::Latest(args) => commands::latest(&finder, &policy, &args.packages).await,
    }
}

/// Domain and index-connectivity failures exit with a status code;
/// everything else is a bug.
fn is_reportable(e: &anyhow::Error) -> bool {
    e.downcast_ref::<DistributionNotFound>().is_some()
        || e.downcast_ref::<NonRetryableError>().is_some()
        || e.downcast_ref::<reqwest::Error>().is_some()
}
