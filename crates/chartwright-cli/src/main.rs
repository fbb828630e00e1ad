//! Chartwright CLI - turn plain Kubernetes manifests into a Helm chart

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod exit_codes;
mod input;

use commands::convert::ConvertArgs;

#[derive(Parser)]
#[command(name = "chartwright")]
#[command(author = "Chartwright Contributors")]
#[command(version)]
#[command(about = "Turn plain Kubernetes manifests into a parameterized Helm chart", long_about = None)]
struct Cli {
    /// Chart directory; its name is the chart name unless --name is given
    #[arg(default_value = "chart")]
    chart_dir: PathBuf,

    /// Manifest file or directory (repeatable, `-` for stdin)
    #[arg(short = 'f', long = "file")]
    files: Vec<PathBuf>,

    /// Recurse into manifest directories
    #[arg(short, long)]
    recursive: bool,

    /// Chart name
    #[arg(long)]
    name: Option<String>,

    /// Application name for the Chart.yaml description
    #[arg(long, value_name = "NAME")]
    app_name: Option<String>,

    /// Read pod imagePullSecrets from values
    #[arg(long)]
    image_pull_secrets: bool,

    /// Print the chart instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Log progress
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

impl From<Cli> for ConvertArgs {
    fn from(cli: Cli) -> Self {
        Self {
            chart_dir: cli.chart_dir,
            files: cli.files,
            recursive: cli.recursive,
            name: cli.name,
            app_name: cli.app_name,
            image_pull_secrets: cli.image_pull_secrets,
            stdout: cli.stdout,
        }
    }
}

/// Logs go to stderr so `--stdout` output stays a clean YAML stream.
fn init_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    match commands::convert::run(cli.into()).await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code as u8)
        }
    }
}
