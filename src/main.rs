mod commands;
mod config;
mod providers;
mod render;
mod source;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use calview_core::month::YearMonth;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calview")]
#[command(about = "View ICS and Google calendars by month and export them to CSV")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one month of events as a calendar grid
    Show {
        /// ICS file, URL (http, https, webcal), `-` for stdin, or `google[:calendar-id]`.
        /// Defaults to the last fetched URL.
        source: Option<String>,

        /// Month to show (YYYY-MM)
        #[arg(short, long)]
        month: Option<YearMonth>,

        /// Page this many months forward
        #[arg(long, default_value_t = 0)]
        next: usize,

        /// Page this many months back
        #[arg(long, default_value_t = 0)]
        prev: usize,
    },
    /// List the months that have events, with event counts and total hours
    Months {
        source: Option<String>,
    },
    /// Export events starting within a date range to CSV
    Export {
        source: Option<String>,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day of the range, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Directory to write calendar-events-<from>-to-<to>.csv into
        #[arg(short, long, conflicts_with = "stdout")]
        output_dir: Option<PathBuf>,

        /// Print the CSV instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Sign in to a calendar provider (e.g. "google")
    Auth {
        provider: String,
    },
    /// List your Google calendars
    Calendars,
    /// Forget the cached calendar URL
    Forget,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Show {
            source,
            month,
            next,
            prev,
        } => {
            let cfg = config::load_config()?;
            let viewer = commands::load_viewer(source.as_deref(), &cfg).await?;
            commands::show::run(viewer, month, next, prev)
        }
        Commands::Months { source } => {
            let cfg = config::load_config()?;
            let viewer = commands::load_viewer(source.as_deref(), &cfg).await?;
            commands::months::run(viewer)
        }
        Commands::Export {
            source,
            from,
            to,
            output_dir,
            stdout,
        } => {
            let cfg = config::load_config()?;
            let viewer = commands::load_viewer(source.as_deref(), &cfg).await?;
            commands::export::run(viewer, &from, &to, output_dir, stdout)
        }
        Commands::Auth { provider } => commands::auth::run(&provider).await,
        Commands::Calendars => commands::calendars::run().await,
        Commands::Forget => commands::forget::run(),
    }
}

/// Log to stderr. RUST_LOG wins over the -v count.
fn init_tracing(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow::anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
