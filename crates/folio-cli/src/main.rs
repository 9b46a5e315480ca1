mod check;
mod consts;
mod logging;
mod preview;
mod server_utils;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::error;

use check::check_site;
use consts::PORT;
use logging::init_logging;
use preview::start_preview_web_server;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Don't print anything
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site locally
    Preview {
        /// Directory containing the site
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Expose the server to your network
        #[arg(long)]
        host: bool,

        /// First port to try, the next free one is used if it's taken
        #[arg(long, default_value_t = PORT)]
        port: u16,
    },
    /// Check that every page can be swapped in place by the router
    Check {
        /// Directory containing the site
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging();
    }

    match cli.command {
        Commands::Preview { dir, host, port } => {
            if !dir.is_dir() {
                error!(name: "preview", "{} is not a directory", dir.display().to_string().bold());
                return ExitCode::FAILURE;
            }

            if let Err(err) = start_preview_web_server(dir, host, port).await {
                error!(name: "preview", "{}", err);
                return ExitCode::FAILURE;
            }

            ExitCode::SUCCESS
        }
        Commands::Check { dir } => match check_site(&dir).await {
            Ok(report) if report.all_swapped() => ExitCode::SUCCESS,
            Ok(_) => ExitCode::FAILURE,
            Err(err) => {
                error!(name: "check", "{}", err);
                ExitCode::FAILURE
            }
        },
    }
}
