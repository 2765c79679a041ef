//! Packshot CLI - photo ingestion for gear-packing lists.
//!
//! Runs uploads through the same pipeline and store the upload endpoint
//! uses, which makes it handy for checking files and repairing stored images.
//!
//! # Usage
//!
//! ```bash
//! # Normalize a single image and print its metadata
//! packshot process tent.png --output tent.jpg
//!
//! # Manage stored pack images
//! packshot image put pack-42 tent.png
//! packshot image get pack-42 --output pack-42.jpg
//! packshot image rm pack-42
//!
//! # View configuration
//! packshot config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Packshot - normalize and store pack photos.
#[derive(Parser, Debug)]
#[command(name = "packshot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an image through the pipeline without storing it
    Process(cli::process::ProcessArgs),

    /// Upload, fetch and delete stored pack images
    Image(cli::image::ImageArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match packshot_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `packshot config path`."
            );
            packshot_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Packshot v{}", packshot_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args, &config).await,
        Commands::Image(args) => cli::image::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config).await,
    }
}
