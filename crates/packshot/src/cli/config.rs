//! The `packshot config` command.

use clap::{Args, Subcommand};
use packshot_core::Config;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration after validation
    Show {
        /// Print JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Print the config file location
    Path,

    /// Write a default config file and create the image store directory
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,

        /// Config file to write (defaults to the platform config path)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Image store directory recorded in the new config
        #[arg(long)]
        storage_dir: Option<PathBuf>,
    },
}

/// Execute the config command against the already-loaded `config`.
pub async fn execute(args: ConfigArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { json } => print!("{}", render(config, json)?),
        ConfigCommand::Path => println!("{}", Config::default_path().display()),
        ConfigCommand::Init {
            force,
            path,
            storage_dir,
        } => {
            let path = path.unwrap_or_else(Config::default_path);
            let store = init(&path, storage_dir, force).await?;
            println!("Configuration initialized at: {}", path.display());
            println!("Image store: {}", store.display());
        }
    }

    Ok(())
}

/// Render the validated config along with the store directory it resolves to.
fn render(config: &Config, json: bool) -> anyhow::Result<String> {
    config.validate()?;
    let storage_dir = config.storage_dir();

    if json {
        let value = serde_json::json!({
            "config": config,
            "resolved_storage_dir": storage_dir,
        });
        Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
    } else {
        Ok(format!(
            "{}\n# resolved storage dir: {}\n",
            config.to_toml()?.trim_end(),
            storage_dir.display()
        ))
    }
}

/// Write a default config to `path` and create its store directory.
///
/// Returns the resolved store directory.
async fn init(
    path: &Path,
    storage_dir: Option<PathBuf>,
    force: bool,
) -> anyhow::Result<PathBuf> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let mut config = Config::default();
    if let Some(dir) = storage_dir {
        config.storage.dir = dir;
    }
    config.validate()?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, config.to_toml()?).await?;

    let store = config.storage_dir();
    tokio::fs::create_dir_all(&store).await?;

    tracing::info!(
        "Config written to {}, image store at {}",
        path.display(),
        store.display()
    );
    Ok(store)
}
