//! The `packshot image` command for managing stored pack images.

use clap::{Args, Subcommand};
use packshot_core::{Config, FsStore, ImageService, OwnerId};
use std::path::PathBuf;

use super::report;

/// Arguments for the `image` command.
#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Store directory (defaults to `storage.dir` from config)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ImageCommand,
}

/// Subcommands for stored images.
#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// Process a file and store it for a pack, replacing any existing image
    Put {
        /// Owning pack id
        owner: String,
        /// Image file (JPEG, PNG or WebP)
        file: PathBuf,
    },

    /// Write a pack's stored image to a file
    Get {
        /// Owning pack id
        owner: String,
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Delete a pack's stored image (no error if absent)
    Rm {
        /// Owning pack id
        owner: String,
    },

    /// Print whether a pack has a stored image
    Exists {
        /// Owning pack id
        owner: String,
    },
}

/// Execute the image command.
pub async fn execute(args: ImageArgs, config: &Config) -> anyhow::Result<()> {
    let dir = args.store.unwrap_or_else(|| config.storage_dir());
    let store = FsStore::open(&dir).await?;
    let service = ImageService::new(config, store);

    match args.command {
        ImageCommand::Put { owner, file } => {
            let owner = OwnerId::parse(owner)?;
            let reader = tokio::fs::File::open(&file).await?;
            let metadata = service
                .upload_stream(&owner, reader)
                .await
                .map_err(report)?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }

        ImageCommand::Get { owner, output } => {
            let owner = OwnerId::parse(owner)?;
            let stored = service.fetch(&owner).await.map_err(report)?;
            tokio::fs::write(&output, &stored.data).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "metadata": stored.metadata,
                    "etag": stored.etag,
                    "path": output,
                }))?
            );
        }

        ImageCommand::Rm { owner } => {
            let owner = OwnerId::parse(owner)?;
            service.remove(&owner).await.map_err(report)?;
        }

        ImageCommand::Exists { owner } => {
            let owner = OwnerId::parse(owner)?;
            let exists = service.has_image(&owner).await.map_err(report)?;
            println!("{exists}");
        }
    }

    Ok(())
}
