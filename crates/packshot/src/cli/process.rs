//! The `packshot process` command.

use clap::Args;
use packshot_core::{Config, ImageProcessor};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use super::report;

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Image file to process (JPEG, PNG or WebP)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Write the normalized JPEG here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the maximum output dimension
    #[arg(long)]
    pub max_dimension: Option<u32>,

    /// Override the JPEG quality (1-100)
    #[arg(long)]
    pub quality: Option<u8>,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, config: &Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args)?;
    let processor = ImageProcessor::new(&config);

    let file = File::open(&args.input)?;
    let input = args.input.clone();
    let processed = tokio::task::spawn_blocking(move || {
        processor.process_reader(BufReader::new(file))
    })
    .await?
    .map_err(report)?;

    tracing::info!(
        "Processed {} -> {}x{} ({} bytes)",
        input.display(),
        processed.metadata.width,
        processed.metadata.height,
        processed.metadata.file_size
    );

    if let Some(output) = &args.output {
        tokio::fs::write(output, &processed.data).await?;
        tracing::info!("Wrote {}", output.display());
    }

    println!("{}", serde_json::to_string_pretty(&processed.metadata)?);
    Ok(())
}

fn apply_overrides(config: &Config, args: &ProcessArgs) -> anyhow::Result<Config> {
    let mut config = config.clone();
    if let Some(max_dimension) = args.max_dimension {
        config.limits.max_dimension = max_dimension;
    }
    if let Some(quality) = args.quality {
        config.encode.quality = quality;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(max_dimension: Option<u32>, quality: Option<u8>) -> ProcessArgs {
        ProcessArgs {
            input: PathBuf::from("tent.png"),
            output: None,
            max_dimension,
            quality,
        }
    }

    #[test]
    fn test_overrides_applied() {
        let config = apply_overrides(&Config::default(), &args(Some(800), Some(70))).unwrap();
        assert_eq!(config.limits.max_dimension, 800);
        assert_eq!(config.encode.quality, 70);
    }

    #[test]
    fn test_invalid_override_rejected() {
        assert!(apply_overrides(&Config::default(), &args(None, Some(0))).is_err());
        assert!(apply_overrides(&Config::default(), &args(Some(0), None)).is_err());
    }

    #[tokio::test]
    async fn test_execute_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bin");
        let output = dir.path().join("out.jpg");

        let mut png = std::io::Cursor::new(Vec::new());
        image::DynamicImage::new_rgba8(3, 2)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        std::fs::write(&input, png.into_inner()).unwrap();

        let args = ProcessArgs {
            input,
            output: Some(output.clone()),
            max_dimension: None,
            quality: None,
        };
        execute(args, &Config::default()).await.unwrap();

        let written = std::fs::read(&output).unwrap();
        assert_eq!(&written[0..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_execute_rejects_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "This is not an image").unwrap();

        let err = execute(
            ProcessArgs {
                input,
                output: None,
                max_dimension: None,
                quality: None,
            },
            &Config::default(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("invalid_format"));
    }
}
