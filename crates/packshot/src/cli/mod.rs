//! Subcommand implementations.

pub mod config;
pub mod image;
pub mod process;

use packshot_core::PackshotError;

/// Convert a library error for display.
///
/// Rejected uploads print the same message an uploader would see, tagged
/// with the error kind; everything else keeps its full detail for the
/// operator.
pub(crate) fn report(err: PackshotError) -> anyhow::Error {
    match &err {
        PackshotError::Image(e) if e.is_client_error() => {
            anyhow::anyhow!("{} ({})", e.public_message(), e.kind().as_str())
        }
        _ => anyhow::Error::new(err),
    }
}
