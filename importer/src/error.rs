use thiserror::Error;

/// One variant per pipeline stage. The driver halts on the first of these; main prints it and
/// exits non-zero. The message texts keep the stage prefixes the pipeline has always printed.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Download and write procedure failed: {0:#}")]
    Download(anyhow::Error),
    #[error("Unzip procedure failed: {0:#}")]
    Unzip(anyhow::Error),
    /// Covers both a malformed descriptor and the image download it triggers; the two aren't
    /// distinguished in the message.
    #[error("KML extraction failed: {0:#}")]
    Descriptor(anyhow::Error),
    #[error("Warp procedure failed: {0:#}")]
    Georeference(anyhow::Error),
}
