use routefog_manifest::TreePatchError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Failures of the fetch+merge pipeline.
///
/// The URL size guard is deliberately not represented here: an oversized
/// batch is a silent degrade-to-click-time fallback, never an error.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Transport failure reaching the manifest server.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with status >= 400.
    #[error("manifest server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("invalid patch payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    TreePatch(#[from] TreePatchError),
}
