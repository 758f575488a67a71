//! Error types for mrsgen.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for mrsgen operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Blocklist fetch error (transport failure or timeout)
    #[error("fetch error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status on a blocklist fetch
    #[error("unexpected HTTP status {code} from {url}")]
    Status { url: String, code: u16 },

    /// Release index query, asset download, or decompression error
    #[error("download error: {0}")]
    Download(String),

    /// No release asset matches the host platform
    #[error("no release asset for {os}/{arch}")]
    NoMatchingAsset { os: String, arch: String },

    /// Local converter binary unusable and unacquirable
    #[error("converter unavailable: {0}")]
    ToolUnavailable(String),

    /// No qualifying domains collected from any source
    #[error("no domains collected from any source")]
    EmptyBlocklist,

    /// Discovery found no rule-list documents
    #[error("no rule-list documents found under {}", .0.display())]
    NoRuleFiles(PathBuf),

    /// A single conversion subprocess failed
    #[error("conversion failed for {}: {detail}", .input.display())]
    Conversion { input: PathBuf, detail: String },

    /// One or more files in a batch failed to convert
    #[error("{failed} of {total} conversions failed")]
    Incomplete { failed: usize, total: usize },
}

/// Result type alias for mrsgen operations.
pub type Result<T> = std::result::Result<T, Error>;
