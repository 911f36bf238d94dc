//! I/O operations for point cloud files
//!
//! This crate reads the fallback dataset loaded at startup and writes the
//! clouds saved during a session. Both use the same JSON schema.

pub mod json;
pub mod error;

pub use error::*;
pub use json::{DecodedCloud, JsonCloud};

use cloudsketch_core::SerializedPoint;
use std::path::{Path, PathBuf};

/// File written by the save command unless configured otherwise
pub const DEFAULT_SAVE_FILE_NAME: &str = "custom_cloud.json";

/// Dataset loaded at startup unless configured otherwise
pub const DEFAULT_FALLBACK_FILE_NAME: &str = "cloud_500.json";

/// Trait for reading point clouds from files
pub trait CloudReader {
    fn read_cloud<P: AsRef<Path>>(path: P) -> Result<DecodedCloud>;
}

/// Trait for writing point clouds to files
pub trait CloudWriter {
    fn write_cloud<P: AsRef<Path>>(points: &[SerializedPoint], path: P) -> Result<()>;
}

/// Auto-detect format and read a cloud
pub fn read_cloud<P: AsRef<Path>>(path: P) -> Result<DecodedCloud> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => JsonCloud::read_cloud(path),
        other => Err(IoError::InvalidFormat {
            format: format!("unsupported cloud format: {other:?}"),
        }),
    }
}

/// Decode a cloud held in memory, e.g. a dataset embedded in the host
pub fn parse_cloud(json: &str) -> Result<DecodedCloud> {
    JsonCloud::parse(json)
}

/// Auto-detect format and write a cloud
pub fn write_cloud<P: AsRef<Path>>(points: &[SerializedPoint], path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => JsonCloud::write_cloud(points, path),
        other => Err(IoError::InvalidFormat {
            format: format!("unsupported cloud format: {other:?}"),
        }),
    }
}

/// Resolve where a save lands. An empty name falls back to [`DEFAULT_SAVE_FILE_NAME`].
pub fn save_path<P: AsRef<Path>>(dir: P, file_name: &str) -> PathBuf {
    let name = file_name.trim();
    let name = if name.is_empty() { DEFAULT_SAVE_FILE_NAME } else { name };
    dir.as_ref().join(name)
}
