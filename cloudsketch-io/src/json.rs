//! JSON point cloud files
//!
//! A cloud file is a JSON array of `{"x": .., "y": .., "z": .., "color": [r, g, b, a]}`
//! objects. Individual entries that do not decode are counted and skipped so
//! one bad record does not discard the whole file.

use crate::error::{IoError, Result};
use crate::{CloudReader, CloudWriter};
use cloudsketch_core::SerializedPoint;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Entries decoded from a cloud file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedCloud {
    pub entries: Vec<SerializedPoint>,
    /// Array elements that were not point objects
    pub undecodable: usize,
}

/// JSON cloud reader/writer
pub struct JsonCloud;

impl JsonCloud {
    /// Decode a cloud from JSON text
    pub fn parse(json: &str) -> Result<DecodedCloud> {
        let value: Value = serde_json::from_str(json).map_err(|e| IoError::ParseError {
            message: e.to_string(),
        })?;

        let Value::Array(items) = value else {
            return Err(IoError::InvalidFormat {
                format: "expected a JSON array of points".to_string(),
            });
        };

        let mut cloud = DecodedCloud {
            entries: Vec::with_capacity(items.len()),
            undecodable: 0,
        };
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<SerializedPoint>(item) {
                Ok(entry) => cloud.entries.push(entry),
                Err(e) => {
                    log::warn!("Skipping cloud entry {index}: {e}");
                    cloud.undecodable += 1;
                }
            }
        }

        Ok(cloud)
    }

    /// Encode points as compact JSON
    pub fn to_json_string(points: &[SerializedPoint]) -> Result<String> {
        Ok(serde_json::to_string(points)?)
    }
}

impl CloudReader for JsonCloud {
    fn read_cloud<P: AsRef<Path>>(path: P) -> Result<DecodedCloud> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = fs::read_to_string(path)?;
        let cloud = Self::parse(&contents)?;
        log::debug!(
            "Read {} entries from {} ({} undecodable)",
            cloud.entries.len(),
            path.display(),
            cloud.undecodable
        );
        Ok(cloud)
    }
}

impl CloudWriter for JsonCloud {
    fn write_cloud<P: AsRef<Path>>(points: &[SerializedPoint], path: P) -> Result<()> {
        let path = path.as_ref();
        let json = Self::to_json_string(points)?;
        fs::write(path, json).map_err(|e| IoError::WriteError {
            message: format!("{}: {e}", path.display()),
        })?;
        log::info!("Wrote {} points to {}", points.len(), path.display());
        Ok(())
    }
}
