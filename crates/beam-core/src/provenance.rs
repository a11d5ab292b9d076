//! Input hashes and version stamps recorded with every tracking run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{BeamError, ErrorInfo};

/// Version of the run summary layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Bumped when fields are removed or change meaning.
    pub major: u32,
    /// Bumped when fields are added.
    pub minor: u32,
    /// Bumped for fixes that keep the layout.
    pub patch: u32,
}

impl SchemaVersion {
    /// Version `major.minor.patch`.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Where a run summary came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Schema of the summary payload.
    pub schema_version: SchemaVersion,
    /// SHA-256 of the canonical JSON form of the run configuration.
    pub input_hash: String,
    /// Master seed of the particle substreams.
    pub seed: u64,
    /// RFC 3339 timestamp recording when the run finished.
    pub created_at: String,
    /// Crate name to version.
    pub tool_versions: BTreeMap<String, String>,
}

impl RunProvenance {
    /// Builds provenance for a configuration value and seed, stamped now.
    pub fn for_input<T: Serialize>(input: &T, seed: u64) -> Result<Self, BeamError> {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Ok(Self {
            schema_version: SchemaVersion::default(),
            input_hash: stable_hash_string(input)?,
            seed,
            created_at: chrono::Utc::now().to_rfc3339(),
            tool_versions,
        })
    }
}

/// Returns the hex encoded SHA-256 of the JSON serialisation of `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, BeamError> {
    let bytes = serde_json::to_vec(value).map_err(|err| {
        BeamError::Serde(ErrorInfo::new("hash-serialize", err.to_string()))
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
