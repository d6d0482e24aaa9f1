use crate::error::ArtifactError;
use crate::flow::FlowCatalog;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// Bumped whenever the serialized shape of `FlowCatalog` changes.
pub const CATALOG_FORMAT_VERSION: u32 = 1;

/// A compiled catalog as written to disk, so flow tables can be compiled ahead of time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompiledCatalog {
    pub format_version: u32,
    pub catalog: FlowCatalog,
}

impl CompiledCatalog {
    pub fn new(catalog: FlowCatalog) -> Self {
        Self {
            format_version: CATALOG_FORMAT_VERSION,
            catalog,
        }
    }

    pub fn into_catalog(self) -> FlowCatalog {
        self.catalog
    }

    /// Saves the compiled catalog to a file using the bincode format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| {
            ArtifactError::Generic(format!("Could not create file '{}': {}", path.display(), e))
        })?;
        file.write_all(&bytes).map_err(|e| {
            ArtifactError::Generic(format!("Could not write to file '{}': {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved catalog artifact");
        Ok(())
    }

    /// Loads a compiled catalog from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let mut file = fs::File::open(path).map_err(|e| {
            ArtifactError::Generic(format!("Could not open file '{}': {}", path.display(), e))
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            ArtifactError::Generic(format!("Could not read from file '{}': {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        encode_to_vec(self, standard())
            .map_err(|e| ArtifactError::Generic(format!("Serialization failed: {}", e)))
    }

    /// Deserializes a compiled catalog from a byte slice, rejecting other format versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: Self = decode_from_slice(bytes, standard())
            .map(|(artifact, _)| artifact) // bincode 2 returns a tuple (data, bytes_read)
            .map_err(|e| ArtifactError::Generic(format!("Deserialization failed: {}", e)))?;
        if artifact.format_version != CATALOG_FORMAT_VERSION {
            return Err(ArtifactError::VersionMismatch {
                found: artifact.format_version,
                expected: CATALOG_FORMAT_VERSION,
            });
        }
        Ok(artifact)
    }
}
