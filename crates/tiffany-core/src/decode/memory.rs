//! Decoding from bytes handed over by the host.

use std::collections::HashMap;

use super::file::decode_bytes;
use super::types::{DecodeError, SourceImage};
use super::Decoder;

/// Serves files the host staged in memory, keyed by name.
///
/// Browsers cannot give the core a filesystem, so the host reads each file
/// and stages its bytes here before asking for a load. A staged file is
/// consumed by its first decode.
#[derive(Debug, Default, Clone)]
pub struct MemoryDecoder {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `bytes` under `name`, replacing earlier bytes with that name.
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Drop every staged file.
    pub fn clear(&mut self) {
        self.files.clear();
    }
}

impl Decoder for MemoryDecoder {
    fn decode(&mut self, path: &str) -> Result<SourceImage, DecodeError> {
        let bytes = self
            .files
            .remove(path)
            .ok_or_else(|| DecodeError::NotFound(path.to_string()))?;
        decode_bytes(&bytes)
    }
}
