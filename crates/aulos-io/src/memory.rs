#![forbid(unsafe_code)]

//! Fully resident in-memory source.

use std::sync::Arc;

use async_trait::async_trait;
use aulos_storage::StorageError;
use bytes::Bytes;

use crate::{
    error::{SourceError, SourceResult},
    source::{MediaSource, ReadTarget, SourceFactory},
};

/// [`MediaSource`] over a byte buffer that is already fully loaded.
///
/// `init` and `load_range` complete without doing anything; reads past the
/// end surface the same `NotLoaded` error a sparse source would.
#[derive(Debug, Clone)]
pub struct MemSource {
    data: Bytes,
}

impl MemSource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

#[async_trait]
impl MediaSource for MemSource {
    async fn init(&self) -> SourceResult<()> {
        Ok(())
    }

    async fn load_range(&self, _range: (u64, u64)) -> SourceResult<()> {
        Ok(())
    }

    fn byte_at(&self, offset: u64) -> SourceResult<u8> {
        usize::try_from(offset)
            .ok()
            .and_then(|ix| self.data.get(ix).copied())
            .ok_or(SourceError::Storage(StorageError::NotLoaded { offset }))
    }

    fn bytes_at(&self, offset: u64, length: usize) -> SourceResult<Vec<u8>> {
        if length == 0 {
            return Ok(Vec::new());
        }
        let start = usize::try_from(offset)
            .map_err(|_| SourceError::Storage(StorageError::NotLoaded { offset }))?;
        let end = start.checked_add(length).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => Ok(self.data[start..end].to_vec()),
            None => Err(SourceError::Storage(StorageError::NotLoaded {
                offset: offset + length as u64 - 1,
            })),
        }
    }

    fn len(&self) -> SourceResult<u64> {
        Ok(self.data.len() as u64)
    }
}

/// Factory registering the in-memory backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemSourceFactory;

impl SourceFactory for MemSourceFactory {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn can_open(&self, target: &ReadTarget) -> bool {
        matches!(target, ReadTarget::Memory(_))
    }

    fn open(&self, target: &ReadTarget) -> SourceResult<Arc<dyn MediaSource>> {
        match target {
            ReadTarget::Memory(bytes) => Ok(Arc::new(MemSource::new(bytes.clone()))),
            ReadTarget::Url(_) => Err(SourceError::UnsupportedTarget),
        }
    }
}
