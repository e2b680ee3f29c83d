#![forbid(unsafe_code)]

use std::sync::Arc;

use aulos_io::{HttpSourceFactory, MemSourceFactory, ReadTarget, SourceFactory};
use aulos_tags::{OggFormat, TagFormat};

/// The set of file-reader backends and tag formats a [`Reader`](crate::Reader)
/// consults.
///
/// Registration order is priority order: the first backend whose predicate
/// accepts a target opens it, and the first format whose probe matches wins
/// detection even when later ones would also match.
///
/// Build and configure a registry once at startup, then share it read-only
/// across read requests. Mutation is not synchronized; reconfiguring while
/// reads are in flight is outside the contract.
pub struct Registry {
    file_readers: Vec<Arc<dyn SourceFactory>>,
    tag_readers: Vec<Arc<dyn TagFormat>>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            file_readers: Vec::new(),
            tag_readers: Vec::new(),
        }
    }

    /// A registry wired with the shipped backends (HTTP, memory) and tag
    /// formats (Ogg).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .add_file_reader(Arc::new(HttpSourceFactory::default()))
            .add_file_reader(Arc::new(MemSourceFactory))
            .add_tag_reader(Arc::new(OggFormat));
        registry
    }

    pub fn add_file_reader(&mut self, factory: Arc<dyn SourceFactory>) -> &mut Self {
        self.file_readers.push(factory);
        self
    }

    pub fn add_tag_reader(&mut self, format: Arc<dyn TagFormat>) -> &mut Self {
        self.tag_readers.push(format);
        self
    }

    /// Remove a previously added tag reader, compared by identity.
    pub fn remove_tag_reader(&mut self, format: &Arc<dyn TagFormat>) -> &mut Self {
        self.tag_readers.retain(|f| !Arc::ptr_eq(f, format));
        self
    }

    pub(crate) fn find_file_reader(&self, target: &ReadTarget) -> Option<Arc<dyn SourceFactory>> {
        self.file_readers
            .iter()
            .find(|factory| factory.can_open(target))
            .cloned()
    }

    pub(crate) fn tag_readers(&self) -> &[Arc<dyn TagFormat>] {
        &self.tag_readers
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
