#![forbid(unsafe_code)]

//! HTTP range-request source.
//!
//! Resolves the file size with one `HEAD` request, then serves `load_range`
//! calls with range `GET`s whose payloads accumulate in a sparse
//! [`ChunkStore`]. Ranges already resident are answered without touching the
//! network.

use std::sync::Arc;

use async_trait::async_trait;
use aulos_net::{HttpClient, Net, NetOptions, RangeSpec};
use aulos_storage::ChunkStore;
use parking_lot::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::{
    error::{SourceError, SourceResult},
    source::{MediaSource, ReadTarget, SourceFactory},
};

/// Requested ranges are rounded up to whole multiples of this many bytes so
/// a run of small sequential reads costs one round trip instead of many.
const REQUEST_GRANULARITY: u64 = 1024;

struct HttpState {
    store: ChunkStore,
    size: Option<u64>,
}

/// [`MediaSource`] backed by HTTP range requests.
///
/// The chunk store has exactly one owner (this source) and every mutation
/// goes through the mutex, so concurrent `load_range` calls cannot violate
/// its invariants; reads of already loaded bytes take the lock only to copy.
pub struct HttpSource {
    url: Url,
    net: Arc<dyn Net>,
    state: Mutex<HttpState>,
}

impl HttpSource {
    pub fn new(url: Url, net: Arc<dyn Net>) -> Self {
        Self {
            url,
            net,
            state: Mutex::new(HttpState {
                store: ChunkStore::new(),
                size: None,
            }),
        }
    }
}

#[async_trait]
impl MediaSource for HttpSource {
    async fn init(&self) -> SourceResult<()> {
        if self.state.lock().size.is_some() {
            return Ok(());
        }

        let headers = self.net.head(self.url.clone(), None).await?;
        let size = headers
            .get("content-length")
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| SourceError::SizeUnresolved(self.url.to_string()))?;

        debug!(url = %self.url, size, "resolved size");
        self.state.lock().size = Some(size);
        Ok(())
    }

    async fn load_range(&self, range: (u64, u64)) -> SourceResult<()> {
        let (start, end) = range;
        let size = self.len()?;

        if size == 0 || start >= size {
            return Ok(());
        }
        let end = end.min(size - 1);
        if end < start {
            return Ok(());
        }

        if self.state.lock().store.has_range(start, end) {
            trace!(start, end, "range already resident");
            return Ok(());
        }

        let blocks = (end - start + 1).div_ceil(REQUEST_GRANULARITY);
        let request_end = (start + blocks * REQUEST_GRANULARITY).min(size) - 1;

        trace!(start, request_end, "fetching range");
        let body = self
            .net
            .get_range(
                self.url.clone(),
                RangeSpec::new(start, Some(request_end)),
                None,
            )
            .await?;

        self.state.lock().store.add_data(start, &body);
        Ok(())
    }

    fn byte_at(&self, offset: u64) -> SourceResult<u8> {
        Ok(self.state.lock().store.byte_at(offset)?)
    }

    fn bytes_at(&self, offset: u64, length: usize) -> SourceResult<Vec<u8>> {
        let state = self.state.lock();
        let mut out = Vec::with_capacity(length);
        for i in 0..length as u64 {
            out.push(state.store.byte_at(offset + i)?);
        }
        Ok(out)
    }

    fn len(&self) -> SourceResult<u64> {
        self.state.lock().size.ok_or(SourceError::Uninitialized)
    }
}

/// Factory registering the HTTP backend.
#[derive(Debug, Clone, Default)]
pub struct HttpSourceFactory {
    options: NetOptions,
}

impl HttpSourceFactory {
    #[must_use]
    pub fn new(options: NetOptions) -> Self {
        Self { options }
    }
}

impl SourceFactory for HttpSourceFactory {
    fn name(&self) -> &'static str {
        "http"
    }

    fn can_open(&self, target: &ReadTarget) -> bool {
        matches!(target, ReadTarget::Url(_))
    }

    fn open(&self, target: &ReadTarget) -> SourceResult<Arc<dyn MediaSource>> {
        match target {
            ReadTarget::Url(url) => {
                let client = HttpClient::new(self.options.clone());
                Ok(Arc::new(HttpSource::new(url.clone(), Arc::new(client))))
            }
            ReadTarget::Memory(_) => Err(SourceError::UnsupportedTarget),
        }
    }
}
