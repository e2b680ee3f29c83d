#![forbid(unsafe_code)]

//! The orchestrator: pick a backend, probe for the tag format with at most
//! two range loads, then hand the source to the matched parser.

use std::sync::Arc;

use aulos_io::{MediaSource, ReadTarget, SourceFactory};
use aulos_tags::{TagError, TagFormat, Tags};
use futures::FutureExt;
use tracing::{debug, trace};

use crate::{error::ReadError, registry::Registry};

/// Fluent read-request builder.
///
/// One `Reader` performs one read: it opens the target through the first
/// accepting backend (or an explicit override), detects the tag format with
/// coalesced probes, and returns the decoded tags.
pub struct Reader {
    target: ReadTarget,
    registry: Arc<Registry>,
    tags_to_read: Option<Vec<String>>,
    file_reader: Option<Arc<dyn SourceFactory>>,
    tag_reader: Option<Arc<dyn TagFormat>>,
}

impl Reader {
    pub fn new(target: impl Into<ReadTarget>) -> Self {
        Self {
            target: target.into(),
            registry: Arc::new(Registry::with_defaults()),
            tags_to_read: None,
            file_reader: None,
            tag_reader: None,
        }
    }

    /// Use a caller-configured registry instead of the defaults.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Only decode the named canonical tags.
    #[must_use]
    pub fn tags_to_read<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags_to_read = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Open the target with this backend, bypassing predicate inference.
    #[must_use]
    pub fn with_file_reader(mut self, factory: Arc<dyn SourceFactory>) -> Self {
        self.file_reader = Some(factory);
        self
    }

    /// Parse with this format, bypassing detection (no probe loads happen).
    #[must_use]
    pub fn with_tag_reader(mut self, format: Arc<dyn TagFormat>) -> Self {
        self.tag_reader = Some(format);
        self
    }

    /// Run the read.
    ///
    /// # Errors
    ///
    /// [`ReadError::NoMatchingReader`] when no backend accepts the target,
    /// [`ReadError::NoMatchingFormat`] when nothing matches the probed
    /// bytes, and the underlying source/tag errors otherwise. A parser that
    /// panics mid-decode surfaces as a
    /// [`TagError::Parse`](aulos_tags::TagError) instead of unwinding into
    /// the caller.
    pub async fn read(self) -> Result<Tags, ReadError> {
        let factory = match &self.file_reader {
            Some(factory) => factory.clone(),
            None => self
                .registry
                .find_file_reader(&self.target)
                .ok_or(ReadError::NoMatchingReader)?,
        };
        trace!(backend = factory.name(), "opening source");

        let source = factory.open(&self.target)?;
        source.init().await?;

        let format = match &self.tag_reader {
            Some(format) => format.clone(),
            None => detect_format(&self.registry, source.as_ref()).await?,
        };
        debug!(format = format.name(), "reading tags");

        let wanted = self.tags_to_read.as_deref();
        let parse = std::panic::AssertUnwindSafe(format.read(source.as_ref(), wanted));
        match parse.catch_unwind().await {
            Ok(tags) => Ok(tags?),
            Err(panic) => Err(TagError::parse(panic_message(&panic)).into()),
        }
    }
}

/// Select the first registered format whose probe matches, loading at most
/// one spanning range per file half.
///
/// Formats probe either near the start or near the end of the file, so
/// loading one superset range per registered format would be wasteful and
/// loading one per probe location would still round-trip twice for the
/// common start+end mix. Instead the valid probes are split by the file
/// half their resolved offset falls into, each half's minimal spanning
/// range is loaded once, and matching begins only after both loads have
/// settled — an empty half completes with no transport call.
async fn detect_format(
    registry: &Registry,
    source: &dyn MediaSource,
) -> Result<Arc<dyn TagFormat>, ReadError> {
    let size = source.len()?;

    // Formats whose declared range cannot fit this file are skipped, not
    // errors. An empty range can never match anything either.
    let candidates: Vec<(&Arc<dyn TagFormat>, u64, usize)> = registry
        .tag_readers()
        .iter()
        .filter(|format| {
            let range = format.ident_range();
            range.length > 0 && range.is_valid_for(size)
        })
        .map(|format| {
            let range = format.ident_range();
            (format, range.resolve(size), range.length)
        })
        .collect();

    let mut start_span: Option<(u64, u64)> = None;
    let mut end_span: Option<(u64, u64)> = None;
    for &(_, resolved, length) in &candidates {
        let last = resolved + length as u64 - 1;
        let span = if resolved * 2 < size {
            &mut start_span
        } else {
            &mut end_span
        };
        *span = Some(match *span {
            None => (resolved, last),
            Some((lo, hi)) => (lo.min(resolved), hi.max(last)),
        });
    }

    let load_start = async {
        match start_span {
            Some(range) => source.load_range(range).await,
            None => Ok(()),
        }
    };
    let load_end = async {
        match end_span {
            Some(range) => source.load_range(range).await,
            None => Ok(()),
        }
    };

    // Barrier: both probe loads settle before any matching happens.
    let (start_outcome, end_outcome) = tokio::join!(load_start, load_end);
    start_outcome?;
    end_outcome?;

    for (format, resolved, length) in candidates {
        let ident = source.bytes_at(resolved, length)?;
        if format.matches(&ident) {
            return Ok(format.clone());
        }
    }

    Err(ReadError::NoMatchingFormat)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "tag parser panicked".to_string()
    }
}
