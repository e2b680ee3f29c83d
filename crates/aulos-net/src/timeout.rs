#![forbid(unsafe_code)]

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::{
    error::NetError,
    traits::Net,
    types::{Headers, RangeSpec},
};

/// Timeout decorator for [`Net`] implementations.
///
/// Bounds each whole call; an elapsed deadline resolves through the error
/// path as [`NetError::Timeout`] rather than hanging the read request.
pub struct TimeoutNet<N> {
    inner: N,
    timeout: Duration,
}

impl<N: Net> TimeoutNet<N> {
    pub fn new(inner: N, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<N: Net> Net for TimeoutNet<N> {
    async fn get_bytes(&self, url: Url, headers: Option<Headers>) -> Result<Bytes, NetError> {
        tokio::time::timeout(self.timeout, self.inner.get_bytes(url, headers))
            .await
            .map_err(|_| NetError::Timeout)?
    }

    async fn get_range(
        &self,
        url: Url,
        range: RangeSpec,
        headers: Option<Headers>,
    ) -> Result<Bytes, NetError> {
        tokio::time::timeout(self.timeout, self.inner.get_range(url, range, headers))
            .await
            .map_err(|_| NetError::Timeout)?
    }

    async fn head(&self, url: Url, headers: Option<Headers>) -> Result<Headers, NetError> {
        tokio::time::timeout(self.timeout, self.inner.head(url, headers))
            .await
            .map_err(|_| NetError::Timeout)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::NetExt;

    /// Never completes.
    struct StuckNet;

    #[async_trait]
    impl Net for StuckNet {
        async fn get_bytes(&self, _url: Url, _headers: Option<Headers>) -> Result<Bytes, NetError> {
            std::future::pending().await
        }

        async fn get_range(
            &self,
            _url: Url,
            _range: RangeSpec,
            _headers: Option<Headers>,
        ) -> Result<Bytes, NetError> {
            std::future::pending().await
        }

        async fn head(&self, _url: Url, _headers: Option<Headers>) -> Result<Headers, NetError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_request_resolves_as_timeout() {
        let net = StuckNet.with_timeout(Duration::from_millis(50));
        let url = Url::parse("http://example.com/track.ogg").unwrap();

        let err = net.head(url, None).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
