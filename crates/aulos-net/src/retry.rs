#![forbid(unsafe_code)]

use std::future::Future;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::sleep;
use url::Url;

use crate::{
    error::NetError,
    traits::Net,
    types::{Headers, RangeSpec, RetryPolicy},
};

/// Retry decorator for [`Net`] implementations.
///
/// Replays a failed request while [`NetError::is_retryable`] holds, sleeping
/// per the policy's backoff schedule between attempts. The metadata core
/// itself never retries; this layer is where a backend opts in.
pub struct RetryNet<N> {
    inner: N,
    policy: RetryPolicy,
}

impl<N: Net> RetryNet<N> {
    pub fn new(inner: N, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn run<T, F, Fut>(&self, mut attempt_fn: F) -> Result<T, NetError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, NetError>> + Send,
    {
        let mut last_error = None;

        for attempt in 0..=self.policy.max_retries {
            match attempt_fn().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    last_error = Some(error);

                    if attempt < self.policy.max_retries {
                        sleep(self.policy.delay_for_attempt(attempt + 1)).await;
                    }
                }
            }
        }

        Err(NetError::RetryExhausted {
            max_retries: self.policy.max_retries,
            source: Box::new(last_error.unwrap_or(NetError::Timeout)),
        })
    }
}

#[async_trait]
impl<N: Net> Net for RetryNet<N> {
    async fn get_bytes(&self, url: Url, headers: Option<Headers>) -> Result<Bytes, NetError> {
        self.run(|| async { self.inner.get_bytes(url.clone(), headers.clone()).await })
            .await
    }

    async fn get_range(
        &self,
        url: Url,
        range: RangeSpec,
        headers: Option<Headers>,
    ) -> Result<Bytes, NetError> {
        self.run(|| async {
            self.inner
                .get_range(url.clone(), range.clone(), headers.clone())
                .await
        })
        .await
    }

    async fn head(&self, url: Url, headers: Option<Headers>) -> Result<Headers, NetError> {
        self.run(|| async { self.inner.head(url.clone(), headers.clone()).await })
            .await
    }
}
