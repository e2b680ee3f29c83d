#![forbid(unsafe_code)]

//! `aulos-net`
//!
//! HTTP transport for aulos sources. The only operations the metadata core
//! needs are a size probe (`HEAD`) and bounded range reads, so the [`Net`]
//! trait stays deliberately small. Timeout and retry behavior are opt-in
//! decorator layers composed through [`NetExt`].

mod client;
mod error;
mod retry;
mod timeout;
mod traits;
mod types;

pub use client::HttpClient;
pub use error::{NetError, NetResult};
pub use retry::RetryNet;
pub use timeout::TimeoutNet;
pub use traits::{Net, NetExt};
pub use types::{Headers, NetOptions, RangeSpec, RetryPolicy};
