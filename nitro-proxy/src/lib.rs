//! # nitro-proxy
//!
//! Synchronizes the declared site set with the long-running proxy process.
//!
//! [`sync_sites`] waits for the proxy to answer a liveness probe (bounded
//! exponential backoff, cancellable) and then applies the full site mapping.

pub mod client;
pub mod error;
pub mod protocol;
pub mod sync;

pub use client::{ProxyApi, TcpProxyClient};
pub use error::ProxyError;
pub use protocol::{ProxyRequest, ProxyResponse, SiteDescriptor, SiteMap};
pub use sync::{site_descriptors, sync_sites, wait_until_ready, RetryPolicy, SyncOutcome};
