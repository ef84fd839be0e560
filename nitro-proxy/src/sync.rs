//! Readiness handshake and site apply.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use nitro_core::{paths::SITE_UPSTREAM_PORT, Site};

use crate::client::ProxyApi;
use crate::error::ProxyError;
use crate::protocol::{SiteDescriptor, SiteMap};

/// Backoff schedule for the liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub factor: u32,
    /// Total time budget measured from the first probe.
    pub deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            factor: 2,
            deadline: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    fn next_delay(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.factor.max(1))
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No sites declared; the proxy was not contacted.
    Skipped,
    Applied { sites: usize, probes: u32 },
}

/// Build the hostname-keyed payload. Aliases are comma-joined.
pub fn site_descriptors(sites: &[Site]) -> SiteMap {
    sites
        .iter()
        .map(|site| {
            (
                site.hostname.clone(),
                SiteDescriptor {
                    hostname: site.hostname.clone(),
                    aliases: site.aliases.join(","),
                    port: SITE_UPSTREAM_PORT,
                },
            )
        })
        .collect()
}

/// Probe until the proxy answers, backing off between attempts.
///
/// Returns the number of probes sent.
pub async fn wait_until_ready(
    proxy: &dyn ProxyApi,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<u32, ProxyError> {
    let started = Instant::now();
    let mut delay = policy.initial_delay;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let probe = tokio::select! {
            _ = cancel.cancelled() => return Err(ProxyError::Cancelled),
            probe = proxy.ping() => probe,
        };
        match probe {
            Ok(()) => return Ok(attempts),
            Err(err) => tracing::debug!(attempt = attempts, error = %err, "proxy not ready"),
        }

        let waited = started.elapsed();
        if waited >= policy.deadline {
            return Err(ProxyError::ReadinessTimeout { attempts, waited });
        }

        let pause = delay.min(policy.deadline - waited);
        tokio::select! {
            _ = cancel.cancelled() => return Err(ProxyError::Cancelled),
            _ = tokio::time::sleep(pause) => {}
        }
        delay = policy.next_delay(delay);
    }
}

/// Push the declared sites to the proxy.
///
/// An empty site list is a no-op. A response with the error flag set becomes
/// [`ProxyError::Rejected`] carrying the proxy's message.
pub async fn sync_sites(
    proxy: &dyn ProxyApi,
    sites: &[Site],
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<SyncOutcome, ProxyError> {
    let payload = site_descriptors(sites);
    if payload.is_empty() {
        return Ok(SyncOutcome::Skipped);
    }

    let probes = wait_until_ready(proxy, policy, cancel).await?;

    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(ProxyError::Cancelled),
        response = proxy.apply(&payload) => response?,
    };
    if response.error {
        return Err(ProxyError::Rejected(response.message));
    }

    tracing::info!(sites = payload.len(), probes, "proxy updated");
    Ok(SyncOutcome::Applied {
        sites: payload.len(),
        probes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::protocol::ProxyResponse;

    /// Fails the first `failures` pings, then succeeds.
    struct FlakyProxy {
        failures: u32,
        pings: AtomicU32,
        applied: Mutex<Vec<SiteMap>>,
        response: ProxyResponse,
    }

    impl FlakyProxy {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                pings: AtomicU32::new(0),
                applied: Mutex::new(Vec::new()),
                response: ProxyResponse::ok("applied"),
            }
        }
    }

    #[async_trait]
    impl ProxyApi for FlakyProxy {
        async fn ping(&self) -> Result<(), ProxyError> {
            let n = self.pings.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(ProxyError::ConnectionClosed)
            } else {
                Ok(())
            }
        }

        async fn apply(&self, sites: &SiteMap) -> Result<ProxyResponse, ProxyError> {
            self.applied.lock().unwrap().push(sites.clone());
            Ok(self.response.clone())
        }
    }

    fn site(hostname: &str, aliases: &[&str]) -> Site {
        Site {
            hostname: hostname.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            path: PathBuf::from("/code"),
            version: "8.0".to_string(),
            webroot: "web".to_string(),
            xdebug: false,
        }
    }

    #[tokio::test]
    async fn empty_site_list_never_contacts_proxy() {
        let proxy = FlakyProxy::new(0);
        let outcome = sync_sites(&proxy, &[], &RetryPolicy::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Skipped);
        assert_eq!(proxy.pings.load(Ordering::SeqCst), 0);
        assert!(proxy.applied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn payload_has_one_entry_per_site_with_joined_aliases() {
        let proxy = FlakyProxy::new(0);
        sync_sites(
            &proxy,
            &[site("a.test", &["b.test"])],
            &RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let applied = proxy.applied.lock().unwrap();
        assert_eq!(applied.len(), 1);
        let payload = &applied[0];
        assert_eq!(payload.len(), 1);
        let entry = &payload["a.test"];
        assert_eq!(entry.hostname, "a.test");
        assert_eq!(entry.aliases, "b.test");
        assert_eq!(entry.port, SITE_UPSTREAM_PORT);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_proxy_answers() {
        let proxy = FlakyProxy::new(3);
        let outcome = sync_sites(
            &proxy,
            &[site("a.test", &[])],
            &RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, SyncOutcome::Applied { sites: 1, probes: 4 });
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_with_timeout_error_after_deadline() {
        let proxy = FlakyProxy::new(u32::MAX);
        let policy = RetryPolicy {
            deadline: Duration::from_secs(1),
            ..RetryPolicy::default()
        };
        let err = sync_sites(&proxy, &[site("a.test", &[])], &policy, &CancellationToken::new())
            .await
            .unwrap_err();
        let ProxyError::ReadinessTimeout { attempts, waited } = err else {
            panic!("expected ReadinessTimeout, got {err:?}");
        };
        assert!(attempts > 1);
        assert!(waited >= Duration::from_secs(1));
        assert!(proxy.applied.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_probe_loop() {
        let proxy = FlakyProxy::new(u32::MAX);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });
        let err = sync_sites(&proxy, &[site("a.test", &[])], &RetryPolicy::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Cancelled), "got {err:?}");
    }

    #[tokio::test]
    async fn rejection_carries_proxy_message() {
        let mut proxy = FlakyProxy::new(0);
        proxy.response = ProxyResponse::error("bad site");
        let err = sync_sites(
            &proxy,
            &[site("a.test", &[])],
            &RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(&err, ProxyError::Rejected(m) if m == "bad site"));
        assert_eq!(err.to_string(), "unable to update the proxy, bad site");
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy::default();
        let mut d = policy.initial_delay;
        for _ in 0..20 {
            d = policy.next_delay(d);
        }
        assert_eq!(d, policy.max_delay);
    }
}
