use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::{io_err, ProxyError};
use crate::protocol::{ProxyRequest, ProxyResponse, SiteMap};

/// The two operations the proxy exposes.
#[async_trait]
pub trait ProxyApi: Send + Sync {
    /// Liveness probe. `Ok` means the proxy is accepting updates.
    async fn ping(&self) -> Result<(), ProxyError>;

    /// Replace the proxy's routing table with `sites`.
    async fn apply(&self, sites: &SiteMap) -> Result<ProxyResponse, ProxyError>;
}

/// JSON-lines client over a fresh TCP connection per request.
#[derive(Debug, Clone)]
pub struct TcpProxyClient {
    addr: String,
    request_timeout: Duration,
}

impl TcpProxyClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// `127.0.0.1:<port>`
    pub fn local(port: u16) -> Self {
        Self::new(format!("127.0.0.1:{port}"))
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send one request and read one response line.
    pub async fn send(&self, request: &ProxyRequest) -> Result<ProxyResponse, ProxyError> {
        tokio::time::timeout(self.request_timeout, self.round_trip(request))
            .await
            .map_err(|_| ProxyError::RequestTimeout {
                addr: self.addr.clone(),
                timeout: self.request_timeout,
            })?
    }

    async fn round_trip(&self, request: &ProxyRequest) -> Result<ProxyResponse, ProxyError> {
        let mut stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| io_err(&self.addr, e))?;

        let mut payload = serde_json::to_vec(request)?;
        payload.push(b'\n');
        stream
            .write_all(&payload)
            .await
            .map_err(|e| io_err(&self.addr, e))?;
        stream.flush().await.map_err(|e| io_err(&self.addr, e))?;

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| io_err(&self.addr, e))?;
        if read == 0 {
            return Err(ProxyError::ConnectionClosed);
        }

        Ok(serde_json::from_str(line.trim_end())?)
    }
}

#[async_trait]
impl ProxyApi for TcpProxyClient {
    async fn ping(&self) -> Result<(), ProxyError> {
        let response = self.send(&ProxyRequest::Ping).await?;
        if response.error {
            return Err(ProxyError::Rejected(response.message));
        }
        Ok(())
    }

    async fn apply(&self, sites: &SiteMap) -> Result<ProxyResponse, ProxyError> {
        self.send(&ProxyRequest::Apply {
            sites: sites.clone(),
        })
        .await
    }
}
