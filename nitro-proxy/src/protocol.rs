//! Wire format: one JSON object per line in each direction.
//!
//! ```text
//! > {"cmd":"ping"}
//! < {"error":false,"message":"pong"}
//! > {"cmd":"apply","sites":{"a.test":{"hostname":"a.test","aliases":"b.test","port":8080}}}
//! < {"error":false,"message":"applied 1 sites"}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sites keyed by hostname.
pub type SiteMap = BTreeMap<String, SiteDescriptor>;

/// One routable site as the proxy sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub hostname: String,
    /// Comma-joined alias list; empty when the site has none.
    pub aliases: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum ProxyRequest {
    Ping,
    Apply { sites: SiteMap },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
}

impl ProxyResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_serializes_as_tagged_command() {
        let json = serde_json::to_string(&ProxyRequest::Ping).unwrap();
        assert_eq!(json, r#"{"cmd":"ping"}"#);
    }

    #[test]
    fn apply_carries_sites_by_hostname() {
        let mut sites = SiteMap::new();
        sites.insert(
            "a.test".to_string(),
            SiteDescriptor {
                hostname: "a.test".to_string(),
                aliases: "b.test".to_string(),
                port: 8080,
            },
        );
        let json = serde_json::to_value(ProxyRequest::Apply { sites }).unwrap();
        assert_eq!(json["cmd"], "apply");
        assert_eq!(json["sites"]["a.test"]["aliases"], "b.test");
        assert_eq!(json["sites"]["a.test"]["port"], 8080);
    }

    #[test]
    fn response_defaults_missing_fields() {
        let resp: ProxyResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp, ProxyResponse::ok(""));
    }
}
