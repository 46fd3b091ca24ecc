use crate::{Result, TesseraError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Network connection profile: the externally-supplied JSON topology document
/// describing organizations, CAs, peers, and channels.
///
/// Loaded once at startup and consumed read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Profile name
    #[serde(default)]
    pub name: Option<String>,

    /// Profile format version
    #[serde(default)]
    pub version: Option<String>,

    /// Channel name -> channel topology
    #[serde(default)]
    pub channels: HashMap<String, ChannelInfo>,

    /// Organization name -> organization description
    #[serde(default)]
    pub organizations: HashMap<String, OrganizationInfo>,

    /// CA name -> CA endpoint description
    #[serde(default, rename = "certificateAuthorities")]
    pub certificate_authorities: HashMap<String, CaInfo>,

    /// Peer name -> endpoint URL
    #[serde(default)]
    pub peers: HashMap<String, EndpointInfo>,

    /// Orderer name -> endpoint URL
    #[serde(default)]
    pub orderers: HashMap<String, EndpointInfo>,
}

/// Channel membership as listed in the profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Peer names participating in the channel
    #[serde(default)]
    pub peers: HashMap<String, serde_json::Value>,

    /// Orderer names serving the channel
    #[serde(default)]
    pub orderers: Vec<String>,
}

/// One organization in the network topology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationInfo {
    /// MSP ID used on the ledger for this organization
    pub mspid: String,

    /// Peers owned by this organization
    #[serde(default)]
    pub peers: Vec<String>,

    /// CAs serving this organization, in preference order
    #[serde(default, rename = "certificateAuthorities")]
    pub certificate_authorities: Vec<String>,
}

/// A certificate authority endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaInfo {
    /// Base URL of the CA REST endpoint
    pub url: String,

    /// CA instance name, sent with every request
    #[serde(default, rename = "caName")]
    pub ca_name: Option<String>,

    /// Whether to verify the CA's TLS certificate
    #[serde(default = "default_verify", rename = "httpOptions")]
    pub http_options: HttpOptions,

    /// Trusted root certificates for the CA's TLS endpoint
    #[serde(default, rename = "tlsCACerts")]
    pub tls_ca_certs: Option<PemBundle>,
}

/// HTTP-level options for a CA endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpOptions {
    /// Verify the server certificate (false only for test networks)
    #[serde(default = "default_true")]
    pub verify: bool,
}

/// Inline PEM material in a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PemBundle {
    /// PEM-encoded certificates
    #[serde(default)]
    pub pem: String,
}

/// A gRPC endpoint entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointInfo {
    /// Endpoint URL
    pub url: String,
}

const fn default_true() -> bool {
    true
}

fn default_verify() -> HttpOptions {
    HttpOptions { verify: true }
}

impl ConnectionProfile {
    /// Parse a profile from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(TesseraError::Json)
    }

    /// Load a profile from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Look up an organization by name
    pub fn organization(&self, name: &str) -> Result<&OrganizationInfo> {
        self.organizations
            .get(name)
            .ok_or_else(|| TesseraError::Config(format!("unknown organization: {name}")))
    }

    /// Resolve the first CA serving the named organization
    pub fn ca_for_org(&self, org: &str) -> Result<&CaInfo> {
        let org_info = self.organization(org)?;
        let ca_name = org_info
            .certificate_authorities
            .first()
            .ok_or_else(|| TesseraError::Config(format!("organization {org} lists no CA")))?;
        self.certificate_authorities
            .get(ca_name)
            .ok_or_else(|| TesseraError::Config(format!("unknown CA: {ca_name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"{
        "name": "test-network",
        "version": "1.0",
        "channels": { "mychannel": { "peers": { "peer0.org1.example.com": {} } } },
        "organizations": {
            "Org1": {
                "mspid": "Org1MSP",
                "peers": ["peer0.org1.example.com"],
                "certificateAuthorities": ["ca-org1"]
            }
        },
        "certificateAuthorities": {
            "ca-org1": {
                "url": "https://ca.org1.example.com:7054",
                "caName": "ca-org1",
                "httpOptions": { "verify": false }
            }
        },
        "peers": { "peer0.org1.example.com": { "url": "grpcs://peer0.org1.example.com:7051" } }
    }"#;

    #[test]
    fn test_parse_profile() {
        let profile = ConnectionProfile::from_json(PROFILE).unwrap();
        assert_eq!(profile.name.as_deref(), Some("test-network"));
        assert_eq!(profile.organization("Org1").unwrap().mspid, "Org1MSP");
        assert!(profile.channels.contains_key("mychannel"));
    }

    #[test]
    fn test_ca_resolution() {
        let profile = ConnectionProfile::from_json(PROFILE).unwrap();
        let ca = profile.ca_for_org("Org1").unwrap();
        assert_eq!(ca.url, "https://ca.org1.example.com:7054");
        assert_eq!(ca.ca_name.as_deref(), Some("ca-org1"));
        assert!(!ca.http_options.verify);
    }

    #[test]
    fn test_unknown_org_is_config_error() {
        let profile = ConnectionProfile::from_json(PROFILE).unwrap();
        let err = profile.organization("Org9").unwrap_err();
        assert!(matches!(err, TesseraError::Config(_)));
    }
}
