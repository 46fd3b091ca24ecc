//! Enrollment API client implementation.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tessera_core::{
    CaInfo, EnrollmentProfile, EnrollmentRequest, Identity, KeyProvider, RegistrationRequest,
    Result, Signer, TesseraError, TlsCredential,
};
use tracing::{debug, warn};

use crate::cert::parse_metadata;
use crate::csr::generate_csr;
use crate::token::authorization_token;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Enrollment endpoint path
const ENROLL_PATH: &str = "/api/v1/enroll";

/// Registration endpoint path
const REGISTER_PATH: &str = "/api/v1/register";

/// CA error code for registering an already-registered identity
const CA_ERR_DUPLICATE_IDENTITY: i64 = 63;

/// CA error code for an authorization failure
const CA_ERR_AUTHORIZATION: i64 = 20;

/// Client for the certificate authority's REST enrollment API.
///
/// Calls are never retried: enrollment secrets are one-time, and re-sending
/// after a partial failure has undefined semantics. Every CA failure is
/// surfaced to the caller carrying the CA's own message.
#[derive(Clone)]
pub struct CaClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: String,
    ca_name: Option<String>,
    timeout: Duration,
}

impl CaClient {
    /// Create a client with default settings for the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        CaClientBuilder::new(base_url).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> CaClientBuilder {
        CaClientBuilder::new(base_url)
    }

    /// Build a client from a connection-profile CA entry
    #[must_use]
    pub fn from_profile(ca: &CaInfo) -> Self {
        let mut builder = CaClientBuilder::new(ca.url.clone());
        if let Some(name) = &ca.ca_name {
            builder = builder.ca_name(name.clone());
        }
        if !ca.http_options.verify {
            builder = builder.danger_accept_invalid_certs();
        }
        builder.build()
    }

    /// Register a new identity with the CA, authorized by a registrar.
    ///
    /// Returns the enrollment secret — the one supplied in the request, or a
    /// CA-generated one when the request carried none. Fails with
    /// `DuplicateIdentity` if the ID is already registered and `Unauthorized`
    /// if the registrar lacks registrar rights.
    pub async fn register(
        &self,
        request: &RegistrationRequest,
        registrar_cert: &str,
        registrar_signer: &dyn Signer,
    ) -> Result<String> {
        let payload = RegisterPayload {
            id: &request.id,
            identity_type: &request.identity_type,
            secret: request.secret.as_deref(),
            affiliation: &request.affiliation,
            caname: self.inner.ca_name.as_deref(),
        };
        let body = serde_json::to_vec(&payload)?;
        let token = authorization_token(registrar_cert, registrar_signer, &body)?;

        let url = format!("{}{REGISTER_PATH}", self.inner.base_url);
        debug!(url = %url, id = %request.id, "POST register");
        let response = self
            .inner
            .http
            .post(&url)
            .header("Authorization", token)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let result: RegisterResult = self.handle_response(&request.id, response).await?;
        if result.secret.is_empty() {
            return Err(TesseraError::Ca {
                code: 0,
                message: String::from("CA returned an empty enrollment secret"),
            });
        }
        Ok(result.secret)
    }

    /// Exchange a one-time secret for a signed certificate.
    ///
    /// The key pair comes from `provider` — an opaque token reference in HSM
    /// mode — and the CSR is signed through it, so private key material
    /// never passes through this call.
    pub async fn enroll(
        &self,
        request: &EnrollmentRequest,
        msp_id: &str,
        provider: &dyn KeyProvider,
    ) -> Result<Identity> {
        let material = provider.generate_key(&request.id)?;
        // Certificate is filled in below once issuance succeeds.
        let mut identity = Identity::new(&request.id, msp_id, "", material);
        let signer = provider.signer(&identity)?;
        let csr = generate_csr(&request.id, signer)?;

        let issued = self.enroll_csr(request, &csr).await?;
        let meta = parse_metadata(&issued.certificate)?;
        identity.certificate = issued.certificate;
        identity.serial = Some(meta.serial);
        identity.not_after = Some(meta.not_after);
        Ok(identity)
    }

    /// TLS-profile enrollment: issue a transport credential.
    ///
    /// A fresh in-process key is generated regardless of wallet mode; the
    /// credential must be transportable, and it never enters a signing
    /// wallet.
    pub async fn enroll_tls(&self, request: &EnrollmentRequest) -> Result<TlsCredential> {
        let key_pair = rcgen::KeyPair::generate()
            .map_err(|e| TesseraError::Csr(format!("TLS key generation failed: {e}")))?;
        let mut params = rcgen::CertificateParams::default();
        let mut dn = rcgen::DistinguishedName::new();
        dn.push(rcgen::DnType::CommonName, request.id.clone());
        params.distinguished_name = dn;
        let csr = params
            .serialize_request(&key_pair)
            .map_err(|e| TesseraError::Csr(e.to_string()))?
            .pem()
            .map_err(|e| TesseraError::Csr(e.to_string()))?;

        let tls_request = EnrollmentRequest {
            id: request.id.clone(),
            secret: request.secret.clone(),
            profile: EnrollmentProfile::Tls,
        };
        let issued = self.enroll_csr(&tls_request, &csr).await?;
        Ok(TlsCredential {
            certificate: issued.certificate,
            key: key_pair.serialize_pem(),
            ca_chain: issued.ca_chain,
        })
    }

    /// Wire-level enrollment: submit a finished CSR
    pub async fn enroll_csr(
        &self,
        request: &EnrollmentRequest,
        csr_pem: &str,
    ) -> Result<IssuedCertificate> {
        let payload = EnrollPayload {
            certificate_request: csr_pem,
            profile: request.profile.wire_value(),
            caname: self.inner.ca_name.as_deref(),
        };

        let url = format!("{}{ENROLL_PATH}", self.inner.base_url);
        debug!(url = %url, id = %request.id, profile = ?request.profile, "POST enroll");
        let response = self
            .inner
            .http
            .post(&url)
            .basic_auth(&request.id, Some(&request.secret))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let result: EnrollResult = self.handle_response(&request.id, response).await?;

        let certificate = decode_pem_field(&result.cert)?;
        let ca_chain = result
            .server_info
            .map(|info| decode_pem_field(&info.ca_chain))
            .transpose()?
            .unwrap_or_default();
        Ok(IssuedCertificate {
            certificate,
            ca_chain,
        })
    }

    /// Parse a CA response envelope, mapping failures into the taxonomy
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        id: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TesseraError::Http(e.to_string()))?;

        let envelope: CaEnvelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if status == 401 => return Err(TesseraError::Unauthorized),
            Err(_) => {
                return Err(TesseraError::Http(format!(
                    "CA returned status {status} with unparseable body"
                )))
            }
        };

        if envelope.success {
            if let Some(result) = envelope.result {
                return Ok(result);
            }
        }
        Err(Self::envelope_error(id, status, envelope.errors))
    }

    fn envelope_error(id: &str, status: u16, errors: Vec<CaErrorEntry>) -> TesseraError {
        if let Some(first) = errors.into_iter().next() {
            warn!(id, code = first.code, message = %first.message, "CA request failed");
            if first.code == CA_ERR_DUPLICATE_IDENTITY
                || first.message.contains("already registered")
            {
                return TesseraError::DuplicateIdentity { id: id.to_string() };
            }
            if first.code == CA_ERR_AUTHORIZATION || status == 401 {
                return TesseraError::Unauthorized;
            }
            return TesseraError::Ca {
                code: first.code,
                message: first.message,
            };
        }
        if status == 401 {
            TesseraError::Unauthorized
        } else {
            TesseraError::Http(format!("CA returned status {status} with no error detail"))
        }
    }

    fn map_transport(&self, e: reqwest::Error) -> TesseraError {
        if e.is_timeout() {
            TesseraError::Timeout(self.inner.timeout.as_secs())
        } else if e.is_connect() {
            TesseraError::Connection(e.to_string())
        } else {
            TesseraError::Http(e.to_string())
        }
    }
}

/// A certificate issued by the CA, with its trust chain
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    /// End-entity certificate, PEM-encoded
    pub certificate: String,
    /// Issuing chain, PEM-encoded; empty when the CA omitted it
    pub ca_chain: String,
}

/// The CA transmits PEM payloads base64-wrapped inside the JSON envelope
fn decode_pem_field(b64: &str) -> Result<String> {
    let bytes = B64
        .decode(b64.trim())
        .map_err(|e| TesseraError::Certificate(format!("invalid base64 in CA response: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| TesseraError::Certificate(format!("CA response is not UTF-8 PEM: {e}")))
}

#[derive(Serialize)]
struct EnrollPayload<'a> {
    certificate_request: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    profile: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caname: Option<&'a str>,
}

#[derive(Serialize)]
struct RegisterPayload<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    identity_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<&'a str>,
    affiliation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caname: Option<&'a str>,
}

#[derive(Deserialize)]
struct CaEnvelope<T> {
    #[serde(default)]
    success: bool,
    result: Option<T>,
    #[serde(default)]
    errors: Vec<CaErrorEntry>,
}

#[derive(Deserialize)]
struct CaErrorEntry {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct EnrollResult {
    #[serde(rename = "Cert")]
    cert: String,
    #[serde(rename = "ServerInfo", default)]
    server_info: Option<ServerInfo>,
}

#[derive(Deserialize)]
struct ServerInfo {
    #[serde(rename = "CAChain", default)]
    ca_chain: String,
}

#[derive(Deserialize)]
struct RegisterResult {
    #[serde(default)]
    secret: String,
}

/// Builder for configuring a [`CaClient`]
pub struct CaClientBuilder {
    base_url: String,
    ca_name: Option<String>,
    timeout: Duration,
    accept_invalid_certs: bool,
    root_cert_pem: Option<String>,
}

impl CaClientBuilder {
    /// Create a new builder for the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            ca_name: None,
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
            root_cert_pem: None,
        }
    }

    /// Name of the CA instance to address within the server
    #[must_use]
    pub fn ca_name(mut self, name: impl Into<String>) -> Self {
        self.ca_name = Some(name.into());
        self
    }

    /// Caller-supplied request timeout; CA endpoints may be unreachable and
    /// calls must not block indefinitely
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skip TLS verification of the CA endpoint. Test networks only.
    #[must_use]
    pub const fn danger_accept_invalid_certs(mut self) -> Self {
        self.accept_invalid_certs = true;
        self
    }

    /// Trust an additional root certificate for the CA's TLS endpoint
    #[must_use]
    pub fn root_cert_pem(mut self, pem: impl Into<String>) -> Self {
        self.root_cert_pem = Some(pem.into());
        self
    }

    /// Build the client
    #[must_use]
    pub fn build(self) -> CaClient {
        let mut http = HttpClient::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs);
        if let Some(pem) = &self.root_cert_pem {
            if let Ok(cert) = reqwest::Certificate::from_pem(pem.as_bytes()) {
                http = http.add_root_certificate(cert);
            } else {
                warn!("ignoring unparseable CA root certificate");
            }
        }
        let http = http.build().expect("failed to build HTTP client");

        CaClient {
            inner: Arc::new(ClientInner {
                http,
                base_url: self.base_url,
                ca_name: self.ca_name,
                timeout: self.timeout,
            }),
        }
    }
}
