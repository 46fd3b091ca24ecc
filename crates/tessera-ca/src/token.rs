//! Registrar authorization tokens.
//!
//! Registration calls are authorized by proof of possession: the request body
//! is signed with the registrar's enrollment key, and the token carries the
//! registrar certificate plus the signature. Format:
//!
//! ```text
//! b64(cert PEM) . b64( sign( b64(body) . b64(cert PEM) ) )
//! ```

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use tessera_core::{Result, Signer};

/// Build the authorization header value for a signed CA request
pub fn authorization_token(cert_pem: &str, signer: &dyn Signer, body: &[u8]) -> Result<String> {
    let cert_b64 = B64.encode(cert_pem.as_bytes());
    let body_b64 = B64.encode(body);
    let payload = format!("{body_b64}.{cert_b64}");
    let signature = signer.sign(payload.as_bytes())?;
    Ok(format!("{cert_b64}.{}", B64.encode(signature)))
}
