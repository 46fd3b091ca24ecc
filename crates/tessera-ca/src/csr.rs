//! Certificate signing request construction.
//!
//! CSRs are built with `rcgen` over a remote key pair so the same path works
//! for software keys and token-resident keys: the signer abstraction does the
//! signing, and HSM keys never leave the token.

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, RemoteKeyPair};
use tessera_core::{Result, Signer, TesseraError};

struct RemoteSigner {
    signer: Box<dyn Signer>,
    public_key: Vec<u8>,
}

impl RemoteKeyPair for RemoteSigner {
    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    fn sign(&self, msg: &[u8]) -> std::result::Result<Vec<u8>, rcgen::Error> {
        self.signer
            .sign(msg)
            .map_err(|_| rcgen::Error::RemoteKeyError)
    }

    fn algorithm(&self) -> &'static rcgen::SignatureAlgorithm {
        &rcgen::PKCS_ECDSA_P256_SHA256
    }
}

/// Build a PEM-encoded CSR for the given subject, signed by `signer`
pub fn generate_csr(common_name: &str, signer: Box<dyn Signer>) -> Result<String> {
    let public_key = signer.public_key().to_vec();
    let remote = RemoteSigner { signer, public_key };
    let key_pair = KeyPair::from_remote(Box::new(remote))
        .map_err(|e| TesseraError::Csr(e.to_string()))?;

    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;

    let csr = params
        .serialize_request(&key_pair)
        .map_err(|e| TesseraError::Csr(e.to_string()))?;
    csr.pem().map_err(|e| TesseraError::Csr(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Identity, KeyProvider};
    use tessera_wallet::SoftwareKeyProvider;

    #[test]
    fn test_csr_generation_with_software_signer() {
        let provider = SoftwareKeyProvider::new();
        let material = provider.generate_key("hsm-user11").unwrap();
        let identity = Identity::new("hsm-user11", "Org1MSP", "", material);
        let signer = provider.signer(&identity).unwrap();

        let csr = generate_csr("hsm-user11", signer).unwrap();
        assert!(csr.contains("BEGIN CERTIFICATE REQUEST"));
    }
}
