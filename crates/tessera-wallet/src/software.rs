//! In-process key provider: P-256 keys generated and used on the host.
//!
//! The software variant exists for identities that do not need hardware
//! protection (tests, throwaway networks, TLS-profile enrollments). Key
//! material is carried in the wallet entry as PKCS#8 PEM.

use rcgen::KeyPair as RcgenKeyPair;
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair as _, ECDSA_P256_SHA256_ASN1_SIGNING};
use tessera_core::{
    Identity, KeyMaterial, KeyProvider, Result, SignatureScheme, Signer, TesseraError,
};

/// Key provider that generates and signs with in-process P-256 keys
#[derive(Debug, Default)]
pub struct SoftwareKeyProvider;

impl SoftwareKeyProvider {
    /// Create a software key provider
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Build a signer directly from PKCS#8 PEM key material.
    ///
    /// Used for credentials that never enter a wallet, such as TLS-profile
    /// enrollments.
    pub fn signer_from_pem(key_pem: &str) -> Result<SoftwareSigner> {
        SoftwareSigner::from_pkcs8_pem(key_pem)
    }
}

impl KeyProvider for SoftwareKeyProvider {
    fn generate_key(&self, _label: &str) -> Result<KeyMaterial> {
        let key_pair = RcgenKeyPair::generate()
            .map_err(|e| TesseraError::Signing(format!("key generation failed: {e}")))?;
        Ok(KeyMaterial::Pem(key_pair.serialize_pem()))
    }

    fn signer(&self, identity: &Identity) -> Result<Box<dyn Signer>> {
        match &identity.key {
            KeyMaterial::Pem(pem) => Ok(Box::new(SoftwareSigner::from_pkcs8_pem(pem)?)),
            KeyMaterial::HsmRef(_) => Err(TesseraError::KeyMismatch(format!(
                "identity {} holds an HSM key reference; use the PKCS#11 provider",
                identity.label
            ))),
        }
    }
}

/// ECDSA P-256 signer over an in-process key
pub struct SoftwareSigner {
    key_pair: EcdsaKeyPair,
    public_key: Vec<u8>,
    rng: SystemRandom,
}

impl SoftwareSigner {
    /// Parse a signer from a PKCS#8 PEM private key
    pub fn from_pkcs8_pem(key_pem: &str) -> Result<Self> {
        let block = pem::parse(key_pem)
            .map_err(|e| TesseraError::Signing(format!("invalid key PEM: {e}")))?;
        let rng = SystemRandom::new();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, block.contents(), &rng)
                .map_err(|e| TesseraError::Signing(format!("invalid PKCS#8 key: {e}")))?;
        let public_key = key_pair.public_key().as_ref().to_vec();
        Ok(Self {
            key_pair,
            public_key,
            rng,
        })
    }
}

impl Signer for SoftwareSigner {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature = self
            .key_pair
            .sign(&self.rng, message)
            .map_err(|e| TesseraError::Signing(e.to_string()))?;
        Ok(signature.as_ref().to_vec())
    }

    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::EcdsaP256Sha256
    }
}
