//! Trait seams between the wallet, key providers, and callers.

use crate::{Identity, KeyMaterial, Result};

/// Signature algorithm a [`Signer`] produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// ECDSA over P-256 with SHA-256, ASN.1 DER signature encoding
    EcdsaP256Sha256,
}

/// Signs on behalf of one identity.
///
/// Implementations never expose private key bytes: an HSM-backed signer holds
/// only a token handle, a software signer keeps its key internal.
pub trait Signer: Send + Sync {
    /// Sign a message, returning an ASN.1 DER-encoded signature.
    ///
    /// The signer hashes internally; callers pass the raw message.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// Uncompressed SEC1 public key point
    fn public_key(&self) -> &[u8];

    /// Algorithm this signer produces
    fn scheme(&self) -> SignatureScheme;
}

/// Generates keys and produces signers for identities.
///
/// Two variants exist: an in-process software provider and a PKCS#11
/// HSM-backed provider. A wallet is parameterized by one of them.
pub trait KeyProvider: Send + Sync {
    /// Generate a key pair for a new enrollment, or load an existing one
    /// when the backing store already has a key under this label.
    ///
    /// The returned material is what gets persisted in the wallet entry; for
    /// HSM providers it is an opaque reference, never raw key bytes.
    fn generate_key(&self, label: &str) -> Result<KeyMaterial>;

    /// Produce a signer for an enrolled identity.
    ///
    /// Fails with [`crate::TesseraError::KeyMismatch`] when the identity's
    /// key material belongs to the other provider variant.
    fn signer(&self, identity: &Identity) -> Result<Box<dyn Signer>>;
}

/// Persistent mapping from label to enrolled identity.
///
/// `put` is the concurrency-sensitive operation: enrollment flows do an
/// exists-check followed by a put, so the store must make the create atomic —
/// at most one winner for a given label, the loser sees `AlreadyExists`.
pub trait Wallet: Send + Sync {
    /// Whether an entry exists under the label
    fn exists(&self, label: &str) -> Result<bool>;

    /// Fetch an entry, failing with `NotFound` when absent
    fn get(&self, label: &str) -> Result<Identity>;

    /// Insert a new entry; fails with `AlreadyExists` if the label is taken
    fn put(&self, identity: &Identity) -> Result<()>;

    /// Replace any existing entry under the identity's label.
    ///
    /// Used by re-enrollment: the old entry is replaced wholesale, never
    /// mutated in place.
    fn put_overwrite(&self, identity: &Identity) -> Result<()>;

    /// Remove an entry, failing with `NotFound` when absent
    fn remove(&self, label: &str) -> Result<()>;

    /// All labels currently present
    fn labels(&self) -> Result<Vec<String>>;
}
