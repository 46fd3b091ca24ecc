//! PKCS#11 hardware token key provider.
//!
//! Wraps a PKCS#11 module (SoftHSM2, or a real HSM) behind the
//! [`tessera_core::KeyProvider`] seam. Private keys are generated and used
//! inside the token; the host process only ever sees labels, public points,
//! and signatures.
//!
//! Key facts:
//! - one session per provider, opened lazily, serialized behind a mutex
//! - keys are identified by `CKA_LABEL` and persist across restarts
//! - the PIN comes from configuration that fails closed when unset, and is
//!   never logged

mod config;
mod provider;
mod sig;

pub use config::{HsmConfig, ENV_LIBRARY, ENV_PIN, ENV_SLOT};
pub use provider::{HsmSigner, Pkcs11KeyProvider};
pub use sig::{ec_point_to_sec1, raw_ecdsa_to_der};
