//! HTTP client for the certificate authority enrollment API.
//!
//! This crate provides [`CaClient`] for registering and enrolling ledger
//! identities: registration creates a pending identity and yields a one-time
//! secret, enrollment exchanges that secret for a signed certificate. Key
//! pairs come from an injected [`tessera_core::KeyProvider`], so enrollment
//! works identically for software keys and HSM-resident keys.

mod cert;
mod client;
mod csr;
mod token;

pub use cert::{parse_metadata, CertificateMetadata};
pub use client::{CaClient, CaClientBuilder, IssuedCertificate};
pub use csr::generate_csr;
pub use token::authorization_token;
pub use tessera_core::{Result, TesseraError};
