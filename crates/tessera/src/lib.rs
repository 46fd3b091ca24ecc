//! Credential issuance and HSM-backed wallet management for permissioned
//! ledger clients.
//!
//! Tessera covers the identity side of talking to a distributed ledger:
//!
//! - **Wallets** ([`FileWallet`], [`MemoryWallet`]) persist enrolled
//!   identities keyed by label
//! - **Key providers** ([`SoftwareKeyProvider`], [`Pkcs11KeyProvider`])
//!   decide where private keys live — in-process or inside a PKCS#11 token
//! - **[`CaClient`]** speaks the CA's registration/enrollment protocol
//! - **[`IdentityManager`]** ties them together into idempotent
//!   register-and-enroll flows
//! - **[`tessera_gateway`]** traits describe the ledger gateway this crate
//!   hands identities to
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera::{CaClient, FileWallet, IdentityManager, Pkcs11KeyProvider, HsmConfig};
//!
//! let wallet = FileWallet::open("./wallet")?;
//! let provider = Pkcs11KeyProvider::new(HsmConfig::from_env()?)?;
//! let ca = CaClient::builder("https://ca.org1.example.com:7054")
//!     .ca_name("ca-org1")
//!     .build();
//! let manager = IdentityManager::new(ca, wallet, provider);
//!
//! manager.ensure_enrolled("admin", "adminpw", "Org1MSP").await?;
//! manager.ensure_user("hsm-user11", "Org1MSP", "admin").await?;
//! ```

mod manager;

pub use manager::IdentityManager;
pub use tessera_ca::{CaClient, CaClientBuilder, IssuedCertificate};
pub use tessera_core::{
    ConnectionProfile, EnrollmentProfile, EnrollmentRequest, Identity, KeyMaterial, KeyProvider,
    RegistrationRequest, Result, SignatureScheme, Signer, TesseraError, TlsCredential, Wallet,
};
pub use tessera_gateway::{ConnectOptions, Contract, GatewayConnector, GatewaySession};
pub use tessera_hsm::{HsmConfig, Pkcs11KeyProvider};
pub use tessera_wallet::{FileWallet, MemoryWallet, SoftwareKeyProvider};
