//! Core types and traits for the Tessera ledger identity toolkit.
//!
//! This crate provides the foundational pieces used across the workspace:
//!
//! - **Types**: identities, key material, enrollment requests, and the
//!   network connection profile
//! - **Traits**: the [`Wallet`], [`KeyProvider`], and [`Signer`] seams
//! - **Errors**: the shared taxonomy in [`TesseraError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_core::{Identity, KeyMaterial, Result};
//!
//! fn describe(identity: &Identity) -> Result<()> {
//!     println!("{} ({})", identity.label, identity.msp_id);
//!     Ok(())
//! }
//! ```

mod error;
pub mod traits;
pub mod types;

pub use error::{Result, TesseraError};
pub use traits::{KeyProvider, SignatureScheme, Signer, Wallet};
pub use types::*;
