//! Wallet stores and the in-process key provider.
//!
//! Two [`tessera_core::Wallet`] implementations live here:
//!
//! - [`FileWallet`]: a directory of JSON documents, one per identity, with
//!   atomic create semantics for race-free enrollment
//! - [`MemoryWallet`]: a mutexed map for tests and ephemeral use
//!
//! plus [`SoftwareKeyProvider`], the non-HSM key provider variant.

mod fs;
mod mem;
mod software;

pub use fs::FileWallet;
pub use mem::MemoryWallet;
pub use software::{SoftwareKeyProvider, SoftwareSigner};
pub use tessera_core::{Result, TesseraError, Wallet};
