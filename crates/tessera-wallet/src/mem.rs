//! In-memory wallet for tests and ephemeral identities.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tessera_core::{Identity, Result, TesseraError, Wallet};

/// A wallet held entirely in process memory.
///
/// The map sits behind a single mutex, which makes the exists-then-put
/// sequence inside [`Wallet::put`] atomic.
#[derive(Debug, Default)]
pub struct MemoryWallet {
    entries: Mutex<HashMap<String, Identity>>,
}

impl MemoryWallet {
    /// Create an empty wallet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Identity>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Wallet for MemoryWallet {
    fn exists(&self, label: &str) -> Result<bool> {
        Ok(self.lock().contains_key(label))
    }

    fn get(&self, label: &str) -> Result<Identity> {
        self.lock()
            .get(label)
            .cloned()
            .ok_or_else(|| TesseraError::NotFound {
                label: label.to_string(),
            })
    }

    fn put(&self, identity: &Identity) -> Result<()> {
        let mut entries = self.lock();
        if entries.contains_key(&identity.label) {
            return Err(TesseraError::AlreadyExists {
                label: identity.label.clone(),
            });
        }
        entries.insert(identity.label.clone(), identity.clone());
        Ok(())
    }

    fn put_overwrite(&self, identity: &Identity) -> Result<()> {
        self.lock()
            .insert(identity.label.clone(), identity.clone());
        Ok(())
    }

    fn remove(&self, label: &str) -> Result<()> {
        self.lock()
            .remove(label)
            .map(|_| ())
            .ok_or_else(|| TesseraError::NotFound {
                label: label.to_string(),
            })
    }

    fn labels(&self) -> Result<Vec<String>> {
        let mut labels: Vec<String> = self.lock().keys().cloned().collect();
        labels.sort();
        Ok(labels)
    }
}
