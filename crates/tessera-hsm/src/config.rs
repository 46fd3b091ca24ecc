//! Token connection settings.

use std::env;
use std::fmt;
use std::path::PathBuf;

use tessera_core::{Result, TesseraError};

/// Environment variable naming the PKCS#11 module path
pub const ENV_LIBRARY: &str = "TESSERA_PKCS11_LIB";
/// Environment variable naming the token slot
pub const ENV_SLOT: &str = "TESSERA_PKCS11_SLOT";
/// Environment variable carrying the user PIN
pub const ENV_PIN: &str = "TESSERA_PKCS11_PIN";

/// Connection settings for a PKCS#11 token.
///
/// The PIN has no default: a missing PIN is a configuration error, never a
/// fallback to a well-known value. The `Debug` impl redacts it.
#[derive(Clone)]
pub struct HsmConfig {
    /// Path to the PKCS#11 shared library
    pub library_path: PathBuf,

    /// Slot identifier; matched against token slot IDs first, then treated
    /// as an index into the token-bearing slot list
    pub slot: u64,

    /// User PIN for the token
    pub pin: String,
}

impl HsmConfig {
    /// Build a config from explicit values
    pub fn new(library_path: impl Into<PathBuf>, slot: u64, pin: impl Into<String>) -> Result<Self> {
        let pin = pin.into();
        if pin.is_empty() {
            return Err(TesseraError::Config(String::from("token PIN must not be empty")));
        }
        Ok(Self {
            library_path: library_path.into(),
            slot,
            pin,
        })
    }

    /// Read the config from the environment.
    ///
    /// Fails closed: every variable is required. In particular an unset PIN
    /// is an error, not an invitation to default.
    pub fn from_env() -> Result<Self> {
        let library_path = require_env(ENV_LIBRARY)?;
        let slot = require_env(ENV_SLOT)?
            .parse::<u64>()
            .map_err(|e| TesseraError::Config(format!("{ENV_SLOT} is not a slot number: {e}")))?;
        let pin = require_env(ENV_PIN)?;
        Self::new(library_path, slot, pin)
    }
}

fn require_env(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| TesseraError::Config(format!("required environment variable {name} is unset")))
}

impl fmt::Debug for HsmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HsmConfig")
            .field("library_path", &self.library_path)
            .field("slot", &self.slot)
            .field("pin", &"<redacted>")
            .finish()
    }
}
