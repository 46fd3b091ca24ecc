//! Filesystem-backed wallet: one JSON document per identity label.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tessera_core::{Identity, Result, TesseraError, Wallet};
use tracing::debug;

/// Extension used for identity files inside the wallet directory
const IDENTITY_EXT: &str = "id";

/// A wallet persisted as a directory of JSON files.
///
/// `put` relies on `O_CREAT|O_EXCL` semantics so that concurrent enrollment
/// attempts for the same label serialize in the filesystem: exactly one
/// caller wins, the rest see `AlreadyExists`.
#[derive(Debug, Clone)]
pub struct FileWallet {
    dir: PathBuf,
}

impl FileWallet {
    /// Open a wallet at the given directory, creating it if absent
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory backing this wallet
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, label: &str) -> Result<PathBuf> {
        validate_label(label)?;
        Ok(self.dir.join(format!("{label}.{IDENTITY_EXT}")))
    }
}

/// Labels become file names, so restrict them to a safe character set
fn validate_label(label: &str) -> Result<()> {
    let ok = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !label.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(TesseraError::Config(format!("invalid wallet label: {label:?}")))
    }
}

impl Wallet for FileWallet {
    fn exists(&self, label: &str) -> Result<bool> {
        Ok(self.entry_path(label)?.is_file())
    }

    fn get(&self, label: &str) -> Result<Identity> {
        let path = self.entry_path(label)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                TesseraError::NotFound {
                    label: label.to_string(),
                }
            } else {
                TesseraError::Io(e)
            }
        })?;
        serde_json::from_str(&content).map_err(TesseraError::Json)
    }

    fn put(&self, identity: &Identity) -> Result<()> {
        let path = self.entry_path(&identity.label)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    TesseraError::AlreadyExists {
                        label: identity.label.clone(),
                    }
                } else {
                    TesseraError::Io(e)
                }
            })?;
        file.write_all(&serde_json::to_vec_pretty(identity)?)?;
        file.sync_all()?;
        debug!(label = %identity.label, "stored wallet identity");
        Ok(())
    }

    fn put_overwrite(&self, identity: &Identity) -> Result<()> {
        let path = self.entry_path(&identity.label)?;
        // Write-then-rename so readers never observe a partial entry.
        let tmp = self.dir.join(format!(".{}.tmp", identity.label));
        fs::write(&tmp, serde_json::to_vec_pretty(identity)?)?;
        fs::rename(&tmp, &path)?;
        debug!(label = %identity.label, "replaced wallet identity");
        Ok(())
    }

    fn remove(&self, label: &str) -> Result<()> {
        let path = self.entry_path(label)?;
        fs::remove_file(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                TesseraError::NotFound {
                    label: label.to_string(),
                }
            } else {
                TesseraError::Io(e)
            }
        })
    }

    fn labels(&self) -> Result<Vec<String>> {
        let mut labels = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(IDENTITY_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    labels.push(stem.to_string());
                }
            }
        }
        labels.sort();
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::KeyMaterial;

    fn identity(label: &str) -> Identity {
        Identity::new(
            label,
            "Org1MSP",
            "-----BEGIN CERTIFICATE-----\ntest\n-----END CERTIFICATE-----\n",
            KeyMaterial::HsmRef(label.to_string()),
        )
    }

    #[test]
    fn test_put_get_exists() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = FileWallet::open(dir.path()).unwrap();

        assert!(!wallet.exists("admin").unwrap());
        wallet.put(&identity("admin")).unwrap();
        assert!(wallet.exists("admin").unwrap());

        let loaded = wallet.get("admin").unwrap();
        assert_eq!(loaded.label, "admin");
        assert_eq!(loaded.msp_id, "Org1MSP");
    }

    #[test]
    fn test_put_duplicate_fails() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = FileWallet::open(dir.path()).unwrap();

        wallet.put(&identity("admin")).unwrap();
        let err = wallet.put(&identity("admin")).unwrap_err();
        assert!(matches!(err, TesseraError::AlreadyExists { label } if label == "admin"));
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = FileWallet::open(dir.path()).unwrap();
        let err = wallet.get("nobody").unwrap_err();
        assert!(matches!(err, TesseraError::NotFound { label } if label == "nobody"));
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = FileWallet::open(dir.path()).unwrap();

        wallet.put(&identity("user")).unwrap();
        let mut replacement = identity("user");
        replacement.msp_id = String::from("Org2MSP");
        wallet.put_overwrite(&replacement).unwrap();

        assert_eq!(wallet.get("user").unwrap().msp_id, "Org2MSP");
    }

    #[test]
    fn test_concurrent_put_single_winner() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = FileWallet::open(dir.path()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let wallet = wallet.clone();
                std::thread::spawn(move || wallet.put(&identity("raced")).is_ok())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert!(wallet.exists("raced").unwrap());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let wallet = FileWallet::open(dir.path()).unwrap();
            wallet.put(&identity("hsm-user11")).unwrap();
        }
        let wallet = FileWallet::open(dir.path()).unwrap();
        assert_eq!(wallet.labels().unwrap(), vec!["hsm-user11".to_string()]);
    }

    #[test]
    fn test_label_with_path_separator_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = FileWallet::open(dir.path()).unwrap();
        assert!(wallet.exists("../escape").is_err());
        assert!(wallet.get("a/b").is_err());
    }
}
