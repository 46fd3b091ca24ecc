//! Identity lifecycle orchestration: register, enroll, store.

use tessera_ca::CaClient;
use tessera_core::{
    EnrollmentRequest, KeyProvider, RegistrationRequest, Result, TesseraError, TlsCredential,
    Wallet,
};
use tracing::{debug, info};

/// Drives the register → enroll → wallet flow.
///
/// Explicitly constructed from its collaborators and explicitly passed
/// around; there are no process-wide instances. The same manager works for
/// software wallets and HSM-backed wallets — the difference lives entirely
/// in the injected [`KeyProvider`].
pub struct IdentityManager<W, P> {
    ca: CaClient,
    wallet: W,
    provider: P,
}

impl<W: Wallet, P: KeyProvider> IdentityManager<W, P> {
    /// Build a manager from its collaborators
    pub const fn new(ca: CaClient, wallet: W, provider: P) -> Self {
        Self {
            ca,
            wallet,
            provider,
        }
    }

    /// The wallet this manager populates
    pub const fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Enroll an identity and store it under its label.
    ///
    /// Fails with `AlreadyExists` if the label is taken; enrollment errors
    /// from the CA surface unmodified.
    pub async fn enroll_to_wallet(&self, label: &str, secret: &str, msp_id: &str) -> Result<()> {
        let request = EnrollmentRequest::new(label, secret);
        let identity = self.ca.enroll(&request, msp_id, &self.provider).await?;
        self.wallet.put(&identity)?;
        info!(label, msp_id, "enrolled identity into wallet");
        Ok(())
    }

    /// Enroll only when the wallet has no entry for the label.
    ///
    /// Returns true when an enrollment was performed. Calling this twice for
    /// the same label enrolls at most once; losing a concurrent race to
    /// another enroller counts as "already present", not as a failure.
    pub async fn ensure_enrolled(&self, label: &str, secret: &str, msp_id: &str) -> Result<bool> {
        if self.wallet.exists(label)? {
            debug!(label, "wallet entry present, skipping enrollment");
            return Ok(false);
        }
        match self.enroll_to_wallet(label, secret, msp_id).await {
            Ok(()) => Ok(true),
            Err(TesseraError::AlreadyExists { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Register a new identity with the CA, authorized by a registrar
    /// identity from the wallet.
    ///
    /// Returns the enrollment secret (CA-generated when `secret` is `None`).
    pub async fn register_user(
        &self,
        label: &str,
        secret: Option<&str>,
        registrar_label: &str,
    ) -> Result<String> {
        let registrar = self.wallet.get(registrar_label)?;
        let signer = self.provider.signer(&registrar)?;

        let mut request = RegistrationRequest::new(label);
        if let Some(secret) = secret {
            request = request.secret(secret);
        }
        self.ca
            .register(&request, &registrar.certificate, signer.as_ref())
            .await
    }

    /// Make sure a registered-and-enrolled identity exists under the label.
    ///
    /// The whole flow is skipped when the wallet already has the entry, so
    /// repeated calls register and enroll at most once.
    pub async fn ensure_user(
        &self,
        label: &str,
        msp_id: &str,
        registrar_label: &str,
    ) -> Result<bool> {
        if self.wallet.exists(label)? {
            debug!(label, "wallet entry present, skipping registration");
            return Ok(false);
        }
        let secret = self.register_user(label, None, registrar_label).await?;
        match self.enroll_to_wallet(label, &secret, msp_id).await {
            Ok(()) => Ok(true),
            Err(TesseraError::AlreadyExists { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// TLS-profile enrollment for transport credentials.
    ///
    /// The credential is returned to the caller and deliberately not stored:
    /// a TLS certificate must never stand in for a signing identity.
    pub async fn tls_enroll(&self, id: &str, secret: &str) -> Result<TlsCredential> {
        let request = EnrollmentRequest::new(id, secret).tls();
        self.ca.enroll_tls(&request).await
    }

    /// Re-enroll an existing identity, replacing its wallet entry.
    ///
    /// The old entry is swapped out wholesale; entries are never mutated in
    /// place.
    pub async fn re_enroll(&self, label: &str, secret: &str, msp_id: &str) -> Result<()> {
        let request = EnrollmentRequest::new(label, secret);
        let identity = self.ca.enroll(&request, msp_id, &self.provider).await?;
        self.wallet.put_overwrite(&identity)?;
        info!(label, "re-enrolled identity, wallet entry replaced");
        Ok(())
    }
}
