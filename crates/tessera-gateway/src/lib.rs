//! Consumed contract for the ledger gateway.
//!
//! The gateway itself — channel discovery, endorsement collection, commit
//! waiting — is owned by the ledger platform SDK and is not reimplemented
//! here. This crate defines the traits a gateway implementation must satisfy
//! so the identity layer can hand over a wallet identity and drive
//! submit/evaluate calls against a deployed chaincode.

use async_trait::async_trait;
use tessera_core::{ConnectionProfile, Identity, Result, TlsCredential, Wallet};

/// Options for opening a gateway session.
///
/// The identity is resolved from the wallet at connect time; connecting with
/// an unknown label fails with `NotFound` before any network activity.
pub struct ConnectOptions<'a> {
    /// Wallet holding the signing identity
    pub wallet: &'a dyn Wallet,

    /// Label of the identity to sign transactions with
    pub identity_label: &'a str,

    /// Transport credential from a TLS-profile enrollment, when the network
    /// requires mutual TLS
    pub tls: Option<&'a TlsCredential>,

    /// Whether to use service discovery for the channel topology
    pub discovery: bool,
}

impl ConnectOptions<'_> {
    /// Resolve the signing identity from the wallet
    pub fn resolve_identity(&self) -> Result<Identity> {
        self.wallet.get(self.identity_label)
    }
}

/// Opens sessions against a ledger network
#[async_trait]
pub trait GatewayConnector: Send + Sync {
    /// Session type produced by this connector
    type Session: GatewaySession;

    /// Connect to the network described by the profile.
    ///
    /// Fails with `Connection` when no peer or orderer endpoint is
    /// reachable.
    async fn connect(
        &self,
        profile: &ConnectionProfile,
        options: ConnectOptions<'_>,
    ) -> Result<Self::Session>;
}

/// An open connection bound to one identity
#[async_trait]
pub trait GatewaySession: Send + Sync {
    /// Contract handle type produced by this session
    type Contract: Contract;

    /// Get a handle to a chaincode deployed on a channel
    async fn contract(&self, channel: &str, chaincode: &str) -> Result<Self::Contract>;
}

/// A deployed chaincode reachable through a session
#[async_trait]
pub trait Contract: Send + Sync {
    /// Submit a transaction for endorsement and commit.
    ///
    /// Returns the chaincode's response payload, which may be empty. Fails
    /// with `Endorsement` when peers reject the proposal and `Commit` when
    /// ordering or validation fails.
    async fn submit(&self, transaction: &str, args: &[&str]) -> Result<Vec<u8>>;

    /// Evaluate a transaction on a single peer without committing.
    ///
    /// Fails with `Query` on chaincode or peer errors.
    async fn evaluate(&self, transaction: &str, args: &[&str]) -> Result<Vec<u8>>;
}
