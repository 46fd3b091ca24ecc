use thiserror::Error;

/// Result type alias for Tessera operations
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Errors that can occur across the identity, CA, HSM, and gateway layers
#[derive(Error, Debug)]
pub enum TesseraError {
    /// A wallet entry already exists under this label
    #[error("identity already exists in wallet: {label}")]
    AlreadyExists {
        /// Label of the conflicting entry
        label: String,
    },

    /// No wallet entry under this label
    #[error("identity not found in wallet: {label}")]
    NotFound {
        /// Label that was looked up
        label: String,
    },

    /// The CA already has a registration for this enrollment ID
    #[error("identity is already registered with the CA: {id}")]
    DuplicateIdentity {
        /// Enrollment ID that was already registered
        id: String,
    },

    /// The acting identity lacks the rights for this CA operation
    #[error("authorization failed: caller lacks registrar rights")]
    Unauthorized,

    /// The PKCS#11 library or slot could not be opened
    #[error("cryptographic token unavailable: {0}")]
    TokenUnavailable(String),

    /// The token rejected the PIN
    #[error("token authentication failed: PIN rejected")]
    AuthenticationFailed,

    /// Gateway connection could not be established
    #[error("gateway connection failed: {0}")]
    Connection(String),

    /// Transaction proposal was rejected during endorsement
    #[error("endorsement failed: {0}")]
    Endorsement(String),

    /// Transaction was endorsed but failed to commit
    #[error("commit failed: {0}")]
    Commit(String),

    /// Transaction evaluation (query) failed
    #[error("query failed: {0}")]
    Query(String),

    /// CA returned an error response
    #[error("CA error ({code}): {message}")]
    Ca {
        /// CA-defined error code
        code: i64,
        /// Error message from the CA, verbatim
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wallet or filesystem I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Certificate signing request construction failed
    #[error("CSR generation failed: {0}")]
    Csr(String),

    /// Signing operation failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// Issued certificate could not be parsed
    #[error("certificate parse error: {0}")]
    Certificate(String),

    /// A key provider was handed key material it cannot use
    #[error("key material mismatch: {0}")]
    KeyMismatch(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl TesseraError {
    /// Returns true if the error means "the thing is already there" — the
    /// ensure-present flows treat these as a completed precondition, not a
    /// failure to recover from
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists { .. } | Self::DuplicateIdentity { .. }
        )
    }

    /// Returns true if the error came from the CA or the transport to it
    #[must_use]
    pub const fn is_ca_error(&self) -> bool {
        matches!(
            self,
            Self::Ca { .. }
                | Self::DuplicateIdentity { .. }
                | Self::Unauthorized
                | Self::Http(_)
                | Self::Timeout(_)
        )
    }

    /// Returns true if the error came from the cryptographic token
    #[must_use]
    pub const fn is_token_error(&self) -> bool {
        matches!(self, Self::TokenUnavailable(_) | Self::AuthenticationFailed)
    }

    /// Returns true for transaction-phase failures surfaced by the gateway
    #[must_use]
    pub const fn is_transaction_error(&self) -> bool {
        matches!(
            self,
            Self::Endorsement(_) | Self::Commit(_) | Self::Query(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_classification() {
        let err = TesseraError::AlreadyExists {
            label: "admin".into(),
        };
        assert!(err.is_conflict());
        assert!(!err.is_ca_error());

        let err = TesseraError::DuplicateIdentity {
            id: "hsm-user11".into(),
        };
        assert!(err.is_conflict());
        assert!(err.is_ca_error());
    }

    #[test]
    fn test_token_classification() {
        assert!(TesseraError::AuthenticationFailed.is_token_error());
        assert!(TesseraError::TokenUnavailable("no slot".into()).is_token_error());
        assert!(!TesseraError::Unauthorized.is_token_error());
    }

    #[test]
    fn test_display_carries_ca_message() {
        let err = TesseraError::Ca {
            code: 63,
            message: "Identity 'x' is already registered".into(),
        };
        let text = err.to_string();
        assert!(text.contains("63"));
        assert!(text.contains("already registered"));
    }
}
