use serde::{Deserialize, Serialize};

/// Which CA issuance path an enrollment uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentProfile {
    /// MSP enrollment: certificate usable for transaction signing
    #[default]
    Default,
    /// TLS enrollment: certificate scoped to transport authentication only
    Tls,
}

impl EnrollmentProfile {
    /// The profile string the CA expects on the wire; empty selects the
    /// default issuance path
    #[must_use]
    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Tls => "tls",
        }
    }
}

/// Parameters for an enrollment call: a one-time secret exchanged for a
/// signed certificate
#[derive(Debug, Clone)]
pub struct EnrollmentRequest {
    /// Enrollment ID registered with the CA
    pub id: String,

    /// One-time enrollment secret
    pub secret: String,

    /// Issuance path
    pub profile: EnrollmentProfile,
}

impl EnrollmentRequest {
    /// Build a default-profile enrollment request
    #[must_use]
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            profile: EnrollmentProfile::Default,
        }
    }

    /// Select the TLS issuance path
    #[must_use]
    pub const fn tls(mut self) -> Self {
        self.profile = EnrollmentProfile::Tls;
        self
    }
}

/// Parameters for registering a new identity with the CA
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Enrollment ID to create
    pub id: String,

    /// Enrollment secret; when `None` the CA generates one and returns it
    pub secret: Option<String>,

    /// Identity type as understood by the CA
    pub identity_type: String,

    /// Affiliation path within the organization
    pub affiliation: String,
}

impl RegistrationRequest {
    /// Register a client identity with a CA-generated secret
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: None,
            identity_type: String::from("client"),
            affiliation: String::new(),
        }
    }

    /// Supply a caller-chosen enrollment secret
    #[must_use]
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set the affiliation path
    #[must_use]
    pub fn affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = affiliation.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_wire_values() {
        assert_eq!(EnrollmentProfile::Default.wire_value(), "");
        assert_eq!(EnrollmentProfile::Tls.wire_value(), "tls");
    }

    #[test]
    fn test_request_builders() {
        let req = EnrollmentRequest::new("admin", "adminpw").tls();
        assert_eq!(req.profile, EnrollmentProfile::Tls);

        let reg = RegistrationRequest::new("hsm-user11").affiliation("org1.department1");
        assert!(reg.secret.is_none());
        assert_eq!(reg.identity_type, "client");
        assert_eq!(reg.affiliation, "org1.department1");
    }
}
