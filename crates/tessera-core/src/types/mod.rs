//! Strongly-typed domain objects shared across the workspace.

mod enrollment;
mod identity;
mod profile;

pub use enrollment::{EnrollmentProfile, EnrollmentRequest, RegistrationRequest};
pub use identity::{Identity, KeyMaterial, TlsCredential};
pub use profile::{
    CaInfo, ChannelInfo, ConnectionProfile, EndpointInfo, HttpOptions, OrganizationInfo, PemBundle,
};
