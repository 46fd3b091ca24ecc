//! Metadata extraction from issued certificates.

use chrono::{DateTime, Utc};
use tessera_core::{Result, TesseraError};
use x509_parser::prelude::{FromDer, X509Certificate};

/// Fields pulled from an issued enrollment certificate
#[derive(Debug, Clone)]
pub struct CertificateMetadata {
    /// Serial number, lowercase hex
    pub serial: String,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// Subject common name, when present
    pub subject_cn: Option<String>,
}

/// Parse the first certificate in a PEM document
pub fn parse_metadata(cert_pem: &str) -> Result<CertificateMetadata> {
    let block = pem::parse(cert_pem)
        .map_err(|e| TesseraError::Certificate(format!("invalid certificate PEM: {e}")))?;
    let (_, cert) = X509Certificate::from_der(block.contents())
        .map_err(|e| TesseraError::Certificate(format!("invalid X.509 DER: {e}")))?;

    let not_before = timestamp(cert.validity().not_before.timestamp())?;
    let not_after = timestamp(cert.validity().not_after.timestamp())?;
    let subject_cn = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(String::from);

    Ok(CertificateMetadata {
        serial: cert.tbs_certificate.serial.to_str_radix(16),
        not_before,
        not_after,
        subject_cn,
    })
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| TesseraError::Certificate(String::from("certificate validity out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn self_signed(common_name: &str) -> String {
        let key = rcgen::KeyPair::generate().unwrap();
        let mut params = rcgen::CertificateParams::default();
        let mut dn = rcgen::DistinguishedName::new();
        dn.push(rcgen::DnType::CommonName, common_name);
        params.distinguished_name = dn;
        params.self_signed(&key).unwrap().pem()
    }

    #[test]
    fn test_parse_issued_certificate() {
        let pem = self_signed("hsm-user11");
        let meta = parse_metadata(&pem).unwrap();
        assert_eq!(meta.subject_cn.as_deref(), Some("hsm-user11"));
        assert!(meta.not_after > meta.not_before);
        assert!(!meta.serial.is_empty());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_metadata("not a certificate").is_err());
        assert!(matches!(
            parse_metadata("not a certificate").unwrap_err(),
            TesseraError::Certificate(_)
        ));
    }
}
