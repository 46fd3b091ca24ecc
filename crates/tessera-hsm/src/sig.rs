//! Signature and key encoding at the token boundary.
//!
//! PKCS#11 tokens return ECDSA signatures as raw `r || s` and public keys as
//! a DER OCTET STRING wrapping the SEC1 point. Everything downstream (CSRs,
//! CA authorization tokens, X.509 verification) expects ASN.1 DER, so the
//! conversions live here.

use tessera_core::{Result, TesseraError};

/// Convert a raw `r || s` ECDSA signature into an ASN.1 DER
/// `ECDSA-Sig-Value` (SEQUENCE of two INTEGERs).
pub fn raw_ecdsa_to_der(raw: &[u8]) -> Result<Vec<u8>> {
    if raw.is_empty() || raw.len() % 2 != 0 {
        return Err(TesseraError::Signing(format!(
            "raw ECDSA signature has invalid length {}",
            raw.len()
        )));
    }
    let half = raw.len() / 2;
    let r = der_integer(&raw[..half]);
    let s = der_integer(&raw[half..]);

    let mut body = Vec::with_capacity(r.len() + s.len());
    body.extend_from_slice(&r);
    body.extend_from_slice(&s);

    let mut out = Vec::with_capacity(body.len() + 4);
    out.push(0x30);
    push_der_length(&mut out, body.len());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Encode a big-endian unsigned integer as a DER INTEGER
fn der_integer(bytes: &[u8]) -> Vec<u8> {
    let mut start = 0;
    while start < bytes.len() - 1 && bytes[start] == 0 {
        start += 1;
    }
    let trimmed = &bytes[start..];

    let needs_pad = trimmed[0] & 0x80 != 0;
    let len = trimmed.len() + usize::from(needs_pad);

    let mut out = Vec::with_capacity(len + 2);
    out.push(0x02);
    push_der_length(&mut out, len);
    if needs_pad {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}

fn push_der_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
    } else {
        // Lengths beyond one byte never occur for P-256 material, but keep
        // the encoder total.
        let bytes = len.to_be_bytes();
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
        out.push(0x80 | (bytes.len() - first) as u8);
        out.extend_from_slice(&bytes[first..]);
    }
}

/// Unwrap a `CKA_EC_POINT` value (DER OCTET STRING) into the uncompressed
/// SEC1 point it contains.
pub fn ec_point_to_sec1(der: &[u8]) -> Result<Vec<u8>> {
    let err = || TesseraError::Certificate(String::from("malformed CKA_EC_POINT value"));

    let (&tag, rest) = der.split_first().ok_or_else(err)?;
    if tag != 0x04 {
        return Err(err());
    }
    let (&len_byte, rest) = rest.split_first().ok_or_else(err)?;
    let (len, rest) = if len_byte < 0x80 {
        (usize::from(len_byte), rest)
    } else {
        let n = usize::from(len_byte & 0x7f);
        if n == 0 || n > rest.len() || n > std::mem::size_of::<usize>() {
            return Err(err());
        }
        let mut len = 0usize;
        for &b in &rest[..n] {
            len = (len << 8) | usize::from(b);
        }
        (len, &rest[n..])
    };
    if rest.len() != len {
        return Err(err());
    }
    // Contents must be an uncompressed point: 0x04 || X || Y
    if rest.first() != Some(&0x04) {
        return Err(err());
    }
    Ok(rest.to_vec())
}
