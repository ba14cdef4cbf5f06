//! PEM decoding.

use base64::Engine;

use crate::error::CryptoError;

/// Extracts the DER payload of the first PEM block with the given label.
///
/// # Errors
///
/// Returns an error if no block with `label` is present or its body is not
/// valid base64.
pub fn pem_to_der(pem: &str, label: &str) -> Result<Vec<u8>, CryptoError> {
    let begin = format!("-----BEGIN {label}-----");
    let end = format!("-----END {label}-----");

    let start = pem
        .find(&begin)
        .map(|pos| pos + begin.len())
        .ok_or_else(|| CryptoError::InvalidPem(format!("no {label} block")))?;
    let end_pos = pem[start..]
        .find(&end)
        .map(|pos| start + pos)
        .ok_or_else(|| CryptoError::InvalidPem(format!("unterminated {label} block")))?;

    let b64_data: String = pem[start..end_pos]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    base64::engine::general_purpose::STANDARD
        .decode(b64_data)
        .map_err(|e| CryptoError::InvalidPem(e.to_string()))
}
