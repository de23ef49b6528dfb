use crate::error::{DevCertError, Result};

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
///
/// Lines end with `\n` and the base64 body wraps at 64 columns.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Convert a PEM‑encoded string to its label and DER‑encoded bytes.
pub fn pem_to_der(pem_str: &str) -> Result<(String, Vec<u8>)> {
    let pem = pem::parse(pem_str).map_err(|e| DevCertError::Decoding(e.to_string()))?;
    Ok((pem.tag().to_string(), pem.contents().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pem_uses_unix_line_endings() {
        let pem = der_to_pem(&[0x30, 0x03, 0x02, 0x01, 0x01], "CERTIFICATE");
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(pem.ends_with("-----END CERTIFICATE-----\n"));
        assert!(!pem.contains('\r'));

        let (label, der) = pem_to_der(&pem).unwrap();
        assert_eq!(label, "CERTIFICATE");
        assert_eq!(der, vec![0x30, 0x03, 0x02, 0x01, 0x01]);
    }

    #[test]
    fn test_garbage_is_a_decoding_error() {
        assert!(matches!(
            pem_to_der("not a pem block"),
            Err(DevCertError::Decoding(_))
        ));
    }
}
