pub mod extensions;
pub mod params;

use der::{Decode, DecodePem, Encode, EncodePem};
use extensions::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, KeyUsages, SubjectAltName, SubjectKeyIdentifier,
    ToAndFromX509Extension,
};
use log::debug;
use params::{CertificateTemplate, DistinguishedName, ExtensionParam, Validity};
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;

use crate::error::{DevCertError, Result};
use crate::key::{KeyPair, PublicKey};
use crate::tbs_certificate::TbsCertificate;

/// Represents the supported signature algorithms for certificates.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption.
    Sha256WithRSA,
    /// SHA-224 with ECDSA, used for P-224 keys.
    Sha224WithECDSA,
    /// SHA-256 with ECDSA.
    Sha256WithECDSA,
    /// SHA-384 with ECDSA.
    Sha384WithECDSA,
    /// SHA-512 with ECDSA.
    Sha512WithECDSA,
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RSA identifiers carry an explicit NULL parameter; ECDSA identifiers carry none.
    fn from(value: SignatureAlgorithm) -> Self {
        let (oid, parameters) = match value {
            SignatureAlgorithm::Sha256WithRSA => (
                const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                Some(der::asn1::Any::null()),
            ),
            SignatureAlgorithm::Sha224WithECDSA => (const_oid::db::rfc5912::ECDSA_WITH_SHA_224, None),
            SignatureAlgorithm::Sha256WithECDSA => (const_oid::db::rfc5912::ECDSA_WITH_SHA_256, None),
            SignatureAlgorithm::Sha384WithECDSA => (const_oid::db::rfc5912::ECDSA_WITH_SHA_384, None),
            SignatureAlgorithm::Sha512WithECDSA => (const_oid::db::rfc5912::ECDSA_WITH_SHA_512, None),
        };
        x509_cert::spki::AlgorithmIdentifierOwned { oid, parameters }
    }
}

impl TryFrom<&x509_cert::spki::AlgorithmIdentifierOwned> for SignatureAlgorithm {
    type Error = DevCertError;

    fn try_from(value: &x509_cert::spki::AlgorithmIdentifierOwned) -> Result<Self> {
        match value.oid {
            const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION => Ok(Self::Sha256WithRSA),
            const_oid::db::rfc5912::ECDSA_WITH_SHA_224 => Ok(Self::Sha224WithECDSA),
            const_oid::db::rfc5912::ECDSA_WITH_SHA_256 => Ok(Self::Sha256WithECDSA),
            const_oid::db::rfc5912::ECDSA_WITH_SHA_384 => Ok(Self::Sha384WithECDSA),
            const_oid::db::rfc5912::ECDSA_WITH_SHA_512 => Ok(Self::Sha512WithECDSA),
            other => Err(DevCertError::Decoding(format!(
                "Unsupported signature algorithm {other}"
            ))),
        }
    }
}

/// Represents an X.509 certificate.
///
/// This struct provides methods to encode the certificate into DER or PEM formats.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| DevCertError::CertificateCreation(e.to_string()))
    }

    /// Encodes the certificate into a `CERTIFICATE` PEM block.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(pkcs8::LineEnding::LF)
            .map_err(|e| DevCertError::CertificateCreation(e.to_string()))
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner =
            CertificateInner::from_der(der).map_err(|e| DevCertError::Decoding(e.to_string()))?;
        Ok(Self { inner })
    }

    pub fn from_pem(pem: &str) -> Result<Self> {
        let inner = CertificateInner::from_pem(pem.as_bytes())
            .map_err(|e| DevCertError::Decoding(e.to_string()))?;
        Ok(Self { inner })
    }

    /// The public key the certificate was issued for.
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.tbs_certificate.subject_public_key_info)
    }

    pub fn signature_algorithm(&self) -> Result<SignatureAlgorithm> {
        SignatureAlgorithm::try_from(&self.inner.signature_algorithm)
    }

    /// Extracts the certificate fields back into a `CertificateTemplate`.
    pub fn to_template(&self) -> Result<CertificateTemplate> {
        let tbs = &self.inner.tbs_certificate;

        let extensions: Vec<ExtensionParam> = tbs
            .extensions
            .iter()
            .flatten()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect();
        let find = |oid| extensions.iter().find(|ext| ext.oid == oid);

        let key_usage = match find(KeyUsage::OID) {
            Some(ext) => ext.to_extension::<KeyUsage>()?.0,
            None => Default::default(),
        };
        let extended_key_usage = match find(ExtendedKeyUsage::OID) {
            Some(ext) => ext.to_extension::<ExtendedKeyUsage>()?.usage,
            None => Vec::new(),
        };
        let basic_constraints = find(BasicConstraints::OID)
            .map(|ext| ext.to_extension::<BasicConstraints>())
            .transpose()?;
        let san = match find(SubjectAltName::OID) {
            Some(ext) => ext.to_extension::<SubjectAltName>()?,
            None => SubjectAltName::default(),
        };

        let validity = Validity {
            not_before: OffsetDateTime::from(tbs.validity.not_before.to_system_time()),
            not_after: OffsetDateTime::from(tbs.validity.not_after.to_system_time()),
        };

        Ok(CertificateTemplate {
            serial_number: strip_leading_zeros(tbs.serial_number.as_bytes()).to_vec(),
            subject: DistinguishedName::from_x509_name(&tbs.subject),
            validity,
            key_usage,
            extended_key_usage,
            basic_constraints_valid: basic_constraints.is_some(),
            is_ca: basic_constraints.is_some_and(|bc| bc.is_ca),
            dns_names: san.dns_names,
            ip_addresses: san.ip_addresses,
        })
    }

    /// Issuer distinguished name as written in the certificate.
    pub fn issuer(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    /// Creates a new self-signed certificate.
    ///
    /// The template is used both as the certificate being issued and as its issuer, and the
    /// signature is made with `key`.
    pub fn new_self_signed(template: &CertificateTemplate, key: &KeyPair) -> Result<Self> {
        let subject_public_key = key.public_key();
        let spki = subject_public_key.to_spki()?;

        let mut extensions = Vec::new();
        let mut key_usage = template.key_usage;
        if template.is_ca {
            key_usage |= KeyUsages::KeyCertSign;
        }
        if !key_usage.is_empty() {
            extensions.push(ExtensionParam::from_extension(KeyUsage(key_usage), true)?);
        }
        if !template.extended_key_usage.is_empty() {
            let eku = ExtendedKeyUsage {
                usage: template.extended_key_usage.clone(),
            };
            extensions.push(ExtensionParam::from_extension(eku, false)?);
        }
        if template.is_ca {
            let ski =
                SubjectKeyIdentifier::from_public_key_bits(spki.subject_public_key.raw_bytes());
            extensions.push(ExtensionParam::from_extension(ski, false)?);
        }
        if template.basic_constraints_valid {
            let basic_constraints = BasicConstraints {
                is_ca: template.is_ca,
                max_path_length: None,
            };
            extensions.push(ExtensionParam::from_extension(basic_constraints, true)?);
        }
        let san = SubjectAltName {
            dns_names: template.dns_names.clone(),
            ip_addresses: template.ip_addresses.clone(),
        };
        if !san.is_empty() {
            extensions.push(ExtensionParam::from_extension(san, false)?);
        }

        let tbs_cert = TbsCertificate {
            serial_number: template.serial_number.clone(),
            signature_algorithm: key.signature_algorithm(),
            issuer: template.subject.clone(),
            not_before: template.validity.not_before,
            not_after: template.validity.not_after,
            subject: template.subject.clone(),
            subject_public_key,
            extensions,
        };
        debug!(
            "signing certificate for dns names {:?} and ip addresses {:?}",
            template.dns_names, template.ip_addresses
        );
        tbs_cert.sign(key)
    }
}

pub(crate) fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(bytes.len().saturating_sub(1));
    &bytes[start..]
}
