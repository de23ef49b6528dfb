use std::net::IpAddr;

use bon::Builder;
use const_oid::ObjectIdentifier;
use der::flagset::FlagSet;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use x509_cert::name::RdnSequence;

use super::extensions::{KeyUsages, ToAndFromX509Extension};
pub use crate::cert::extensions::ExtendedKeyUsageOption;
use crate::error::{DevCertError, Result};

/// Organization placed in the subject and issuer of every generated certificate.
pub const PLACEHOLDER_ORGANIZATION: &str = "Acme Co";

/// Validity used when the caller does not ask for one.
pub const DEFAULT_VALID_FOR: Duration = Duration::days(365);

/// Everything that goes into a certificate before it is signed.
///
/// # Fields
/// * `serial_number` - Unsigned big-endian serial number.
/// * `subject` - The distinguished name of the subject; also used as the issuer.
/// * `validity` - The `notBefore`/`notAfter` window.
/// * `key_usage` - Key usage bits.
/// * `extended_key_usage` - Extended key usage purposes.
/// * `basic_constraints_valid` - Whether the basic constraints extension is emitted.
/// * `is_ca` - Whether the certificate is its own certificate authority.
/// * `dns_names` - DNS subject alternative names.
/// * `ip_addresses` - IP address subject alternative names.
#[derive(Clone, Debug, Builder)]
pub struct CertificateTemplate {
    pub serial_number: Vec<u8>,
    #[builder(default = DistinguishedName::placeholder())]
    pub subject: DistinguishedName,
    pub validity: Validity,
    #[builder(default = KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment)]
    pub key_usage: FlagSet<KeyUsages>,
    #[builder(default = vec![ExtendedKeyUsageOption::ServerAuth])]
    pub extended_key_usage: Vec<ExtendedKeyUsageOption>,
    #[builder(default = true)]
    pub basic_constraints_valid: bool,
    #[builder(default)]
    pub is_ca: bool,
    #[builder(default)]
    pub dns_names: Vec<String>,
    #[builder(default)]
    pub ip_addresses: Vec<IpAddr>,
}

/// Subject alternative names taken from a comma-separated host list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostNames {
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
}

impl HostNames {
    /// Splits `hosts` on commas and sorts every trimmed token into IP addresses or DNS names.
    ///
    /// Tokens that parse as an IPv4 or IPv6 literal become IP addresses, everything else is a
    /// DNS name. Empty tokens are skipped and the order of the input is kept.
    pub fn parse(hosts: &str) -> Self {
        let mut names = Self::default();
        for token in hosts.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.parse::<IpAddr>() {
                Ok(ip) => names.ip_addresses.push(ip),
                Err(_) => names.dns_names.push(token.to_string()),
            }
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.dns_names.is_empty() && self.ip_addresses.is_empty()
    }
}

/// Distinguished name parameters for building an X.509 certificate.
///
/// Only the attributes that are set end up in the encoded name.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: Option<String>,
    pub organization: Option<String>,
}

impl DistinguishedName {
    /// The fixed `O=Acme Co` name used for both subject and issuer.
    pub fn placeholder() -> Self {
        Self {
            common_name: None,
            organization: Some(PLACEHOLDER_ORGANIZATION.to_string()),
        }
    }

    /// Converts the distinguished name to an X.509-compatible format.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName> {
        use core::str::FromStr;
        let mut attrs = Vec::new();
        if let Some(cn) = &self.common_name {
            attrs.push(format!("CN={}", escape_rfc4514(cn)));
        }
        if let Some(o) = &self.organization {
            attrs.push(format!("O={}", escape_rfc4514(o)));
        }
        RdnSequence::from_str(&attrs.join(","))
            .map_err(|e| DevCertError::CertificateCreation(format!("invalid name: {e}")))
    }

    /// Creates a `DistinguishedName` from an X.509-compatible format.
    ///
    /// Attributes other than CN and O are ignored.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Self {
        let mut name = Self::default();
        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let Ok(value) = attr.value.decode_as::<String>() else {
                    continue;
                };
                if attr.oid == const_oid::db::rfc4519::CN {
                    name.common_name = Some(value);
                } else if attr.oid == const_oid::db::rfc4519::O {
                    name.organization = Some(value);
                }
            }
        }
        name
    }
}

fn escape_rfc4514(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Certificate validity period.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Result<Self> {
        Self::starting_at(now_utc(), Duration::days(days))
    }

    /// Creates a validity period of `valid_for` starting at `not_before`.
    ///
    /// Fails with [`DevCertError::InvalidValidFor`] when `valid_for` is negative or the end of
    /// the window is not a representable date.
    pub fn starting_at(not_before: OffsetDateTime, valid_for: Duration) -> Result<Self> {
        if valid_for.is_negative() {
            return Err(DevCertError::InvalidValidFor(format!(
                "{valid_for} is negative"
            )));
        }
        let not_after = not_before.checked_add(valid_for).ok_or_else(|| {
            DevCertError::InvalidValidFor(format!(
                "{valid_for} from {not_before} is out of range"
            ))
        })?;
        Ok(Self {
            not_before,
            not_after,
        })
    }

    /// Builds the validity window from the textual start and the duration of an options value.
    ///
    /// An empty `valid_from` means now and a zero `valid_for` means [`DEFAULT_VALID_FOR`].
    pub fn from_options(valid_from: &str, valid_for: Duration) -> Result<Self> {
        let not_before = if valid_from.is_empty() {
            now_utc()
        } else {
            parse_valid_from(valid_from)?
        };
        let valid_for = if valid_for.is_zero() {
            DEFAULT_VALID_FOR
        } else {
            valid_for
        };
        Self::starting_at(not_before, valid_for)
    }

    pub fn duration(&self) -> Duration {
        self.not_after - self.not_before
    }
}

/// Current time truncated to whole seconds, the resolution of certificate times.
fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

/// Parses a validity start such as `Jan 2 15:04:05 2011`, interpreted as UTC.
pub fn parse_valid_from(value: &str) -> Result<OffsetDateTime> {
    let format = format_description!(
        "[month repr:short case_sensitive:false] [day padding:none] [hour padding:none]:[minute]:[second] [year]"
    );
    PrimitiveDateTime::parse(value.trim(), format)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| DevCertError::InvalidValidFromFormat {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: E, critical: bool) -> Result<Self> {
        let value = extension.to_x509_extension_value()?;
        Ok(Self {
            oid: E::OID,
            critical,
            value,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_hosts_are_classified_in_order() {
        let names = HostNames::parse("example.com, 127.0.0.1,localhost,::1,0.0.0.0");
        assert_eq!(names.dns_names, vec!["example.com", "localhost"]);
        assert_eq!(
            names.ip_addresses,
            vec![
                "127.0.0.1".parse::<IpAddr>().unwrap(),
                "::1".parse().unwrap(),
                "0.0.0.0".parse().unwrap(),
            ]
        );
    }

    #[test]
    fn test_blank_host_list_is_empty() {
        assert!(HostNames::parse("").is_empty());
        assert!(HostNames::parse(" , ,").is_empty());
    }

    #[test]
    fn test_parse_valid_from() {
        assert_eq!(
            parse_valid_from("Jan 1 15:04:05 2011").unwrap(),
            datetime!(2011-01-01 15:04:05 UTC)
        );
        assert_eq!(
            parse_valid_from("Dec 24 09:30:00 2030").unwrap(),
            datetime!(2030-12-24 09:30:00 UTC)
        );
    }

    #[test]
    fn test_parse_valid_from_rejects_other_layouts() {
        for value in ["2011-01-01T15:04:05Z", "Jan 1 2011", "Foo 1 15:04:05 2011"] {
            assert!(matches!(
                parse_valid_from(value),
                Err(DevCertError::InvalidValidFromFormat { .. })
            ));
        }
    }

    #[test]
    fn test_validity_defaults_to_a_year() {
        let validity = Validity::from_options("", Duration::ZERO).unwrap();
        assert_eq!(validity.duration(), Duration::days(365));
        assert_eq!(validity.not_before.nanosecond(), 0);

        let validity = Validity::from_options("Mar 3 00:00:00 2020", Duration::hours(1)).unwrap();
        assert_eq!(validity.not_before, datetime!(2020-03-03 00:00:00 UTC));
        assert_eq!(validity.not_after, datetime!(2020-03-03 01:00:00 UTC));
    }

    #[test]
    fn test_validity_end_out_of_range_is_an_error() {
        let err = Validity::from_options("", Duration::days(5_000_000)).unwrap_err();
        assert!(matches!(err, DevCertError::InvalidValidFor(_)));

        let err = Validity::starting_at(datetime!(9999-12-31 00:00:00 UTC), Duration::days(1))
            .unwrap_err();
        assert!(matches!(err, DevCertError::InvalidValidFor(_)));
    }

    #[test]
    fn test_negative_validity_is_rejected() {
        let err = Validity::from_options("Jan 1 15:04:05 2011", Duration::days(-10)).unwrap_err();
        assert!(matches!(err, DevCertError::InvalidValidFor(ref reason) if reason.contains("negative")));
    }

    #[test]
    fn test_placeholder_name_round_trips() {
        let name = DistinguishedName::placeholder().as_x509_name().unwrap();
        assert_eq!(name.to_string(), "O=Acme Co");
        assert_eq!(
            DistinguishedName::from_x509_name(&name),
            DistinguishedName::placeholder()
        );
    }
}
