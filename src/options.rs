use bon::Builder;
use time::Duration;

/// Options for generating a key and a self-signed certificate.
///
/// Only `host` is required; every other field has a documented default that is applied when the
/// field is left at its zero value.
///
/// ```
/// use devcert::Options;
///
/// let options = Options::builder()
///     .host("localhost,127.0.0.1")
///     .ecdsa_curve("P256")
///     .build();
/// assert_eq!(options.rsa_bits, 0);
/// ```
#[derive(Clone, Debug, Default, Builder)]
pub struct Options {
    /// Comma-separated hostnames and IP addresses to generate a certificate for.
    #[builder(into)]
    pub host: String,
    /// Creation date formatted as `Jan 1 15:04:05 2011`; empty means now.
    #[builder(into, default)]
    pub valid_from: String,
    /// Duration that the certificate is valid for; zero means 365 days.
    #[builder(default)]
    pub valid_for: Duration,
    /// Whether this certificate should be its own certificate authority.
    #[builder(default)]
    pub is_ca: bool,
    /// Size of the RSA key to generate; zero means 2048. Ignored if `ecdsa_curve` is set.
    #[builder(default)]
    pub rsa_bits: usize,
    /// ECDSA curve to use instead of RSA: P224, P256 (recommended), P384 or P521.
    #[builder(into, default)]
    pub ecdsa_curve: String,
}

impl Options {
    /// Options for `host` with every other field at its default.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }
}
