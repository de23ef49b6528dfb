#![allow(dead_code)]

use devcert::cert::Certificate;
use devcert::cert::params::CertificateTemplate;
use devcert::key::KeyPair;
use devcert::{CertificateBuilder, GeneratedCertificate, Options};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Generates a P-256 certificate for `host`, the cheapest key type to produce.
pub fn generate_p256(host: &str) -> GeneratedCertificate {
    init_logging();
    let options = Options::builder().host(host).ecdsa_curve("P256").build();
    CertificateBuilder::new(options)
        .build()
        .expect("Failed to generate certificate")
}

pub fn decode(generated: &GeneratedCertificate) -> (Certificate, CertificateTemplate, KeyPair) {
    let cert = Certificate::from_pem(&generated.certificate_pem).expect("Failed to parse PEM");
    let template = cert.to_template().expect("Failed to read certificate fields");
    let key = KeyPair::from_pem(&generated.private_key_pem).expect("Failed to parse key");
    (cert, template, key)
}
