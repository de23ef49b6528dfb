mod util;

use botan::Certificate as BotanCertificate;

use devcert::{CertificateBuilder, GeneratedCertificate, Options};

fn generate(ecdsa_curve: &str) -> GeneratedCertificate {
    let options = Options::builder()
        .host("crabs.crabs,192.168.1.10")
        .ecdsa_curve(ecdsa_curve)
        .build();
    CertificateBuilder::new(options).build().unwrap()
}

fn check_cert(generated: &GeneratedCertificate) {
    let cert = devcert::cert::Certificate::from_pem(&generated.certificate_pem).unwrap();
    // Use botan crate to parse the DER and assert it succeeds
    BotanCertificate::load(&cert.to_der().unwrap()).expect("Botan failed to parse certificate");
}

#[test]
#[ignore]
fn test_botan_ecdsa_p256() {
    check_cert(&generate("P256"));
}

#[test]
#[ignore]
fn test_botan_ecdsa_p384() {
    check_cert(&generate("P384"));
}

#[test]
#[ignore]
fn test_botan_ecdsa_p521() {
    check_cert(&generate("P521"));
}

#[test]
#[ignore]
fn test_botan_rsa() {
    check_cert(&generate(""));
}
