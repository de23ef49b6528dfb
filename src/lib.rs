//! # devcert - Self-Signed Certificates for Local Development
//!
//! devcert generates a private key and a matching self-signed X.509 certificate for a set of
//! hostnames and IP addresses, built entirely with rustcrypto libraries. The output is meant for
//! bootstrapping a local development TLS server, not for production issuance.
//!
//! ## Supported Key Types
//!
//! - **RSA**: any modulus size, 2048 bits by default, written as a PKCS#1 `RSA PRIVATE KEY`
//! - **ECDSA**: P-224, P-256, P-384 and P-521, written as a SEC1 `EC PRIVATE KEY`
//!
//! ## Quick Start
//!
//! ### Writing to any sink
//!
//! ```rust,no_run
//! use devcert::{Options, generate_cert};
//!
//! # fn main() -> Result<(), devcert::error::DevCertError> {
//! let options = Options::builder()
//!     .host("localhost,127.0.0.1,::1")
//!     .ecdsa_curve("P256")
//!     .build();
//!
//! let mut cert_pem = Vec::new();
//! let mut key_pem = Vec::new();
//! generate_cert(&mut cert_pem, &mut key_pem, &options)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Writing to files
//!
//! ```rust,no_run
//! use devcert::{Options, generate_cert_to_files};
//!
//! # fn main() -> Result<(), devcert::error::DevCertError> {
//! // Fails with `OutputPathConflict` if either file already exists.
//! generate_cert_to_files("key.pem", "cert.pem", &Options::for_host("localhost"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use devcert::{CertificateBuilder, Options, error::DevCertError};
//!
//! let options = Options::builder().host("localhost").ecdsa_curve("P999").build();
//! match CertificateBuilder::new(options).build() {
//!     Ok(_) => unreachable!(),
//!     Err(DevCertError::UnsupportedCurve(curve)) => println!("no such curve: {curve}"),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`options`]: Generation options and their defaults
//! - [`generate`]: The certificate builder and its sink and file entry points
//! - [`key`]: Key generation, signing and private key encoding
//! - [`cert`]: Certificate templates, extensions and encoding/decoding
//! - [`tbs_certificate`]: Low-level certificate structure and signing
//! - [`error`]: Error types

pub mod cert;
pub mod error;
pub mod fs;
pub mod generate;
pub mod key;
pub mod options;
pub mod pem_utils;
pub mod tbs_certificate;

pub use generate::{
    CertificateBuilder, GeneratedCertificate, generate_cert, generate_cert_to_files,
};
pub use options::Options;
