use std::io::Write;
use std::path::Path;

use log::{debug, info};
use rand::TryRngCore;

use crate::cert::params::{CertificateTemplate, HostNames, Validity};
use crate::cert::{self, Certificate};
use crate::error::{DevCertError, Result};
use crate::fs::{self, OutputFile};
use crate::key::{KeyAlgorithm, KeyPair};
use crate::options::Options;

/// Serial numbers are drawn uniformly from `[0, 2^128)`.
const SERIAL_NUMBER_BYTES: usize = 16;

/// The two PEM artifacts of one generation.
#[derive(Clone, Debug)]
pub struct GeneratedCertificate {
    /// `CERTIFICATE` block.
    pub certificate_pem: String,
    /// `RSA PRIVATE KEY` or `EC PRIVATE KEY` block.
    pub private_key_pem: String,
}

/// Builds a private key and a matching self-signed certificate from [`Options`].
///
/// Every call generates a new key pair and serial number; nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct CertificateBuilder {
    options: Options,
}

impl CertificateBuilder {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Generates the key pair and signs the certificate.
    ///
    /// The host list, the curve name and the validity window are all checked before any key
    /// material is generated.
    pub fn build(&self) -> Result<GeneratedCertificate> {
        let hosts = HostNames::parse(&self.options.host);
        if hosts.is_empty() {
            return Err(DevCertError::MissingHost);
        }
        let algorithm =
            KeyAlgorithm::from_options(&self.options.ecdsa_curve, self.options.rsa_bits)?;
        let validity = Validity::from_options(&self.options.valid_from, self.options.valid_for)?;

        let key_pair = KeyPair::generate(algorithm)?;

        let template = CertificateTemplate::builder()
            .serial_number(random_serial_number()?)
            .validity(validity)
            .is_ca(self.options.is_ca)
            .dns_names(hosts.dns_names)
            .ip_addresses(hosts.ip_addresses)
            .build();
        debug!(
            "certificate template valid from {} to {}",
            template.validity.not_before, template.validity.not_after
        );

        let certificate = Certificate::new_self_signed(&template, &key_pair)?;

        Ok(GeneratedCertificate {
            certificate_pem: certificate.to_pem()?,
            private_key_pem: key_pair.to_private_key_pem()?,
        })
    }

    /// Generates both artifacts and writes them to the given sinks.
    ///
    /// Nothing is written unless both artifacts were produced.
    pub fn write_to<C: Write, K: Write>(&self, cert_out: &mut C, key_out: &mut K) -> Result<()> {
        let generated = self.build()?;
        write_artifacts(&generated, cert_out, "certificate", key_out, "private key")
    }

    /// Generates both artifacts into two new files.
    ///
    /// Both paths are created exclusively with owner-only permissions; an existing path fails the
    /// call with [`DevCertError::OutputPathConflict`] before anything is generated or written.
    /// Both files are closed on every exit path, and the generation error together with any
    /// close error is reported as a single error. Files created by a failed call are removed.
    pub fn write_to_files(&self, key_path: &Path, cert_path: &Path) -> Result<()> {
        let key_file = fs::create_new_private(key_path)?;
        let cert_file = match fs::create_new_private(cert_path) {
            Ok(file) => file,
            Err(e) => {
                drop(key_file);
                fs::remove_created(key_path);
                return Err(e);
            }
        };
        self.write_to_opened(key_file, key_path, cert_file, cert_path)
    }

    /// Writes into files created by this call, closes both and removes them on any failure.
    fn write_to_opened<K: OutputFile, C: OutputFile>(
        &self,
        mut key_file: K,
        key_path: &Path,
        mut cert_file: C,
        cert_path: &Path,
    ) -> Result<()> {
        let mut errors = Vec::new();
        let written = self.build().and_then(|generated| {
            write_artifacts(
                &generated,
                &mut cert_file,
                &cert_path.display().to_string(),
                &mut key_file,
                &key_path.display().to_string(),
            )
        });
        if let Err(e) = written {
            errors.push(e);
        }
        if let Err(e) = fs::close(key_file, key_path) {
            errors.push(e);
        }
        if let Err(e) = fs::close(cert_file, cert_path) {
            errors.push(e);
        }

        match DevCertError::combine(errors) {
            None => {
                info!(
                    "wrote private key to {} and certificate to {}",
                    key_path.display(),
                    cert_path.display()
                );
                Ok(())
            }
            Some(err) => {
                fs::remove_created(key_path);
                fs::remove_created(cert_path);
                Err(err)
            }
        }
    }
}

fn write_artifacts<C: Write, K: Write>(
    generated: &GeneratedCertificate,
    cert_out: &mut C,
    cert_target: &str,
    key_out: &mut K,
    key_target: &str,
) -> Result<()> {
    let write = |out: &mut dyn Write, target: &str, pem: &str| {
        out.write_all(pem.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|source| DevCertError::OutputWrite {
                target: target.to_string(),
                source,
            })
    };
    write(cert_out, cert_target, &generated.certificate_pem)?;
    write(key_out, key_target, &generated.private_key_pem)
}

/// Draws a certificate serial number uniformly below 2^128 from the OS random source.
///
/// The result is big-endian without leading zero bytes.
pub fn random_serial_number() -> Result<Vec<u8>> {
    let mut bytes = [0u8; SERIAL_NUMBER_BYTES];
    rand::rngs::OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        DevCertError::CertificateCreation(format!("failed to generate serial number: {e}"))
    })?;
    Ok(cert::strip_leading_zeros(&bytes).to_vec())
}

/// Generates a key and a self-signed certificate and writes them to `cert_out` and `key_out`.
pub fn generate_cert<C: Write, K: Write>(
    cert_out: &mut C,
    key_out: &mut K,
    options: &Options,
) -> Result<()> {
    CertificateBuilder::new(options.clone()).write_to(cert_out, key_out)
}

/// Generates a key and a self-signed certificate into the new files `key_path` and `cert_path`.
pub fn generate_cert_to_files(
    key_path: impl AsRef<Path>,
    cert_path: impl AsRef<Path>,
    options: &Options,
) -> Result<()> {
    CertificateBuilder::new(options.clone()).write_to_files(key_path.as_ref(), cert_path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// In-memory stand-in for an opened output file.
    #[derive(Default)]
    struct MemoryFile {
        fail_write: bool,
        fail_close: bool,
        data: Vec<u8>,
    }

    impl Write for MemoryFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_write {
                return Err(io::Error::other("no space left on device"));
            }
            self.data.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl OutputFile for MemoryFile {
        fn sync_close(self) -> io::Result<()> {
            if self.fail_close {
                return Err(io::Error::other("input/output error"));
            }
            Ok(())
        }
    }

    /// Creates both output paths the way `write_to_files` does and closes the handles.
    fn create_outputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let key_path = dir.join("key.pem");
        let cert_path = dir.join("cert.pem");
        drop(fs::create_new_private(&key_path).unwrap());
        drop(fs::create_new_private(&cert_path).unwrap());
        (key_path, cert_path)
    }

    #[test]
    fn test_failed_key_write_and_close_are_combined_and_files_removed() {
        let dir = tempfile::tempdir().unwrap();
        let (key_path, cert_path) = create_outputs(dir.path());
        let builder = CertificateBuilder::new(
            Options::builder().host("localhost").ecdsa_curve("P256").build(),
        );
        let key_file = MemoryFile {
            fail_write: true,
            fail_close: true,
            ..Default::default()
        };

        let err = builder
            .write_to_opened(key_file, &key_path, MemoryFile::default(), &cert_path)
            .unwrap_err();

        let failures = err.failures();
        assert!(matches!(err, DevCertError::Combined(_)));
        assert_eq!(failures.len(), 2);
        assert!(matches!(
            failures[0],
            DevCertError::OutputWrite { target, .. } if target == &key_path.display().to_string()
        ));
        assert!(matches!(failures[1], DevCertError::OutputClose { path, .. } if path == &key_path));
        assert!(err.to_string().contains("; "));
        assert!(!key_path.exists());
        assert!(!cert_path.exists());
    }

    #[test]
    fn test_failed_close_alone_removes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let (key_path, cert_path) = create_outputs(dir.path());
        let builder = CertificateBuilder::new(
            Options::builder().host("localhost").ecdsa_curve("P256").build(),
        );
        let cert_file = MemoryFile {
            fail_close: true,
            ..Default::default()
        };

        let err = builder
            .write_to_opened(MemoryFile::default(), &key_path, cert_file, &cert_path)
            .unwrap_err();

        assert!(matches!(err, DevCertError::OutputClose { ref path, .. } if path == &cert_path));
        assert!(!key_path.exists());
        assert!(!cert_path.exists());
    }

    #[test]
    fn test_serial_numbers_fit_in_128_bits() {
        for _ in 0..32 {
            let serial = random_serial_number().unwrap();
            assert!(!serial.is_empty());
            assert!(serial.len() <= SERIAL_NUMBER_BYTES);
        }
        assert_ne!(random_serial_number().unwrap(), random_serial_number().unwrap());
    }

    #[test]
    fn test_rejected_key_sink_names_its_target() {
        let options = Options::builder().host("localhost").ecdsa_curve("P256").build();
        let mut cert_out = Vec::new();
        let err = generate_cert(&mut cert_out, &mut FailingWriter, &options).unwrap_err();
        assert!(
            matches!(err, DevCertError::OutputWrite { ref target, .. } if target == "private key")
        );
    }

    #[test]
    fn test_bad_valid_from_is_reported_before_key_generation() {
        let options = Options::builder()
            .host("localhost")
            .valid_from("tomorrow")
            .build();
        let mut cert_out = Vec::new();
        let mut key_out = Vec::new();
        let err = generate_cert(&mut cert_out, &mut key_out, &options).unwrap_err();
        assert!(matches!(err, DevCertError::InvalidValidFromFormat { .. }));
        assert!(cert_out.is_empty());
        assert!(key_out.is_empty());
    }
}
