//! use devcert::error::DevCertError;

use std::path::PathBuf;

use thiserror::Error;

/// Represents errors that can occur while generating a development certificate.
///
/// Every variant is terminal for the generation call that produced it; nothing is retried
/// internally.
#[derive(Debug, Error)]
pub enum DevCertError {
    /// The host option held no DNS names or IP addresses.
    #[error("Options.host must be set")]
    MissingHost,

    /// The requested elliptic curve is not one of P224, P256, P384 or P521.
    #[error("Unrecognized elliptic curve: {0:?}")]
    UnsupportedCurve(String),

    /// Error during key generation.
    #[error("Failed to generate private key: {0}")]
    KeyGeneration(String),

    /// The validity start could not be parsed.
    #[error("Failed to parse creation date {value:?}: {reason}")]
    InvalidValidFromFormat { value: String, reason: String },

    /// The validity duration is negative or ends past the last representable date.
    #[error("Invalid validity duration: {0}")]
    InvalidValidFor(String),

    /// The certificate template was rejected while building or signing it.
    #[error("Failed to create certificate: {0}")]
    CertificateCreation(String),

    /// The private key could not be serialized.
    #[error("Failed to encode private key: {0}")]
    KeyEncoding(String),

    /// A generated certificate or key could not be decoded again.
    #[error("Failed to decode data: {0}")]
    Decoding(String),

    /// An output sink rejected a write.
    #[error("Failed to write data to {target}: {source}")]
    OutputWrite {
        target: String,
        source: std::io::Error,
    },

    /// An output file already exists.
    #[error("{0} exists. You must delete the old one before generating a new one")]
    OutputPathConflict(PathBuf),

    /// An output file could not be created.
    #[error("Failed to open {path} for writing: {source}")]
    OutputOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An output file could not be flushed and closed.
    #[error("Failed to close {path}: {source}")]
    OutputClose {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Several failures from one generation call.
    #[error("{}", join_errors(.0))]
    Combined(Vec<DevCertError>),
}

fn join_errors(errors: &[DevCertError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl DevCertError {
    /// Collapses a list of failures into a single error.
    ///
    /// Returns `None` for an empty list and the error itself when there is only one.
    pub fn combine(mut errors: Vec<DevCertError>) -> Option<DevCertError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(DevCertError::Combined(errors)),
        }
    }

    /// Returns the individual failures this error is made of.
    pub fn failures(&self) -> Vec<&DevCertError> {
        match self {
            DevCertError::Combined(errors) => errors.iter().flat_map(|e| e.failures()).collect(),
            other => vec![other],
        }
    }
}

pub type Result<T> = std::result::Result<T, DevCertError>;

impl From<rsa::Error> for DevCertError {
    fn from(err: rsa::Error) -> Self {
        DevCertError::KeyGeneration(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for DevCertError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        DevCertError::KeyEncoding(err.to_string())
    }
}

impl From<der::Error> for DevCertError {
    /// Converts a `der::Error` into a `DevCertError`.
    fn from(err: der::Error) -> Self {
        DevCertError::CertificateCreation(err.to_string())
    }
}
