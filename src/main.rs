use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use devcert::{CertificateBuilder, Options};
use log::{error, info};

/// Ten thousand years; anything longer ends past the last date a certificate can hold.
const MAX_VALID_FOR_DAYS: i64 = 3_650_000;

/// Generates key and cert files for an https server.
///
/// Keep in mind that these are only meant for development.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Comma-separated hostnames and IPs to generate a certificate for
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Private key output path
    #[arg(long, default_value = "key.pem")]
    key: PathBuf,

    /// Certificate output path
    #[arg(long, default_value = "cert.pem")]
    cert: PathBuf,

    /// Creation date formatted as "Jan 1 15:04:05 2011" (UTC); defaults to now
    #[arg(long, default_value = "")]
    valid_from: String,

    /// Number of days the certificate is valid for
    #[arg(
        long,
        default_value_t = 365,
        value_parser = clap::value_parser!(i64).range(1..=MAX_VALID_FOR_DAYS)
    )]
    valid_for_days: i64,

    /// Make the certificate its own certificate authority
    #[arg(long)]
    ca: bool,

    /// Size of the RSA key to generate; ignored if --ecdsa-curve is set
    #[arg(long, default_value_t = 2048)]
    rsa_bits: usize,

    /// ECDSA curve to use instead of RSA: P224, P256, P384 or P521
    #[arg(long, default_value = "")]
    ecdsa_curve: String,
}

impl From<&Args> for Options {
    fn from(args: &Args) -> Self {
        Options::builder()
            .host(args.host.as_str())
            .valid_from(args.valid_from.as_str())
            .valid_for(time::Duration::days(args.valid_for_days))
            .is_ca(args.ca)
            .rsa_bits(args.rsa_bits)
            .ecdsa_curve(args.ecdsa_curve.as_str())
            .build()
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let options = Options::from(&args);

    info!(
        "generating {} and {} for {:?}",
        args.key.display(),
        args.cert.display(),
        options.host
    );

    match CertificateBuilder::new(options).write_to_files(&args.key, &args.cert) {
        Ok(()) => {
            println!("Files are written successfully. Serve TLS with:");
            println!(
                "  --key=\"{}\" --cert=\"{}\"",
                args.key.display(),
                args.cert.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_for_days_is_bounded() {
        let args = Args::try_parse_from(["devcert"]).unwrap();
        assert_eq!(args.valid_for_days, 365);

        for days in ["0", "-10", "99999999999999"] {
            let parsed = Args::try_parse_from(["devcert", "--valid-for-days", days]);
            assert!(parsed.is_err(), "{days} days was accepted");
        }

        let args = Args::try_parse_from(["devcert", "--valid-for-days", "3650000"]).unwrap();
        assert!(Options::from(&args).valid_for.is_positive());
    }
}
