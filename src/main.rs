//! bls-keycheck CLI
//!
//! Derives the key at the keystore's path from a mnemonic and reports
//! whether it matches the keystore's secret and public key.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bls_keycheck::{verify_mnemonic, Bls12381, Keystore, Verification};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_MISMATCH: u8 = 1;
const EXIT_ERROR: u8 = 2;

/// Verify an EIP-2335 keystore against an EIP-2333 mnemonic
#[derive(Parser)]
#[command(name = "bls-keycheck")]
#[command(version)]
#[command(about, long_about = None)]
struct Cli {
    /// The mnemonic phrase
    #[arg(short, long, env = "BLS_KEYCHECK_MNEMONIC", hide_env_values = true)]
    mnemonic: String,

    /// The mnemonic passphrase
    #[arg(
        long,
        env = "BLS_KEYCHECK_MNEMONIC_PASSPHRASE",
        hide_env_values = true,
        default_value = ""
    )]
    mnemonic_passphrase: String,

    /// Path to the keystore file
    #[arg(short, long)]
    keystore: PathBuf,

    /// The keystore password
    #[arg(short, long, env = "BLS_KEYCHECK_PASSWORD", hide_env_values = true)]
    password: String,

    /// Derivation path, when the keystore does not record one (e.g. m/12381/3600/0/0/0)
    #[arg(long)]
    path: Option<String>,

    /// The logging level (trace|debug|info|warn|error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<Verification> {
    let bls = Bls12381::init();

    let keystore = Keystore::load(&cli.keystore)
        .with_context(|| format!("failed to read keystore {}", cli.keystore.display()))?;

    let path = match (&cli.path, &keystore.path) {
        (Some(path), _) => path.as_str(),
        (None, Some(path)) if !path.is_empty() => path.as_str(),
        _ => anyhow::bail!("keystore records no derivation path; pass --path"),
    };
    info!(path, "read HD key path");

    let verification = verify_mnemonic(
        &cli.mnemonic,
        &cli.mnemonic_passphrase,
        path,
        &keystore,
        &cli.password,
        bls,
    )
    .context("failed to check keystore against mnemonic")?;
    Ok(verification)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(&cli) {
        Ok(v) => {
            if v.private_key_match {
                info!("private key matches");
            } else {
                error!("private key does not match");
            }
            if v.public_key_match {
                info!("public key matches");
            } else {
                error!("public key does not match");
            }
            if v.is_match() {
                info!("keystore verified to match your mnemonic");
                ExitCode::SUCCESS
            } else {
                error!("keystore failed to match your mnemonic");
                ExitCode::from(EXIT_MISMATCH)
            }
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
