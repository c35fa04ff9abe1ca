use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "endorse")]
#[command(about = "Digest, sign and verify endorsement payloads offline", long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to ENDORSE_CONFIG_PATH, then ./endorse.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filters, e.g. "info" or "warn,endorse_core=debug"; overrides logging.filters
    #[arg(long, global = true)]
    pub log_filters: Option<String>,

    /// Directory for rotated log files; overrides logging.log_dir
    #[arg(long, global = true)]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// SHA-256 of the input, hex encoded
    Digest(InputArgs),
    /// Sign a digest (or the digest of an input) with a P-256 key; prints the DER signature as hex
    Sign {
        /// Private key file: PEM, raw 32-byte scalar or hex
        #[arg(short, long)]
        key: PathBuf,
        #[command(flatten)]
        input: InputArgs,
        /// Keep the signature exactly as produced instead of normalizing to low-S
        #[arg(long)]
        raw: bool,
    },
    /// Rewrite a DER signature (hex) to its canonical low-S form
    Normalize {
        signature: String,
    },
    /// Check a DER signature (hex) against a digest and a SEC1 public key (hex)
    Verify {
        #[arg(long)]
        public_key: String,
        #[arg(long)]
        digest: String,
        #[arg(long)]
        signature: String,
    },
    /// Print the SEC1 uncompressed public key (hex) for a private key file
    PublicKey {
        #[arg(short, long)]
        key: PathBuf,
    },
    /// Print the effective configuration after file and environment layering
    Config {
        /// JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

/// Exactly one source of bytes to digest.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// UTF-8 text
    #[arg(long)]
    pub text: Option<String>,
    /// Hex-encoded bytes
    #[arg(long)]
    pub hex: Option<String>,
    /// File contents
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// An already computed digest (hex); used as is
    #[arg(long)]
    pub digest: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
