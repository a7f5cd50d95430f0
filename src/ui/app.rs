// Console front-end
// Parses the command line, builds a key pair and runs one cipher operation

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use rand::rngs::OsRng;

use crate::config::{
    EngineConfig, Sampling, DEFAULT_MILLER_RABIN_ROUNDS, DEFAULT_MIN_PRIME_BITS,
};
use crate::rsa::prime::validate_prime_candidate;
use crate::rsa::{generate_prime_pair, is_encodable, is_probable_prime, RsaBigInt, RsaKeyPair};
use crate::util::file_ops::{write_operation_log, OperationLog};

/// Textbook RSA: generate keys, encrypt and decrypt text one character at a time
#[derive(Parser, Debug)]
#[command(name = "textbook-rsa", version, about)]
pub struct Args {
    /// First prime (decimal). Generated when omitted.
    #[arg(long, requires = "q")]
    pub p: Option<String>,

    /// Second prime (decimal). Generated when omitted.
    #[arg(long, requires = "p")]
    pub q: Option<String>,

    /// Public exponent (decimal). Random when omitted. Reuse the `e` printed by
    /// an earlier run, with the same primes, to decrypt its output.
    #[arg(long, requires = "p")]
    pub e: Option<String>,

    /// Bit length of generated primes
    #[arg(long, default_value_t = DEFAULT_MIN_PRIME_BITS)]
    pub bits: u64,

    /// Smallest prime accepted, in bits
    #[arg(long, default_value_t = DEFAULT_MIN_PRIME_BITS)]
    pub min_bits: u64,

    /// Miller-Rabin rounds per candidate
    #[arg(long, default_value_t = DEFAULT_MILLER_RABIN_ROUNDS)]
    pub rounds: u32,

    /// How random ranges are sampled
    #[arg(long, value_enum, default_value_t = SamplingArg::Rejection)]
    pub sampling: SamplingArg,

    /// Write a JSON record of each operation into this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the public and private key strings
    Keys,
    /// Encrypt text with the public key
    Encrypt { text: String },
    /// Decrypt base64 ciphertext with the private key
    Decrypt { text: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingArg {
    Rejection,
    Modulo,
}

impl From<SamplingArg> for Sampling {
    fn from(arg: SamplingArg) -> Self {
        match arg {
            SamplingArg::Rejection => Sampling::Rejection,
            SamplingArg::Modulo => Sampling::ModuloReduction,
        }
    }
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_rounds(self.rounds)
            .with_sampling(self.sampling.into())
            .with_min_prime_bits(self.min_bits)
    }
}

/// What a run printed, kept separate from printing so it can be checked
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub public_key: String,
    pub private_key: String,
    pub output: Option<String>,
    pub log_path: Option<PathBuf>,
}

pub fn run(args: Args) -> Result<()> {
    let outcome = execute(&args)?;

    println!("Public Key:  {}", outcome.public_key);
    println!("Private Key: {}", outcome.private_key);

    if let Some(output) = &outcome.output {
        let label = match args.command {
            Command::Decrypt { .. } => "Decrypted",
            _ => "Encrypted",
        };
        println!("{} text: {}", label, output);
    }
    if let Some(path) = &outcome.log_path {
        println!("Log file: {}", path.display());
    }

    Ok(())
}

/// Build the key pair and run the requested command
pub fn execute(args: &Args) -> Result<Outcome> {
    let config = args.engine_config();
    let keypair = build_keypair(args, &config)?;

    let mut outcome = Outcome {
        public_key: keypair.public_key_string(),
        private_key: keypair.private_key_string(),
        output: None,
        log_path: None,
    };

    let record = match &args.command {
        Command::Keys => None,
        Command::Encrypt { text } => {
            if !is_encodable(text, keypair.public_key()) {
                warn!("some characters are not below the modulus and will not round-trip");
            }
            let encrypted = keypair.encrypt(text);
            let decrypted = match keypair.decrypt(&encrypted) {
                Ok(decrypted) => decrypted,
                Err(e) => {
                    warn!("ciphertext does not decrypt back: {}", e);
                    format!("<error: {}>", e)
                }
            };
            let record = OperationLog::new(&keypair, text, &encrypted, &decrypted);
            outcome.output = Some(encrypted);
            Some(record)
        }
        Command::Decrypt { text } => {
            let decrypted = keypair.decrypt(text).context("could not decrypt ciphertext")?;
            let record = OperationLog::new(&keypair, &decrypted, text, &decrypted);
            outcome.output = Some(decrypted);
            Some(record)
        }
    };

    if let (Some(dir), Some(record)) = (&args.log_dir, record) {
        // A failed log write never fails the operation itself
        match write_operation_log(dir, &record) {
            Ok(path) => outcome.log_path = Some(path),
            Err(e) => eprintln!("An error occurred while trying to log the operation: {}", e),
        }
    }

    Ok(outcome)
}

fn build_keypair(args: &Args, config: &EngineConfig) -> Result<RsaKeyPair> {
    let mut rng = OsRng;

    let (p, q) = match (&args.p, &args.q) {
        (Some(p), Some(q)) => {
            let p = parse_prime(p, "p", config)?;
            let q = parse_prime(q, "q", config)?;
            if p == q {
                bail!("Please select different primes");
            }

            if let Some(e) = &args.e {
                let e: RsaBigInt = e
                    .trim()
                    .parse()
                    .with_context(|| format!("e is not a non-negative integer: {:?}", e))?;
                return RsaKeyPair::with_public_exponent(p, q, e, &mut rng, config)
                    .context("could not derive RSA keys");
            }
            (p, q)
        }
        _ => {
            if args.bits < config.min_prime_bits {
                bail!(
                    "Please select primes with {} bits or more (asked for {})",
                    config.min_prime_bits,
                    args.bits
                );
            }
            info!("generating two {}-bit primes", args.bits);
            generate_prime_pair(args.bits, config).context("prime generation failed")?
        }
    };

    RsaKeyPair::new(p, q, &mut rng, config).context("could not derive RSA keys")
}

fn parse_prime(text: &str, name: &str, config: &EngineConfig) -> Result<RsaBigInt> {
    let value: RsaBigInt = text
        .trim()
        .parse()
        .with_context(|| format!("{} is not a non-negative integer: {:?}", name, text))?;

    if !validate_prime_candidate(&value, config.min_prime_bits) {
        bail!(
            "Please select {} with {} bits or more (got {})",
            name,
            config.min_prime_bits,
            value.bits()
        );
    }
    if !is_probable_prime(&value, config.miller_rabin_rounds, &mut OsRng)? {
        bail!("The number you entered for {} is not a prime number", name);
    }

    Ok(value)
}
