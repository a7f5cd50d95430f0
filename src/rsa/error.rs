// RSA Errors
// Typed failures shared by the number-theory core and the key engine

use num_bigint::BigUint;
use thiserror::Error;

/// Result type for RSA operations
pub type RsaResult<T> = Result<T, RsaError>;

/// Errors that can occur while generating keys or running the cipher
#[derive(Debug, Error)]
pub enum RsaError {
    /// P or Q is not prime, P == Q, or the pair admits no public exponent.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// The secure random source could not produce bytes. There is no fallback.
    #[error("secure random source failed: {0}")]
    EntropySourceFailure(#[source] rand::Error),

    #[error("no {bits}-bit prime found after {attempts} attempts")]
    PrimeGenerationExhausted { bits: u64, attempts: usize },

    /// Both searches kept landing on the same prime
    #[error("generated {bits}-bit primes still equal after {redraws} redraws of q")]
    PrimePairCollision { bits: u64, redraws: usize },

    #[error("no exponent coprime to the totient found after {attempts} attempts")]
    CoprimeSearchExhausted { attempts: usize },

    #[error("cannot generate a prime of {0} bits (need at least 2)")]
    InvalidBitLength(u64),

    #[error("empty sampling range: min must be below max")]
    InvalidRange,

    #[error(transparent)]
    Decoding(#[from] DecodingError),

    /// gcd(a, m) != 1. Key derivation picks e coprime to phi, so seeing this
    /// from the engine is a defect.
    #[error("modular inverse is undefined: operands are not coprime")]
    ModularInverseUndefined,
}

/// Reasons a ciphertext string could not be turned back into plaintext
#[derive(Debug, Error)]
pub enum DecodingError {
    #[error("ciphertext is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded ciphertext is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("ciphertext chunk {index} is not a decimal integer: {chunk:?}")]
    InvalidChunk { index: usize, chunk: String },

    #[error("ciphertext chunk {index} is not below the modulus")]
    ChunkOutOfRange { index: usize },

    #[error("decrypted value {value} at position {index} is not a character")]
    InvalidCodePoint { index: usize, value: BigUint },
}
