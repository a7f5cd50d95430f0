// RSA Key Generation
// Derives the public and private exponents from a pair of primes

use log::info;
use num_traits::One;
use rand::{CryptoRng, RngCore};

use super::bigint::{from_u64, gcd, get_coprime, modular_inverse, RsaBigInt};
use super::error::{DecodingError, RsaError, RsaResult};
use super::prime::is_probable_prime;
use crate::config::EngineConfig;

/// RSA Public Key
#[derive(Debug, Clone, PartialEq)]
pub struct RsaPublicKey {
    pub n: RsaBigInt,  // Modulus
    pub e: RsaBigInt,  // Public exponent
}

/// RSA Private Key
#[derive(Debug, Clone, PartialEq)]
pub struct RsaPrivateKey {
    pub n: RsaBigInt,  // Modulus (same as public)
    pub d: RsaBigInt,  // Private exponent
}

/// RSA Key Pair, built once from two distinct primes and immutable afterwards
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    p: RsaBigInt,
    q: RsaBigInt,
    phi: RsaBigInt,
    public_key: RsaPublicKey,
    private_key: RsaPrivateKey,
}

impl RsaPublicKey {
    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Encrypt text character by character, base64 over the joined result
    pub fn encrypt(&self, plaintext: &str) -> String {
        super::encrypt::encrypt_string(plaintext, self)
    }
}

impl std::fmt::Display for RsaPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.e, self.n)
    }
}

impl RsaPrivateKey {
    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Decrypt a string produced by the matching public key
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, DecodingError> {
        super::decrypt::decrypt_to_string(ciphertext, self)
    }
}

impl std::fmt::Display for RsaPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.d, self.n)
    }
}

impl RsaKeyPair {
    /// Build a key pair from two primes with a random public exponent
    ///
    /// Fails with `InvalidKeyMaterial` when either input is not prime or the
    /// two are equal.
    pub fn new<R>(p: RsaBigInt, q: RsaBigInt, rng: &mut R, config: &EngineConfig) -> RsaResult<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        check_primes(&p, &q, rng, config)?;

        let phi = totient(&p, &q);
        let e = get_coprime(&phi, rng, config)?;

        Self::derive(p, q, phi, e)
    }

    /// Build a key pair from two primes and a caller-chosen public exponent
    pub fn with_public_exponent<R>(
        p: RsaBigInt,
        q: RsaBigInt,
        e: RsaBigInt,
        rng: &mut R,
        config: &EngineConfig,
    ) -> RsaResult<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        check_primes(&p, &q, rng, config)?;

        let phi = totient(&p, &q);
        if e < from_u64(2) || e >= phi {
            return Err(RsaError::InvalidKeyMaterial(format!(
                "public exponent {} is outside [2, {})",
                e, phi
            )));
        }
        if !gcd(&e, &phi).is_one() {
            return Err(RsaError::InvalidKeyMaterial(format!(
                "public exponent {} is not coprime to the totient",
                e
            )));
        }

        Self::derive(p, q, phi, e)
    }

    fn derive(p: RsaBigInt, q: RsaBigInt, phi: RsaBigInt, e: RsaBigInt) -> RsaResult<Self> {
        let d = modular_inverse(&e, &phi)?;
        let n = &p * &q;

        info!("derived {}-bit RSA key", n.bits());

        Ok(Self {
            p,
            q,
            phi,
            public_key: RsaPublicKey { n: n.clone(), e },
            private_key: RsaPrivateKey { n, d },
        })
    }

    pub fn p(&self) -> &RsaBigInt {
        &self.p
    }

    pub fn q(&self) -> &RsaBigInt {
        &self.q
    }

    /// Euler's totient (p-1)(q-1)
    pub fn phi(&self) -> &RsaBigInt {
        &self.phi
    }

    pub fn modulus(&self) -> &RsaBigInt {
        &self.public_key.n
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Public key as "{e}:{n}"
    pub fn public_key_string(&self) -> String {
        self.public_key.to_string()
    }

    /// Private key as "{d}:{n}"
    pub fn private_key_string(&self) -> String {
        self.private_key.to_string()
    }

    /// Get the bit length of the key
    pub fn bit_length(&self) -> u64 {
        self.public_key.bit_length()
    }

    pub fn encrypt(&self, plaintext: &str) -> String {
        self.public_key.encrypt(plaintext)
    }

    pub fn decrypt(&self, ciphertext: &str) -> RsaResult<String> {
        Ok(self.private_key.decrypt(ciphertext)?)
    }
}

fn check_primes<R>(
    p: &RsaBigInt,
    q: &RsaBigInt,
    rng: &mut R,
    config: &EngineConfig,
) -> RsaResult<()>
where
    R: RngCore + CryptoRng + ?Sized,
{
    for (name, value) in [("p", p), ("q", q)] {
        if !is_probable_prime(value, config.miller_rabin_rounds, rng)? {
            return Err(RsaError::InvalidKeyMaterial(format!("{} = {} is not prime", name, value)));
        }
    }

    if p == q {
        return Err(RsaError::InvalidKeyMaterial("p and q must be different".to_string()));
    }

    Ok(())
}

fn totient(p: &RsaBigInt, q: &RsaBigInt) -> RsaBigInt {
    (p - 1u8) * (q - 1u8)
}
