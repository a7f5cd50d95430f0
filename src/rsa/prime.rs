// Prime Generation and Primality Testing
// Miller-Rabin over num-bigint and rejection search for primes of exact length

use std::thread;

use log::{debug, warn};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use super::bigint::{from_u64, mod_pow, RsaBigInt};
use super::error::{RsaError, RsaResult};
use super::random::{random_with_bit_length, uniform_in_range};
use crate::config::{EngineConfig, Sampling};

/// Attempts at redrawing Q when a generated pair collides
const MAX_PAIR_COLLISIONS: usize = 8;

/// Miller-Rabin primality test
/// Returns true if n is probably prime
///
/// Each passing round lowers the chance of a composite slipping through by
/// a factor of four. Primes are never rejected.
pub fn is_probable_prime<R>(n: &RsaBigInt, rounds: u32, rng: &mut R) -> RsaResult<bool>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let two = from_u64(2);
    let three = from_u64(3);

    if n <= &RsaBigInt::one() {
        return Ok(false);
    }
    if n == &two || n == &three {
        return Ok(true);
    }
    if n.is_even() || (n % &three).is_zero() {
        return Ok(false);
    }

    // Write n-1 as d * 2^s with d odd
    let n_minus_one = n - 1u8;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..rounds {
        // Witness a in [2, n-2]
        let a = uniform_in_range(rng, &two, &n_minus_one, Sampling::Rejection)?;
        let mut x = mod_pow(&a, &d, n);

        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = mod_pow(&x, &two, n);
            if x.is_one() {
                return Ok(false);
            }
            if x == n_minus_one {
                continue 'witness;
            }
        }

        // Composite
        return Ok(false);
    }

    // Probably prime
    Ok(true)
}

/// Generate a random prime of exactly `bits` bits
///
/// Draws candidates with `random_with_bit_length` and keeps the first one that
/// both has the requested length and passes Miller-Rabin. Gives up after
/// `config.max_prime_attempts` draws.
pub fn generate_prime<R>(bits: u64, rng: &mut R, config: &EngineConfig) -> RsaResult<RsaBigInt>
where
    R: RngCore + CryptoRng + ?Sized,
{
    if bits < 2 {
        return Err(RsaError::InvalidBitLength(bits));
    }

    for attempt in 1..=config.max_prime_attempts {
        let candidate = random_with_bit_length(rng, bits)?;

        // Length check first, it is far cheaper than the primality test
        if candidate.bits() != bits {
            continue;
        }

        if is_probable_prime(&candidate, config.miller_rabin_rounds, rng)? {
            debug!("found {}-bit prime after {} attempts", bits, attempt);
            return Ok(candidate);
        }
    }

    Err(RsaError::PrimeGenerationExhausted {
        bits,
        attempts: config.max_prime_attempts,
    })
}

/// Generate two distinct primes of `bits` bits concurrently from the OS generator
pub fn generate_prime_pair(bits: u64, config: &EngineConfig) -> RsaResult<(RsaBigInt, RsaBigInt)> {
    generate_prime_pair_with(bits, config, OsRng, OsRng)
}

/// Generate two distinct primes on separate threads, one generator per search
///
/// If the searches happen to return the same prime, Q is regenerated on the
/// calling thread.
pub fn generate_prime_pair_with<R>(
    bits: u64,
    config: &EngineConfig,
    mut rng_p: R,
    mut rng_q: R,
) -> RsaResult<(RsaBigInt, RsaBigInt)>
where
    R: RngCore + CryptoRng + Send,
{
    let (p, q) = thread::scope(|scope| {
        let handle_p = scope.spawn(|| generate_prime(bits, &mut rng_p, config));
        let handle_q = scope.spawn(|| generate_prime(bits, &mut rng_q, config));

        let p = handle_p.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
        let q = handle_q.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
        (p, q)
    });

    let p = p?;
    let mut q = q?;

    let mut redraws = 0;
    while p == q {
        if redraws == MAX_PAIR_COLLISIONS {
            return Err(RsaError::PrimePairCollision { bits, redraws });
        }
        warn!("generated primes collided, regenerating q");
        q = generate_prime(bits, &mut rng_q, config)?;
        redraws += 1;
    }

    Ok((p, q))
}

/// Check that a user-supplied prime is long enough for key generation
pub fn validate_prime_candidate(n: &BigUint, min_bits: u64) -> bool {
    n.bits() >= min_bits
}
