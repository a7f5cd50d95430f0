// Random Integer Source
// Draws big integers from a caller-supplied cryptographically secure generator

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

use super::error::{RsaError, RsaResult};
use crate::config::Sampling;

/// Fill `buf` from the secure generator. A failing source is fatal.
pub fn fill_random<R>(rng: &mut R, buf: &mut [u8]) -> RsaResult<()>
where
    R: RngCore + CryptoRng + ?Sized,
{
    rng.try_fill_bytes(buf).map_err(RsaError::EntropySourceFailure)
}

fn byte_len(bits: u64) -> usize {
    ((bits + 7) / 8) as usize
}

/// Uniform-ish integer in [min, max).
///
/// `Sampling::ModuloReduction` reproduces the reference sampler: one byte longer
/// than the range, top byte cleared, reduced modulo the range.
/// `Sampling::Rejection` draws exactly `bits(range)` bits and retries until the
/// value falls inside the range.
pub fn uniform_in_range<R>(
    rng: &mut R,
    min: &BigUint,
    max: &BigUint,
    sampling: Sampling,
) -> RsaResult<BigUint>
where
    R: RngCore + CryptoRng + ?Sized,
{
    if min >= max {
        return Err(RsaError::InvalidRange);
    }

    let range = max - min;

    let offset = match sampling {
        Sampling::ModuloReduction => {
            let mut buf = vec![0u8; byte_len(range.bits()) + 1];
            fill_random(rng, &mut buf)?;
            buf[0] = 0;
            BigUint::from_bytes_be(&buf) % &range
        }
        Sampling::Rejection => {
            let bits = range.bits();
            loop {
                let candidate = random_bits(rng, bits)?;
                if candidate < range {
                    break candidate;
                }
            }
        }
    };

    Ok(offset + min)
}

/// Integer of at most `bits` bits, every value equally likely
fn random_bits<R>(rng: &mut R, bits: u64) -> RsaResult<BigUint>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let len = byte_len(bits);
    let mut buf = vec![0u8; len];
    fill_random(rng, &mut buf)?;

    let excess = (len as u64 * 8 - bits) as u32;
    if let Some(top) = buf.first_mut() {
        *top &= 0xFFu8.checked_shr(excess).unwrap_or(0);
    }

    Ok(BigUint::from_bytes_be(&buf))
}

/// Random integer drawn from ceil(bits/8) + 1 bytes with the top byte cleared.
///
/// The top bit of the requested length is not forced on, so the result can be
/// shorter than `bits`. Callers that need an exact length check and redraw.
pub fn random_with_bit_length<R>(rng: &mut R, bits: u64) -> RsaResult<BigUint>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let mut buf = vec![0u8; byte_len(bits) + 1];
    fill_random(rng, &mut buf)?;
    buf[0] = 0;
    Ok(BigUint::from_bytes_be(&buf))
}
