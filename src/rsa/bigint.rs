// RSA Big Integer Operations
// Number-theory helpers over num-bigint: modular exponentiation, gcd,
// extended Euclid and public exponent selection

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::{CryptoRng, RngCore};

use super::error::{RsaError, RsaResult};
use super::random::uniform_in_range;
use crate::config::EngineConfig;

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Modular exponentiation: base^exp mod modulus
/// Uses square-and-multiply algorithm
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> RsaBigInt {
    if modulus.is_one() {
        return RsaBigInt::zero();
    }

    let mut result = RsaBigInt::one();
    let mut base = base % modulus;
    let mut exp = exp.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exp >>= 1;
    }

    result
}

/// Greatest common divisor
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}

/// Extended Euclidean Algorithm
/// Returns (gcd, x) such that a*x + m*y = gcd for some y
fn extended_gcd(a: &RsaBigInt, m: &RsaBigInt) -> (BigInt, BigInt) {
    let mut old_r = BigInt::from_biguint(Sign::Plus, a.clone());
    let mut r = BigInt::from_biguint(Sign::Plus, m.clone());
    let mut old_x = BigInt::one();
    let mut x = BigInt::zero();

    while !r.is_zero() {
        let q = &old_r / &r;

        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_x = &old_x - &q * &x;
        old_x = std::mem::replace(&mut x, next_x);
    }

    (old_r, old_x)
}

/// Compute modular inverse: a^(-1) mod m, normalised into [0, m)
///
/// Returns 0 when m == 1. Fails with `ModularInverseUndefined` when
/// gcd(a, m) != 1 or m == 0.
pub fn modular_inverse(a: &RsaBigInt, m: &RsaBigInt) -> RsaResult<RsaBigInt> {
    if m.is_zero() {
        return Err(RsaError::ModularInverseUndefined);
    }
    if m.is_one() {
        return Ok(RsaBigInt::zero());
    }

    let (g, x) = extended_gcd(&(a % m), m);
    if !g.is_one() {
        return Err(RsaError::ModularInverseUndefined);
    }

    let m_signed = BigInt::from_biguint(Sign::Plus, m.clone());
    let mut x = x % &m_signed;
    if x.is_negative() {
        x += &m_signed;
    }

    // x lies in [0, m) here, so the magnitude is the value
    Ok(x.magnitude().clone())
}

/// Pick e uniformly from [2, phi) until gcd(e, phi) == 1
pub fn get_coprime<R>(phi: &RsaBigInt, rng: &mut R, config: &EngineConfig) -> RsaResult<RsaBigInt>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let two = from_u64(2);
    if phi <= &two {
        return Err(RsaError::InvalidKeyMaterial(format!(
            "totient {} leaves no exponent in [2, phi)",
            phi
        )));
    }

    for _ in 0..config.max_coprime_attempts {
        let e = uniform_in_range(rng, &two, phi, config.sampling)?;
        if gcd(&e, phi).is_one() {
            return Ok(e);
        }
    }

    Err(RsaError::CoprimeSearchExhausted {
        attempts: config.max_coprime_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Sampling;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_mod_pow() {
        // 3^5 mod 7 = 243 mod 7 = 5
        let base = from_u64(3);
        let exp = from_u64(5);
        let modulus = from_u64(7);
        let result = mod_pow(&base, &exp, &modulus);
        assert_eq!(result, from_u64(5));
    }

    #[test]
    fn test_mod_pow_textbook_vector() {
        // 'A' under (e=17, n=3233)
        let n = from_u64(3233);
        let c = mod_pow(&from_u64(65), &from_u64(17), &n);
        assert_eq!(c, from_u64(2790));
        assert_eq!(mod_pow(&c, &from_u64(2753), &n), from_u64(65));
    }

    #[test]
    fn test_mod_pow_matches_num_bigint() {
        let base = from_u64(0xDEAD_BEEF);
        let exp = from_u64(65537);
        let modulus = from_u64(1_000_000_007);
        assert_eq!(mod_pow(&base, &exp, &modulus), base.modpow(&exp, &modulus));
        assert_eq!(mod_pow(&base, &exp, &from_u64(1)), from_u64(0));
    }

    #[test]
    fn test_mod_inverse() {
        // 3 * 5 = 15 ≡ 1 mod 7, so inverse of 3 mod 7 is 5
        let a = from_u64(3);
        let m = from_u64(7);
        let inv = modular_inverse(&a, &m).unwrap();
        assert_eq!(inv, from_u64(5));

        // Verify: 3 * 5 = 15 ≡ 1 (mod 7)
        assert_eq!((a * inv) % m, from_u64(1));
    }

    #[test]
    fn test_mod_inverse_textbook_vector() {
        assert_eq!(modular_inverse(&from_u64(17), &from_u64(3120)).unwrap(), from_u64(2753));
    }

    #[test]
    fn test_mod_inverse_modulus_one() {
        assert_eq!(modular_inverse(&from_u64(42), &from_u64(1)).unwrap(), from_u64(0));
    }

    #[test]
    fn test_mod_inverse_undefined() {
        let result = modular_inverse(&from_u64(6), &from_u64(9));
        assert!(matches!(result, Err(RsaError::ModularInverseUndefined)));

        let result = modular_inverse(&from_u64(6), &from_u64(0));
        assert!(matches!(result, Err(RsaError::ModularInverseUndefined)));
    }

    #[test]
    fn test_mod_inverse_reduces_operand() {
        // 10 ≡ 3 (mod 7)
        assert_eq!(modular_inverse(&from_u64(10), &from_u64(7)).unwrap(), from_u64(5));
    }

    #[test]
    fn test_get_coprime() {
        let mut rng = StdRng::seed_from_u64(42);
        let phi = from_u64(3120);

        for sampling in [Sampling::Rejection, Sampling::ModuloReduction] {
            let config = EngineConfig::default().with_sampling(sampling);
            for _ in 0..50 {
                let e = get_coprime(&phi, &mut rng, &config).unwrap();
                assert!(e >= from_u64(2) && e < phi);
                assert_eq!(gcd(&e, &phi), from_u64(1));
            }
        }
    }

    #[test]
    fn test_get_coprime_small_totient() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = EngineConfig::default();

        // phi = (2-1)(3-1) = 2: nothing in [2, 2)
        let result = get_coprime(&from_u64(2), &mut rng, &config);
        assert!(matches!(result, Err(RsaError::InvalidKeyMaterial(_))));

        // phi = 4: only 3 qualifies
        assert_eq!(get_coprime(&from_u64(4), &mut rng, &config).unwrap(), from_u64(3));
    }

    #[test]
    fn test_get_coprime_exhausted() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = EngineConfig::default().with_max_coprime_attempts(0);

        let result = get_coprime(&from_u64(3120), &mut rng, &config);
        assert!(matches!(result, Err(RsaError::CoprimeSearchExhausted { attempts: 0 })));
    }

    proptest! {
        #[test]
        fn test_mod_inverse_property(a in 1u64..1_000_000, m in 2u64..1_000_000) {
            let (a, m) = (from_u64(a), from_u64(m));
            match modular_inverse(&a, &m) {
                Ok(inv) => {
                    prop_assert!(inv < m);
                    prop_assert_eq!((&a * &inv) % &m, from_u64(1));
                }
                Err(_) => prop_assert!(!gcd(&a, &m).is_one()),
            }
        }

        #[test]
        fn test_mod_pow_property(base in 0u64..u64::MAX, exp in 0u64..10_000, m in 1u64..u64::MAX) {
            let (base, exp, m) = (from_u64(base), from_u64(exp), from_u64(m));
            prop_assert_eq!(mod_pow(&base, &exp, &m), base.modpow(&exp, &m));
        }
    }
}
