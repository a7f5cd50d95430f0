// RSA Decryption Implementation
// Reverses the base64 transport encoding and decrypts each chunk with d

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::bigint::{mod_pow, RsaBigInt};
use super::encrypt::CHUNK_SEPARATOR;
use super::error::DecodingError;
use super::keygen::RsaPrivateKey;

/// Decrypt one ciphertext unit: m = c^d mod n
pub fn decrypt_chunk(c: &RsaBigInt, private_key: &RsaPrivateKey) -> RsaBigInt {
    mod_pow(c, &private_key.d, &private_key.n)
}

/// Decode the transport string into the list of ciphertext units
pub fn decode_ciphertext(
    ciphertext: &str,
    private_key: &RsaPrivateKey,
) -> Result<Vec<RsaBigInt>, DecodingError> {
    let joined = String::from_utf8(STANDARD.decode(ciphertext.trim())?)?;
    if joined.is_empty() {
        return Ok(Vec::new());
    }

    joined
        .split(CHUNK_SEPARATOR)
        .enumerate()
        .map(|(index, chunk)| {
            let invalid = || DecodingError::InvalidChunk {
                index,
                chunk: chunk.to_string(),
            };

            if chunk.is_empty() || !chunk.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let c = RsaBigInt::parse_bytes(chunk.as_bytes(), 10).ok_or_else(invalid)?;

            if c >= private_key.n {
                return Err(DecodingError::ChunkOutOfRange { index });
            }
            Ok(c)
        })
        .collect()
}

/// Decrypt a base64 ciphertext back to text
///
/// A chunk that decrypts to something other than a Unicode scalar value is
/// reported as `InvalidCodePoint` rather than replaced.
pub fn decrypt_to_string(
    ciphertext: &str,
    private_key: &RsaPrivateKey,
) -> Result<String, DecodingError> {
    decode_ciphertext(ciphertext, private_key)?
        .iter()
        .enumerate()
        .map(|(index, c)| {
            let m = decrypt_chunk(c, private_key);
            u32::try_from(&m)
                .ok()
                .and_then(char::from_u32)
                .ok_or(DecodingError::InvalidCodePoint { index, value: m })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::rsa::bigint::from_u64;
    use crate::rsa::keygen::RsaKeyPair;
    use crate::rsa::prime::generate_prime;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn textbook_key() -> RsaPrivateKey {
        RsaPrivateKey {
            n: from_u64(3233),
            d: from_u64(2753),
        }
    }

    fn encode(joined: &str) -> String {
        STANDARD.encode(joined.as_bytes())
    }

    fn generated_keypair(seed: u64) -> RsaKeyPair {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = EngineConfig::default();
        let p = generate_prime(64, &mut rng, &config).unwrap();
        let q = generate_prime(64, &mut rng, &config).unwrap();
        RsaKeyPair::new(p, q, &mut rng, &config).unwrap()
    }

    #[test]
    fn test_decrypt_chunk() {
        assert_eq!(decrypt_chunk(&from_u64(2790), &textbook_key()), from_u64(65));
    }

    #[test]
    fn test_decrypt_textbook_string() {
        assert_eq!(decrypt_to_string(&encode("2790 2790"), &textbook_key()).unwrap(), "AA");
    }

    #[test]
    fn test_roundtrip_textbook_key() {
        let keypair = RsaKeyPair::with_public_exponent(
            from_u64(61),
            from_u64(53),
            from_u64(17),
            &mut StdRng::seed_from_u64(0),
            &EngineConfig::default(),
        )
        .unwrap();

        let message = "Hello, RSA! ~ 0123456789";
        let ciphertext = keypair.encrypt(message);
        assert_eq!(keypair.decrypt(&ciphertext).unwrap(), message);
    }

    #[test]
    fn test_roundtrip_unicode() {
        let keypair = generated_keypair(17);
        let message = "héllo wörld, 日本語, emoji 🦀";

        let ciphertext = keypair.encrypt(message);
        assert_eq!(keypair.decrypt(&ciphertext).unwrap(), message);
    }

    #[test]
    fn test_roundtrip_empty() {
        let keypair = generated_keypair(3);
        assert_eq!(keypair.decrypt(&keypair.encrypt("")).unwrap(), "");
    }

    #[test]
    fn test_decrypt_not_base64() {
        let result = decrypt_to_string("this is *not* base64!", &textbook_key());
        assert!(matches!(result, Err(DecodingError::Base64(_))));
    }

    #[test]
    fn test_decrypt_not_utf8() {
        let ciphertext = STANDARD.encode([0xFFu8, 0xFE, 0x00]);
        let result = decrypt_to_string(&ciphertext, &textbook_key());
        assert!(matches!(result, Err(DecodingError::Utf8(_))));
    }

    #[test]
    fn test_decrypt_malformed_chunks() {
        let key = textbook_key();

        for joined in ["2790 abc", "2790  2790", "2790,2790", "-5", " 2790", "2790 "] {
            let result = decrypt_to_string(&encode(joined), &key);
            assert!(
                matches!(result, Err(DecodingError::InvalidChunk { .. })),
                "{:?} gave {:?}",
                joined,
                result
            );
        }
    }

    #[test]
    fn test_decrypt_chunk_out_of_range() {
        let result = decrypt_to_string(&encode("2790 3233"), &textbook_key());
        assert!(matches!(result, Err(DecodingError::ChunkOutOfRange { index: 1 })));
    }

    #[test]
    fn test_decrypt_invalid_code_point() {
        // Any chunk decrypting into the surrogate range is not a char
        let keypair = generated_keypair(5);
        let e = &keypair.public_key().e;
        let c = mod_pow(&from_u64(0xD800), e, keypair.modulus());
        let result = keypair.private_key().decrypt(&encode(&c.to_string()));

        assert!(matches!(result, Err(DecodingError::InvalidCodePoint { index: 0, .. })));
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let keypair1 = generated_keypair(1);
        let keypair2 = generated_keypair(2);

        let ciphertext = keypair1.encrypt("Test");
        // Either rejected outright or decrypted to something else
        match keypair2.decrypt(&ciphertext) {
            Ok(text) => assert_ne!(text, "Test"),
            Err(_) => {}
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_roundtrip_property(message in "\\PC{0,40}") {
            let keypair = generated_keypair(99);
            let ciphertext = keypair.encrypt(&message);
            prop_assert_eq!(keypair.decrypt(&ciphertext).unwrap(), message);
        }

        #[test]
        fn test_garbage_never_panics(input in "\\PC{0,64}") {
            let _ = decrypt_to_string(&input, &textbook_key());
        }
    }
}
