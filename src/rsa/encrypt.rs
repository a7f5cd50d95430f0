// RSA Encryption Implementation
// Textbook RSA applied to each character's code point, no padding

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::bigint::{from_u64, mod_pow, RsaBigInt};
use super::keygen::RsaPublicKey;

/// Separator between per-character ciphertext units
pub const CHUNK_SEPARATOR: &str = " ";

/// Encrypt a single code point: c = m^e mod n
///
/// Code points at or above the modulus wrap around and will not decrypt back
/// to the same character.
pub fn encrypt_char(ch: char, public_key: &RsaPublicKey) -> RsaBigInt {
    mod_pow(&from_u64(u64::from(ch)), &public_key.e, &public_key.n)
}

/// Encrypt each character, join the decimal results with spaces and base64
/// the joined text
pub fn encrypt_string(plaintext: &str, public_key: &RsaPublicKey) -> String {
    let joined = plaintext
        .chars()
        .map(|ch| encrypt_char(ch, public_key).to_string())
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR);

    STANDARD.encode(joined.as_bytes())
}

/// True when every character of `plaintext` is below the modulus and survives
/// a round trip
pub fn is_encodable(plaintext: &str, public_key: &RsaPublicKey) -> bool {
    plaintext
        .chars()
        .all(|ch| from_u64(u64::from(ch)) < public_key.n)
}
