// RSA Module - Main module file
// Exports the number-theory core and the key/cipher engine

pub mod bigint;
pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod keygen;
pub mod prime;
pub mod random;

pub use bigint::{get_coprime, mod_pow, modular_inverse, RsaBigInt};
pub use decrypt::decrypt_to_string;
pub use encrypt::{encrypt_string, is_encodable};
pub use error::{DecodingError, RsaError, RsaResult};
pub use keygen::{RsaKeyPair, RsaPrivateKey, RsaPublicKey};
pub use prime::{generate_prime, generate_prime_pair, generate_prime_pair_with, is_probable_prime};
pub use random::{random_with_bit_length, uniform_in_range};
