//! Textbook RSA built from primitive big-integer arithmetic: Miller-Rabin,
//! random prime search, extended Euclid and square-and-multiply.
//!
//! No padding and no side-channel hardening. Each character is encrypted on
//! its own, so this is for study, not for protecting data.

pub mod config;
pub mod rsa;
pub mod ui;
pub mod util;
