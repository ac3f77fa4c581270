//! Shareable-code generation for join codes and attendance sessions.

use rand::Rng;

/// Alphabet without 0/O/1/I so codes stay readable when displayed or
/// scanned from a QR.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of attendance-session codes.
pub const SESSION_CODE_LEN: usize = 8;

/// Length of class-section join codes.
pub const JOIN_CODE_LEN: usize = 6;

/// Resample bound before code generation gives up with
/// `CodeGenerationFailed`.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Samples `len` characters independently from [`CODE_ALPHABET`].
///
/// The randomness source is injected so callers can seed it
/// deterministically in tests.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
