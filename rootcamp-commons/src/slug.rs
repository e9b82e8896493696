//! Random identifiers for sandboxes and lesson secrets.
//!
//! Neither value guards anything, so a thread-local PRNG is enough.

use rand::Rng;

const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Excludes the look-alike glyphs 0, O, 1 and I.
const SECRET_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

fn sample(charset: &[u8], length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(charset[rng.random_range(0..charset.len())]))
        .collect()
}

/// Lowercase alphanumeric identifier of `length` characters.
///
/// ```
/// let id = rootcamp_commons::slug::short_id(8);
/// assert_eq!(id.len(), 8);
/// assert!(!id.contains('/'));
/// ```
pub fn short_id(length: usize) -> String {
    sample(ID_CHARSET, length)
}

/// Secret code shaped like `ABCD-EFGH-JKLM`.
pub fn secret_code() -> String {
    let raw = sample(SECRET_CHARSET, 12);
    let (head, tail) = raw.split_at(4);
    let (middle, last) = tail.split_at(4);
    format!("{head}-{middle}-{last}")
}
