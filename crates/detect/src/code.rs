//! Fixed mapping between per-species detection tuples and observation codes.
//!
//! Species `s` contributes bit `s`, and the code is the bitmask plus one.
//! For two species:
//!
//! | species 1 | species 2 | code |
//! |-----------|-----------|------|
//! | 0         | 0         | 1    |
//! | 1         | 0         | 2    |
//! | 0         | 1         | 3    |
//! | 1         | 1         | 4    |
//!
//! The same mapping numbers the latent occupancy states.

/// Largest species count whose codes fit in a `u8`.
pub const MAX_SPECIES: usize = 7;

/// Largest code for `s` species (`2^s`).
///
/// Returns `None` unless `s` is in `1..=MAX_SPECIES`.
pub const fn max_code(s: usize) -> Option<u8> {
    if s == 0 || s > MAX_SPECIES {
        None
    } else {
        Some(1u8 << s)
    }
}

/// Folds a detection tuple into its observation code in `1..=2^S`.
pub fn encode<const S: usize>(bits: [bool; S]) -> u8 {
    const { assert!(S >= 1 && S <= MAX_SPECIES, "observation codes fit in u8 only for 1..=7 species") };
    let mask = bits
        .iter()
        .enumerate()
        .fold(0u8, |m, (s, &b)| m | (u8::from(b) << s));
    mask + 1
}

/// Recovers the detection tuple of an observation code.
///
/// Returns `None` if `code` is outside `1..=2^S`.
pub fn decode<const S: usize>(code: u8) -> Option<[bool; S]> {
    if code == 0 || usize::from(code) > (1usize << S) {
        return None;
    }
    let mask = code - 1;
    Some(std::array::from_fn(|s| (mask >> s) & 1 == 1))
}
