//! Identifier helpers.

use rand::RngCore;

/// Number of random bytes in a generated id.
pub const RANDOM_ID_BYTES: usize = 16;

/// 16 bytes from the thread-local CSPRNG, lowercase hex encoded.
///
/// The generator is seeded from the operating system; a failing OS source
/// panics inside `rand`.
#[must_use]
pub fn random_id() -> String {
    let mut bytes = [0_u8; RANDOM_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_32_lowercase_hex_chars() {
        let id = random_id();
        assert_eq!(id.len(), RANDOM_ID_BYTES * 2);
        assert!(
            id.chars()
                .all(|ch| ch.is_ascii_digit() || ('a'..='f').contains(&ch))
        );
    }

    #[test]
    fn ids_do_not_repeat() {
        let ids: HashSet<String> = (0..256).map(|_| random_id()).collect();
        assert_eq!(ids.len(), 256);
    }
}
