//! Opaque session tokens.

/// Number of random bytes behind a token.
const TOKEN_BYTES: usize = 16;

/// Issues and recognizes session tokens.
///
/// A token is 16 random bytes rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionTokenGenerator;

impl SessionTokenGenerator {
    /// Length of an encoded token.
    pub const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

    pub fn new() -> Self {
        Self
    }

    /// Generates a fresh token.
    pub fn generate(&self) -> String {
        hex::encode(rand::random::<[u8; TOKEN_BYTES]>())
    }

    /// Returns `true` if `token` could have been issued by [`generate`].
    ///
    /// [`generate`]: Self::generate
    pub fn is_well_formed(token: &str) -> bool {
        token.len() == Self::TOKEN_LENGTH
            && token
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }
}
