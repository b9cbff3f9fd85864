//! Email normalization helpers
//!
//! Membership records and workspace accounts are joined by email address.
//! Both sides pass through `normalize_email` so the join key is stable
//! regardless of casing or stray whitespace in either source.

/// Normalize an email address for use as a join key.
///
/// Lowercases and trims surrounding whitespace. Does not attempt
/// provider-specific canonicalization (gmail dots, plus-addressing);
/// both data sources store the address the member typed.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
