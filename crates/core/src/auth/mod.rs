//! Authentication helpers.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - Display-name resolution shared by login responses and reports

mod password;

pub use password::{PasswordError, equalize_login_timing, hash_password, verify_password};

/// Returns "first last", or the login handle when no name is set.
#[must_use]
pub fn display_name(first_name: &str, last_name: &str, username: &str) -> String {
    let full = format!("{} {}", first_name.trim(), last_name.trim());
    let full = full.trim();
    if full.is_empty() {
        username.to_string()
    } else {
        full.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_uses_full_name() {
        assert_eq!(display_name("Ada", "Lovelace", "alovelace"), "Ada Lovelace");
    }

    #[test]
    fn test_display_name_with_single_part() {
        assert_eq!(display_name("", "Lovelace", "alovelace"), "Lovelace");
        assert_eq!(display_name("Ada", " ", "alovelace"), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        assert_eq!(display_name("", "", "stu001"), "stu001");
        assert_eq!(display_name("  ", "\t", "stu001"), "stu001");
    }
}
