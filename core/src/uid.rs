//! DICOM unique identifiers
//!
//! UIDs use the `2.25` root, which turns a random UUID into a valid DICOM
//! UID without a registered organisation prefix. They are drawn from the
//! operating system, not the seeded generator, so two runs with the same
//! seed differ only in their identifiers.

use uuid::Uuid;

/// Generates a new `2.25.<decimal uuid>` UID
pub fn generate_uid() -> String {
    format!("2.25.{}", Uuid::new_v4().as_u128())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_shape() {
        let uid = generate_uid();
        assert!(uid.starts_with("2.25."));
        assert!(uid.len() <= 64);
        assert!(uid[5..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_uids_are_unique() {
        assert_ne!(generate_uid(), generate_uid());
    }
}
