//! # Format Rules
//!
//! Identifier formats enforced by the Check pass.

use regex::Regex;
use std::sync::LazyLock;

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("UUID pattern is valid")
});

static REGION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("region pattern is valid"));

// Cognito pool ids are `<region>_<alphanumeric>`, e.g. `eu-west-1_AbC123xyZ`
static USER_POOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9-]+_[0-9A-Za-z]+$").expect("user pool pattern is valid")
});

/// Case-insensitive UUID check (Azure tenant ids are often upper-case)
#[must_use]
pub fn is_uuid(value: &str) -> bool {
    UUID_PATTERN.is_match(&value.to_lowercase())
}

/// Restricted region charset: lowercase letters, digits and hyphens
#[must_use]
pub fn is_aws_region(value: &str) -> bool {
    REGION_PATTERN.is_match(value)
}

#[must_use]
pub fn is_cognito_user_pool_id(value: &str) -> bool {
    USER_POOL_PATTERN.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_accepts_both_cases() {
        assert!(is_uuid("0d1e2f3a-4b5c-6d7e-8f90-a1b2c3d4e5f6"));
        assert!(is_uuid("0D1E2F3A-4B5C-6D7E-8F90-A1B2C3D4E5F6"));
    }

    #[test]
    fn test_uuid_rejects_malformed() {
        for value in [
            "",
            "common",
            "0d1e2f3a4b5c6d7e8f90a1b2c3d4e5f6",
            "0d1e2f3a-4b5c-6d7e-8f90-a1b2c3d4e5f",
            "zd1e2f3a-4b5c-6d7e-8f90-a1b2c3d4e5f6",
        ] {
            assert!(!is_uuid(value), "'{value}' should not be a UUID");
        }
    }

    #[test]
    fn test_region_charset() {
        assert!(is_aws_region("eu-west-1"));
        assert!(is_aws_region("us-gov-west-1"));
        assert!(!is_aws_region("EU-WEST-1"));
        assert!(!is_aws_region("eu_west_1"));
        assert!(!is_aws_region(""));
    }

    #[test]
    fn test_user_pool_id() {
        assert!(is_cognito_user_pool_id("eu-west-1_AbC123xyZ"));
        assert!(!is_cognito_user_pool_id("AbC123xyZ"));
        assert!(!is_cognito_user_pool_id("eu-west-1_"));
        assert!(!is_cognito_user_pool_id("eu-west-1_abc/def"));
    }
}
