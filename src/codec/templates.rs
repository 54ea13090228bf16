//! # Issuer Templates
//!
//! Specialized OIDC flavors derive their issuer URL from higher-level
//! identifiers. The parsers reverse the templates on a best-effort basis:
//! an issuer that does not match yields `None`, never an error.

const AZURE_PREFIX: &str = "https://login.microsoftonline.com/";
const AZURE_SUFFIX: &str = "/v2.0";
const COGNITO_PREFIX: &str = "https://cognito-idp.";
const COGNITO_DOMAIN: &str = ".amazonaws.com/";

/// `https://login.microsoftonline.com/{tenant}/v2.0`
#[must_use]
pub fn azure_issuer(tenant_id: &str) -> String {
    format!("{AZURE_PREFIX}{tenant_id}{AZURE_SUFFIX}")
}

/// Tenant id from an Azure AD v2 issuer
#[must_use]
pub fn parse_azure_issuer(issuer: &str) -> Option<String> {
    let rest = issuer.strip_prefix(AZURE_PREFIX)?;
    let tenant = rest.split('/').next().filter(|t| !t.is_empty())?;
    Some(tenant.to_string())
}

/// `https://cognito-idp.{region}.amazonaws.com/{userPoolId}`
#[must_use]
pub fn cognito_issuer(region: &str, user_pool_id: &str) -> String {
    format!("{COGNITO_PREFIX}{region}{COGNITO_DOMAIN}{user_pool_id}")
}

/// `(region, userPoolId)` from a Cognito user pool issuer
#[must_use]
pub fn parse_cognito_issuer(issuer: &str) -> Option<(String, String)> {
    let rest = issuer.strip_prefix(COGNITO_PREFIX)?;
    let (region, pool) = rest.split_once(COGNITO_DOMAIN)?;
    let pool = pool.trim_end_matches('/');
    if region.is_empty() || region.contains('/') || pool.is_empty() || pool.contains('/') {
        return None;
    }
    Some((region.to_string(), pool.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azure_issuer_round_trip() {
        let tenant = "0d1e2f3a-4b5c-6d7e-8f90-a1b2c3d4e5f6";
        let issuer = azure_issuer(tenant);
        assert_eq!(
            issuer,
            "https://login.microsoftonline.com/0d1e2f3a-4b5c-6d7e-8f90-a1b2c3d4e5f6/v2.0"
        );
        assert_eq!(parse_azure_issuer(&issuer).as_deref(), Some(tenant));
    }

    #[test]
    fn test_azure_issuer_mismatch_is_none() {
        assert_eq!(parse_azure_issuer("https://accounts.google.com"), None);
        assert_eq!(parse_azure_issuer("https://login.microsoftonline.com/"), None);
    }

    #[test]
    fn test_cognito_issuer_round_trip() {
        let issuer = cognito_issuer("eu-west-1", "eu-west-1_AbC123xyZ");
        assert_eq!(
            issuer,
            "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_AbC123xyZ"
        );
        assert_eq!(
            parse_cognito_issuer(&issuer),
            Some(("eu-west-1".to_string(), "eu-west-1_AbC123xyZ".to_string()))
        );
    }

    #[test]
    fn test_cognito_issuer_mismatch_is_none() {
        assert_eq!(parse_cognito_issuer("https://cognito-idp.amazonaws.com/x"), None);
        assert_eq!(parse_cognito_issuer("https://example.com/pool"), None);
        assert_eq!(
            parse_cognito_issuer("https://cognito-idp.eu-west-1.amazonaws.com/"),
            None
        );
    }
}
