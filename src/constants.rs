//! # Constants
//!
//! Shared constants used throughout the reconcilers.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default Dex gRPC endpoint (host:port)
pub const DEFAULT_DEX_HOST: &str = "127.0.0.1:5557";

/// Default per-RPC deadline (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default pause between a client delete and its verification listing (milliseconds)
/// Dex storage backends are not always read-your-writes
pub const DEFAULT_DELETE_SETTLE_MS: u64 = 200;

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Number of random bytes in a generated client secret (256 bits)
pub const GENERATED_SECRET_BYTES: usize = 32;

/// Dex connector type for the generic OIDC connector
pub const OIDC_CONNECTOR_TYPE: &str = "oidc";

/// Default scopes for generic OIDC connectors
pub const DEFAULT_OIDC_SCOPES: &[&str] = &["openid", "profile", "email"];

/// Default scopes for Azure AD / Entra ID OIDC connectors
pub const DEFAULT_AZURE_SCOPES: &[&str] = &["openid", "profile", "email", "offline_access"];

/// Default scopes for AWS Cognito OIDC connectors
pub const DEFAULT_COGNITO_SCOPES: &[&str] = &["openid", "email", "profile"];

/// Default username claim for Azure OIDC connectors
pub const DEFAULT_AZURE_USERNAME_SOURCE: &str = "preferred_username";

/// Default username claim for Cognito OIDC connectors
pub const DEFAULT_COGNITO_USERNAME_SOURCE: &str = "email";

/// Allowed username claims for Azure OIDC connectors
pub const AZURE_USERNAME_SOURCES: &[&str] = &["preferred_username", "upn", "email"];

/// Allowed username claims for Cognito OIDC connectors
pub const COGNITO_USERNAME_SOURCES: &[&str] = &["email", "sub"];

/// Well-known Azure tenants accepted in place of a tenant UUID
pub const AZURE_WELL_KNOWN_TENANTS: &[&str] = &["common", "organizations", "consumers"];

/// Allowed GitHub team name fields
pub const GITHUB_TEAM_NAME_FIELDS: &[&str] = &["name", "slug", "both"];

/// Default GitHub team name field
pub const DEFAULT_GITHUB_TEAM_NAME_FIELD: &str = "slug";

/// Default GitLab base URL
pub const DEFAULT_GITLAB_BASE_URL: &str = "https://gitlab.com";

/// Allowed Google prompt types
pub const GOOGLE_PROMPT_TYPES: &[&str] = &["consent", "select_account", "login", "none"];

/// Default Google prompt type
pub const DEFAULT_GOOGLE_PROMPT_TYPE: &str = "consent";
