//! # Reconcile Errors
//!
//! Error taxonomy returned by every reconciler operation.
//!
//! - Validation failures are collected, never first-error-only.
//! - Remote failures always carry the operation, object kind and id.
//! - Nothing here ever formats a secret value.

use crate::codec::CodecError;
use crate::remote::RemoteError;
use crate::validation::{join_failures, CheckFailure};
use thiserror::Error;

/// Reconciler operation names as they appear in errors and spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Operation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid inputs: {}", join_failures(.0))]
    Validation(Vec<CheckFailure>),

    #[error(
        "{kind} \"{id}\": {field} cannot be changed in place; delete and recreate the object to change it"
    )]
    ReplaceRequired {
        kind: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("dex {operation} {kind} {id:?}: {source}")]
    Remote {
        operation: Operation,
        kind: &'static str,
        id: String,
        #[source]
        source: RemoteError,
    },

    #[error("{kind} {id:?} failed verification: {reason}")]
    VerificationFailed {
        kind: &'static str,
        id: String,
        reason: String,
    },

    #[error("{kind} {id:?}: {source}")]
    Codec {
        kind: &'static str,
        id: String,
        #[source]
        source: CodecError,
    },

    #[error("{kind}: no id in the request or the prior state")]
    MissingId { kind: &'static str },

    #[error("failed to generate client secret: {0}")]
    SecretGeneration(#[from] rand::Error),
}

impl ReconcileError {
    pub fn remote(
        operation: Operation,
        kind: &'static str,
        id: impl Into<String>,
        source: RemoteError,
    ) -> Self {
        Self::Remote {
            operation,
            kind,
            id: id.into(),
            source,
        }
    }

    pub fn codec(kind: &'static str, id: impl Into<String>, source: CodecError) -> Self {
        Self::Codec {
            kind,
            id: id.into(),
            source,
        }
    }

    /// Field-level failures, if this is a validation error
    #[must_use]
    pub fn failures(&self) -> Option<&[CheckFailure]> {
        match self {
            Self::Validation(failures) => Some(failures),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                source: RemoteError::NotFound,
                ..
            }
        )
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                source: RemoteError::Timeout(_),
                ..
            }
        )
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_remote_error_names_operation_kind_and_id() {
        let err = ReconcileError::remote(
            Operation::Create,
            "client",
            "web-app",
            RemoteError::Unavailable("connection refused".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "dex create client \"web-app\": dex unavailable: connection refused"
        );
    }

    #[test]
    fn test_timeout_is_detectable() {
        let err = ReconcileError::remote(
            Operation::Read,
            "connector",
            "github",
            RemoteError::Timeout(Duration::from_secs(5)),
        );
        assert!(err.is_timeout());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_validation_error_lists_every_failure() {
        let err = ReconcileError::Validation(vec![
            CheckFailure::new("tenantId", "must be a valid UUID"),
            CheckFailure::new("name", "name is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid inputs: tenantId: must be a valid UUID; name: name is required"
        );
        assert_eq!(err.failures().map(<[CheckFailure]>::len), Some(2));
    }

    #[test]
    fn test_replace_required_message() {
        let err = ReconcileError::ReplaceRequired {
            kind: "azure-oidc-connector",
            id: "azure".to_string(),
            field: "tenantId",
        };
        let message = err.to_string();
        assert!(message.contains("tenantId cannot be changed in place"));
        assert!(message.contains("delete and recreate"));
    }
}
