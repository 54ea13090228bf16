//! # Secret Policy
//!
//! Secret-bearing values and the rule for where a client secret comes from.
//!
//! - [`SecretString`] wraps every secret field. It prints as `***` in
//!   `Debug`/`Display` and wipes its buffer on drop.
//! - [`SecretPolicy`] accepts a caller-supplied secret or synthesizes one
//!   from the operating system RNG.

use crate::constants::GENERATED_SECRET_BYTES;
use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret value that never shows up in diagnostics
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the plaintext. Only call this to put the value on the wire.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Outcome of [`SecretPolicy::resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    pub value: SecretString,
    /// True when the value was synthesized rather than supplied
    pub generated: bool,
}

/// Decides which secret a new client is registered with
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretPolicy;

impl SecretPolicy {
    /// Use `supplied` when present and non-empty, otherwise generate one.
    ///
    /// # Errors
    /// Returns an error if the operating system RNG is unavailable
    pub fn resolve(supplied: Option<&SecretString>) -> Result<ResolvedSecret, rand::Error> {
        match supplied {
            Some(secret) if !secret.is_empty() => Ok(ResolvedSecret {
                value: secret.clone(),
                generated: false,
            }),
            _ => Ok(ResolvedSecret {
                value: Self::generate()?,
                generated: true,
            }),
        }
    }

    /// 256 random bits, URL-safe base64 with padding (44 characters)
    ///
    /// # Errors
    /// Returns an error if the operating system RNG is unavailable
    pub fn generate() -> Result<SecretString, rand::Error> {
        let mut bytes = [0u8; GENERATED_SECRET_BYTES];
        OsRng.try_fill_bytes(&mut bytes)?;
        let encoded = general_purpose::URL_SAFE.encode(bytes);
        bytes.zeroize();
        Ok(SecretString(encoded))
    }
}
