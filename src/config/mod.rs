//! # Configuration
//!
//! Provider-level settings: where Dex lives, how long each RPC may take,
//! and how the process logs.

mod provider;

pub use provider::{LogFormat, LoggingConfig, ProviderConfig};
