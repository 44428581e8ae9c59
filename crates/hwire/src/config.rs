// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client configuration - defaults, file/env loading, live runtime settings
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: compile-time defaults (`DEFAULT_*` constants)
//! - **Level 2 (Loaded)**: [`ClientConfig`], from code, YAML or environment
//! - **Level 3 (Live)**: [`RuntimeConfig`], shared by a connection and
//!   updatable while requests are in flight (`ArcSwap`, no lock on read)
//!
//! # Example
//!
//! ```
//! use hwire::config::{ClientConfig, RuntimeConfig};
//! use std::time::Duration;
//!
//! let config = ClientConfig::new()
//!     .with_collector_capacity(64)
//!     .with_reply_timeout(Duration::from_secs(2));
//! config.validate()?;
//!
//! let runtime = RuntimeConfig::new(config);
//! runtime.set_reply_timeout(Duration::from_millis(500))?;
//! assert_eq!(runtime.reply_timeout(), Duration::from_millis(500));
//! # Ok::<(), hwire::Error>(())
//! ```

use crate::error::{Error, Result};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::Duration;

// =======================================================================
// Defaults
// =======================================================================

/// Default collector capacity when none is configured
pub const DEFAULT_COLLECTOR_CAPACITY: usize = 5000;

/// Smallest valid collector capacity
pub const MIN_COLLECTOR_CAPACITY: usize = 1;

/// Default wait for a reply to a request
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Environment override for the collector capacity
pub const ENV_COLLECTOR_CAPACITY: &str = "HWIRE_COLLECTOR_CAPACITY";

/// Environment override for the reply timeout, in milliseconds
pub const ENV_REPLY_TIMEOUT_MS: &str = "HWIRE_REPLY_TIMEOUT_MS";

/// Name given to the inbound reader thread
pub const READER_THREAD_NAME: &str = "hwire-reader";

/// How often an idle reader thread re-checks the connected flag
pub const READER_POLL_INTERVAL: Duration = Duration::from_millis(50);

// =======================================================================
// ClientConfig
// =======================================================================

/// Settings applied to collectors created by a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default, deny_unknown_fields))]
pub struct ClientConfig {
    /// Capacity of collectors created through the connection
    pub collector_capacity: usize,
    /// Default reply wait in milliseconds
    pub reply_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            collector_capacity: DEFAULT_COLLECTOR_CAPACITY,
            reply_timeout_ms: DEFAULT_REPLY_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ClientConfig {
    /// Configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collector capacity
    #[must_use]
    pub fn with_collector_capacity(mut self, capacity: usize) -> Self {
        self.collector_capacity = capacity;
        self
    }

    /// Set the default reply timeout (rounded up to whole milliseconds)
    #[must_use]
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout_ms = ceil_millis(timeout);
        self
    }

    /// Default reply timeout
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    /// Check invariants (capacity >= 1, non-zero reply timeout)
    pub fn validate(&self) -> Result<()> {
        if self.collector_capacity < MIN_COLLECTOR_CAPACITY {
            return Err(Error::InvalidCapacity(self.collector_capacity));
        }
        if self.reply_timeout_ms == 0 {
            return Err(Error::Config("reply_timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }

    /// Apply `HWIRE_*` environment overrides and validate.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (environment-shaped).
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_COLLECTOR_CAPACITY) {
            self.collector_capacity = parse_override(ENV_COLLECTOR_CAPACITY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_REPLY_TIMEOUT_MS) {
            self.reply_timeout_ms = parse_override(ENV_REPLY_TIMEOUT_MS, &raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Parse and validate a YAML document.
    ///
    /// ```yaml
    /// collector_capacity: 256
    /// reply_timeout_ms: 2000
    /// ```
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    #[cfg(feature = "config-loaders")]
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        log::debug!("[config] loading client config from {}", path.display());
        Self::from_yaml_str(&yaml)
    }
}

/// Whole milliseconds, rounded up so a non-zero duration never becomes 0.
fn ceil_millis(timeout: Duration) -> u64 {
    let mut millis = timeout.as_millis();
    if timeout.subsec_nanos() % 1_000_000 != 0 {
        millis += 1;
    }
    u64::try_from(millis).unwrap_or(u64::MAX)
}

fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("{}='{}': {}", key, raw, e)))
}

// =======================================================================
// RuntimeConfig
// =======================================================================

/// Live, shared configuration of one connection.
///
/// Clones share the same underlying settings. Reads are an atomic load;
/// updates swap in a new snapshot and only affect collectors created
/// afterwards.
#[derive(Clone)]
pub struct RuntimeConfig {
    current: Arc<ArcSwap<ClientConfig>>,
}

impl RuntimeConfig {
    /// Wrap a (validated) client configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Current settings snapshot
    pub fn snapshot(&self) -> Arc<ClientConfig> {
        self.current.load_full()
    }

    /// Current reply timeout
    pub fn reply_timeout(&self) -> Duration {
        self.current.load().reply_timeout()
    }

    /// Current collector capacity
    pub fn collector_capacity(&self) -> usize {
        self.current.load().collector_capacity
    }

    /// Change the default reply timeout.
    ///
    /// Sub-millisecond parts round up. Fails with [`Error::Config`] for a
    /// zero timeout.
    pub fn set_reply_timeout(&self, timeout: Duration) -> Result<()> {
        let millis = ceil_millis(timeout);
        if millis == 0 {
            return Err(Error::Config("reply_timeout_ms must be > 0".to_string()));
        }
        self.current.rcu(|cur| {
            let mut next = ClientConfig::clone(cur);
            next.reply_timeout_ms = millis;
            Arc::new(next)
        });
        Ok(())
    }

    /// Change the capacity of future collectors
    pub fn set_collector_capacity(&self, capacity: usize) -> Result<()> {
        if capacity < MIN_COLLECTOR_CAPACITY {
            return Err(Error::InvalidCapacity(capacity));
        }
        self.current.rcu(|cur| {
            let mut next = ClientConfig::clone(cur);
            next.collector_capacity = capacity;
            Arc::new(next)
        });
        Ok(())
    }

    /// Replace every setting at once
    pub fn update(&self, config: ClientConfig) -> Result<()> {
        config.validate()?;
        self.current.store(Arc::new(config));
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RuntimeConfig")
            .field(&*self.current.load())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.collector_capacity, DEFAULT_COLLECTOR_CAPACITY);
        assert_eq!(config.reply_timeout(), DEFAULT_REPLY_TIMEOUT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = ClientConfig::new().with_collector_capacity(0);
        assert!(matches!(config.validate(), Err(Error::InvalidCapacity(0))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig::new().with_reply_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_reply_timeout_rounds_up() {
        let config = ClientConfig::new().with_reply_timeout(Duration::from_micros(1500));
        assert_eq!(config.reply_timeout(), Duration::from_millis(2));

        let config = ClientConfig::new().with_reply_timeout(Duration::from_nanos(1));
        assert_eq!(config.reply_timeout(), Duration::from_millis(1));
        assert!(config.validate().is_ok());

        let config = ClientConfig::new().with_reply_timeout(Duration::from_secs(3));
        assert_eq!(config.reply_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_runtime_rejects_zero_timeout() {
        let runtime = RuntimeConfig::default();

        let err = runtime.set_reply_timeout(Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(runtime.reply_timeout(), DEFAULT_REPLY_TIMEOUT);

        runtime
            .set_reply_timeout(Duration::from_micros(900))
            .expect("timeout");
        assert_eq!(runtime.reply_timeout(), Duration::from_millis(1));
        assert!(runtime.snapshot().validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_COLLECTOR_CAPACITY, "32"),
            (ENV_REPLY_TIMEOUT_MS, " 750 "),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::new()
            .apply_overrides(|k| vars.get(k).map(|v| (*v).to_string()))
            .expect("overrides");
        assert_eq!(config.collector_capacity, 32);
        assert_eq!(config.reply_timeout(), Duration::from_millis(750));
    }

    #[test]
    fn test_override_parse_error() {
        let err = ClientConfig::new()
            .apply_overrides(|k| (k == ENV_REPLY_TIMEOUT_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_REPLY_TIMEOUT_MS));
    }

    #[test]
    fn test_override_zero_capacity_rejected() {
        let err = ClientConfig::new()
            .apply_overrides(|k| (k == ENV_COLLECTOR_CAPACITY).then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCapacity(0)));
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_yaml() {
        let config =
            ClientConfig::from_yaml_str("collector_capacity: 8\nreply_timeout_ms: 1200\n")
                .expect("yaml");
        assert_eq!(config.collector_capacity, 8);
        assert_eq!(config.reply_timeout(), Duration::from_millis(1200));

        // Missing keys fall back to defaults
        let partial = ClientConfig::from_yaml_str("collector_capacity: 3\n").expect("yaml");
        assert_eq!(partial.reply_timeout(), DEFAULT_REPLY_TIMEOUT);

        assert!(ClientConfig::from_yaml_str("collector_capacity: 0\n").is_err());
        assert!(ClientConfig::from_yaml_str("unknown_key: 1\n").is_err());
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "collector_capacity: 12").expect("write");
        writeln!(file, "reply_timeout_ms: 90").expect("write");

        let config = ClientConfig::load_from_file(file.path()).expect("load");
        assert_eq!(config.collector_capacity, 12);
        assert_eq!(config.reply_timeout(), Duration::from_millis(90));

        let missing = ClientConfig::load_from_file("/nonexistent/hwire.yaml");
        assert!(matches!(missing, Err(Error::Io(_))));
    }

    #[test]
    fn test_runtime_config_shared_updates() {
        let runtime = RuntimeConfig::default();
        let clone = runtime.clone();

        clone
            .set_reply_timeout(Duration::from_millis(10))
            .expect("timeout");
        assert_eq!(runtime.reply_timeout(), Duration::from_millis(10));

        assert!(runtime.set_collector_capacity(0).is_err());
        runtime.set_collector_capacity(7).expect("capacity");
        assert_eq!(clone.collector_capacity(), 7);

        assert!(runtime
            .update(ClientConfig::new().with_collector_capacity(0))
            .is_err());
        runtime
            .update(ClientConfig::new().with_collector_capacity(2))
            .expect("update");
        assert_eq!(clone.snapshot().collector_capacity, 2);
    }
}
