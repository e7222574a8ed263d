//! Controller configuration loaded from environment variables.

use crate::error::ControllerError;
use std::net::SocketAddr;
use std::time::Duration;

/// Runtime settings of the controller process
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Namespace for connection secrets that do not name one
    pub watch_namespace: Option<String>,
    /// Requeue interval after a successful reconcile (drift detection)
    pub poll_interval: Duration,
    /// Concurrent reconciles per kind
    pub max_concurrent_reconciles: u16,
    /// Quiet period after the last event before reconciling
    pub debounce: Duration,
    /// Address of the `/healthz` and `/readyz` endpoints
    pub probe_addr: SocketAddr,
    /// Prefix of the finalizer and the server-side apply field manager
    pub controller_name: String,
    pub backoff_min_secs: u64,
    pub backoff_max_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            poll_interval: Duration::from_secs(60),
            max_concurrent_reconciles: 3,
            debounce: Duration::from_secs(5),
            probe_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
            controller_name: "gitlab.crossplane.io".to_string(),
            backoff_min_secs: 5,
            backoff_max_secs: 300,
        }
    }
}

impl ControllerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup; unset variables keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());
        if let Some(v) = lookup("POLL_INTERVAL_SECS") {
            config.poll_interval = Duration::from_secs(parse_number("POLL_INTERVAL_SECS", &v)?);
        }
        if let Some(v) = lookup("MAX_CONCURRENT_RECONCILES") {
            config.max_concurrent_reconciles = parse_number("MAX_CONCURRENT_RECONCILES", &v)?;
        }
        if let Some(v) = lookup("DEBOUNCE_SECS") {
            config.debounce = Duration::from_secs(parse_number("DEBOUNCE_SECS", &v)?);
        }
        if let Some(v) = lookup("PROBE_ADDR") {
            config.probe_addr = v
                .parse()
                .map_err(|_| ControllerError::InvalidConfig(format!("PROBE_ADDR is not a socket address: {}", v)))?;
        }
        if let Some(v) = lookup("CONTROLLER_NAME").filter(|v| !v.is_empty()) {
            config.controller_name = v;
        }
        if let Some(v) = lookup("BACKOFF_MIN_SECS") {
            config.backoff_min_secs = parse_number("BACKOFF_MIN_SECS", &v)?;
        }
        if let Some(v) = lookup("BACKOFF_MAX_SECS") {
            config.backoff_max_secs = parse_number("BACKOFF_MAX_SECS", &v)?;
        }

        if config.max_concurrent_reconciles == 0 {
            return Err(ControllerError::InvalidConfig(
                "MAX_CONCURRENT_RECONCILES must be at least 1".to_string(),
            ));
        }
        if config.backoff_min_secs == 0 || config.backoff_min_secs > config.backoff_max_secs {
            return Err(ControllerError::InvalidConfig(format!(
                "backoff bounds are invalid: min {}s, max {}s",
                config.backoff_min_secs, config.backoff_max_secs
            )));
        }
        Ok(config)
    }

    /// Finalizer placed on every managed object
    pub fn finalizer(&self) -> String {
        format!("{}/managed-resource", self.controller_name)
    }

    /// Namespace for a connection secret reference without one
    pub fn secret_namespace(&self) -> &str {
        self.watch_namespace.as_deref().unwrap_or("default")
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ControllerError> {
    value
        .trim()
        .parse()
        .map_err(|_| ControllerError::InvalidConfig(format!("{} is not a valid number: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ControllerConfig, ControllerError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ControllerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.finalizer(), "gitlab.crossplane.io/managed-resource");
        assert_eq!(config.secret_namespace(), "default");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("WATCH_NAMESPACE", "crossplane-system"),
            ("POLL_INTERVAL_SECS", "120"),
            ("MAX_CONCURRENT_RECONCILES", "8"),
            ("PROBE_ADDR", "127.0.0.1:9000"),
            ("CONTROLLER_NAME", "gitlab.example.org"),
        ])
        .unwrap();

        assert_eq!(config.secret_namespace(), "crossplane-system");
        assert_eq!(config.poll_interval, Duration::from_secs(120));
        assert_eq!(config.max_concurrent_reconciles, 8);
        assert_eq!(config.probe_addr.port(), 9000);
        assert_eq!(config.finalizer(), "gitlab.example.org/managed-resource");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("POLL_INTERVAL_SECS", "soon")]),
            Err(ControllerError::InvalidConfig(_))
        ));
        assert!(matches!(
            load(&[("MAX_CONCURRENT_RECONCILES", "0")]),
            Err(ControllerError::InvalidConfig(_))
        ));
        assert!(matches!(
            load(&[("BACKOFF_MIN_SECS", "30"), ("BACKOFF_MAX_SECS", "10")]),
            Err(ControllerError::InvalidConfig(_))
        ));
    }
}
