//! Typed center configuration from environment variables.

use crate::error::NotifyError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

/// What to do when a delivered notification does not carry the payload type
/// its observer was registered for.
///
/// Registration checks make this unreachable for posts made through the typed
/// center; it only triggers when something posts under a bound name through
/// the untyped bus, or when `validate_on_post` is off.
///
/// `Drop` is the default in debug and release builds alike, so test runs and
/// production handle a stray raw post the same way. Opt into `Panic` with
/// `NOTIFY_MISMATCH_POLICY=panic` for assert-style checking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Log an error and skip the observer.
    #[default]
    Drop,
    /// Panic on the delivering thread.
    Panic,
}

impl FromStr for MismatchPolicy {
    type Err = NotifyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "panic" => Ok(Self::Panic),
            other => Err(NotifyError::Config(format!(
                "unknown mismatch policy '{other}' (expected drop or panic)"
            ))),
        }
    }
}

/// Configuration for a [`TypedNotificationCenter`](crate::TypedNotificationCenter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypedCenterConfig {
    /// Behaviour on payload mismatch at delivery time.
    pub mismatch_policy: MismatchPolicy,

    /// Check catalog membership and name binding on every post.
    pub validate_on_post: bool,
}

impl Default for TypedCenterConfig {
    fn default() -> Self {
        Self {
            mismatch_policy: MismatchPolicy::Drop,
            validate_on_post: true,
        }
    }
}

impl TypedCenterConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NOTIFY_MISMATCH_POLICY`: `drop` or `panic` (default: drop)
    /// - `NOTIFY_VALIDATE_ON_POST`: validate posts (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Unparseable values are logged and replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mismatch_policy = match lookup("NOTIFY_MISMATCH_POLICY") {
            Some(raw) => raw.parse().unwrap_or_else(|e: NotifyError| {
                warn!(error = %e, "Ignoring NOTIFY_MISMATCH_POLICY");
                defaults.mismatch_policy
            }),
            None => defaults.mismatch_policy,
        };

        let validate_on_post = lookup("NOTIFY_VALIDATE_ON_POST")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(defaults.validate_on_post);

        Self {
            mismatch_policy,
            validate_on_post,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TypedCenterConfig::default();
        assert_eq!(config.mismatch_policy, MismatchPolicy::Drop);
        assert!(config.validate_on_post);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("drop".parse::<MismatchPolicy>(), Ok(MismatchPolicy::Drop));
        assert_eq!(" PANIC ".parse::<MismatchPolicy>(), Ok(MismatchPolicy::Panic));
        assert!(matches!(
            "explode".parse::<MismatchPolicy>(),
            Err(NotifyError::Config(_))
        ));
    }

    #[test]
    fn test_from_lookup_missing_values_use_defaults() {
        let config = TypedCenterConfig::from_lookup(|_| None);
        assert_eq!(config, TypedCenterConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_both_variables() {
        let config = TypedCenterConfig::from_lookup(|key| match key {
            "NOTIFY_MISMATCH_POLICY" => Some("Panic".to_string()),
            "NOTIFY_VALIDATE_ON_POST" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(config.mismatch_policy, MismatchPolicy::Panic);
        assert!(!config.validate_on_post);
    }

    #[test]
    fn test_from_lookup_bad_values() {
        let config = TypedCenterConfig::from_lookup(|key| match key {
            "NOTIFY_MISMATCH_POLICY" => Some("explode".to_string()),
            "NOTIFY_VALIDATE_ON_POST" => Some("maybe".to_string()),
            _ => None,
        });
        // Unknown policy falls back; anything but false/0 keeps validation on.
        assert_eq!(config.mismatch_policy, MismatchPolicy::Drop);
        assert!(config.validate_on_post);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: TypedCenterConfig =
            serde_json::from_str(r#"{ "mismatch_policy": "panic" }"#).expect("valid json");
        assert_eq!(config.mismatch_policy, MismatchPolicy::Panic);
        assert!(config.validate_on_post);
    }
}
