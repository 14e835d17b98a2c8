//! Retry budgets for connect and disconnect
//!
//! A budget is a count of *additional* attempts an operation may make after
//! its first one fails. Budgets only ever go down: each failed attempt
//! consumes one unit and nothing replenishes them for the lifetime of the
//! owning manager. Retries are immediate, there is no backoff or jitter.

use thiserror::Error;

/// Environment variable holding the default connect retry budget
pub const CONNECT_RETRY_ENV: &str = "MONGO_CONNECT_RETRY";

/// Environment variable holding the default disconnect retry budget
pub const DISCONNECT_RETRY_ENV: &str = "MONGO_DISCONNECT_RETRY";

/// Returns true when another attempt is permitted
pub fn should_retry(remaining: u32) -> bool {
    remaining > 0
}

/// A single decrement-only retry counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
}

impl RetryBudget {
    pub fn new(retries: u32) -> Self {
        Self { remaining: retries }
    }

    /// Retries still available
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Record a failed attempt.
    ///
    /// Returns `true` and consumes one unit if a retry is permitted, `false`
    /// once the budget is exhausted.
    pub fn consume(&mut self) -> bool {
        if should_retry(self.remaining) {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }
}

/// Failure to resolve process-wide retry defaults
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefaultsError {
    #[error("{var} must be a base-10 non-negative integer, got {value:?}")]
    InvalidInteger { var: &'static str, value: String },
}

/// Process-wide default retry budgets, captured once
///
/// Managers copy these values at construction; changing the environment
/// afterwards has no effect on an existing manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryDefaults {
    pub connect_retry: u32,
    pub disconnect_retry: u32,
}

impl RetryDefaults {
    pub fn new(connect_retry: u32, disconnect_retry: u32) -> Self {
        Self {
            connect_retry,
            disconnect_retry,
        }
    }

    /// Snapshot defaults from the process environment
    ///
    /// Unset variables resolve to zero retries.
    pub fn from_env() -> Result<Self, DefaultsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Snapshot defaults through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DefaultsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            connect_retry: parse_budget(CONNECT_RETRY_ENV, lookup(CONNECT_RETRY_ENV))?,
            disconnect_retry: parse_budget(DISCONNECT_RETRY_ENV, lookup(DISCONNECT_RETRY_ENV))?,
        })
    }
}

fn parse_budget(var: &'static str, value: Option<String>) -> Result<u32, DefaultsError> {
    match value {
        None => Ok(0),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(0);
            }
            trimmed
                .parse::<u32>()
                .map_err(|_| DefaultsError::InvalidInteger { var, value: raw })
        }
    }
}

/// Per-manager retry overrides
///
/// Only a `None` field falls back to [`RetryDefaults`]. An explicit
/// `Some(0)` is kept as a zero budget: the operation gets exactly one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryOverrides {
    pub connect_retry: Option<u32>,
    pub disconnect_retry: Option<u32>,
}

impl RetryOverrides {
    pub fn new(connect_retry: u32, disconnect_retry: u32) -> Self {
        Self {
            connect_retry: Some(connect_retry),
            disconnect_retry: Some(disconnect_retry),
        }
    }

    /// Resolve into concrete `(connect, disconnect)` budgets
    pub fn resolve(&self, defaults: &RetryDefaults) -> (RetryBudget, RetryBudget) {
        (
            RetryBudget::new(self.connect_retry.unwrap_or(defaults.connect_retry)),
            RetryBudget::new(self.disconnect_retry.unwrap_or(defaults.disconnect_retry)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_should_retry() {
        assert!(!should_retry(0));
        assert!(should_retry(1));
        assert!(should_retry(u32::MAX));
    }

    #[test]
    fn test_budget_consumes_until_exhausted() {
        let mut budget = RetryBudget::new(2);
        assert!(budget.consume());
        assert_eq!(budget.remaining(), 1);
        assert!(budget.consume());
        assert_eq!(budget.remaining(), 0);
        assert!(!budget.consume());
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_zero_budget_never_retries() {
        let mut budget = RetryBudget::new(0);
        assert!(!budget.consume());
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_defaults_parse_base10() {
        let defaults = RetryDefaults::from_lookup(lookup_from(&[
            (CONNECT_RETRY_ENV, "2"),
            (DISCONNECT_RETRY_ENV, " 010 "),
        ]))
        .unwrap();
        assert_eq!(defaults, RetryDefaults::new(2, 10));
    }

    #[test]
    fn test_defaults_unset_resolve_to_zero() {
        let defaults = RetryDefaults::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(defaults, RetryDefaults::default());
    }

    #[test]
    fn test_defaults_reject_garbage() {
        let err = RetryDefaults::from_lookup(lookup_from(&[(CONNECT_RETRY_ENV, "two")]))
            .unwrap_err();
        assert_eq!(
            err,
            DefaultsError::InvalidInteger {
                var: CONNECT_RETRY_ENV,
                value: "two".to_string()
            }
        );

        let err = RetryDefaults::from_lookup(lookup_from(&[(DISCONNECT_RETRY_ENV, "-1")]))
            .unwrap_err();
        assert!(err.to_string().contains(DISCONNECT_RETRY_ENV));
    }

    #[test]
    fn test_overrides_fall_back_per_field() {
        let defaults = RetryDefaults::new(4, 5);

        let (connect, disconnect) = RetryOverrides::default().resolve(&defaults);
        assert_eq!((connect.remaining(), disconnect.remaining()), (4, 5));

        let partial = RetryOverrides {
            connect_retry: Some(1),
            disconnect_retry: None,
        };
        let (connect, disconnect) = partial.resolve(&defaults);
        assert_eq!((connect.remaining(), disconnect.remaining()), (1, 5));

        // An explicit zero is honoured rather than treated as absent
        let (connect, disconnect) = RetryOverrides::new(0, 0).resolve(&defaults);
        assert_eq!((connect.remaining(), disconnect.remaining()), (0, 0));
    }
}
