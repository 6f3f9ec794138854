//! Contract for DNS-01 challenge publishers.
//!
//! Nothing in this crate drives a provider. An ACME order workflow calls [`present`] before
//! answering a challenge, polls DNS within [`timeout`], and calls [`clean_up`] afterwards.
//!
//! Providers that remember remote record ids between `present` and `clean_up` must update
//! their id map inside the same lock that covers the remote call's bookkeeping, so that an
//! id is neither leaked nor removed twice.
//!
//! [`present`]: ChallengeProvider::present
//! [`timeout`]: ChallengeProvider::timeout
//! [`clean_up`]: ChallengeProvider::clean_up

use std::time::Duration;

/// How long to wait for a published record to propagate, and how often to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderTimeout {
    pub propagation: Duration,
    pub polling_interval: Duration,
}

impl Default for ProviderTimeout {
    fn default() -> Self {
        Self {
            propagation: Duration::from_secs(60),
            polling_interval: Duration::from_secs(2),
        }
    }
}

/// Publishes and removes the record that proves control over `domain`.
///
/// `key_authorization` is the precomputed key authorization string of the challenge.
pub trait ChallengeProvider {
    type Error: std::error::Error;

    fn present(&self, domain: &str, token: &str, key_authorization: &str)
    -> Result<(), Self::Error>;

    fn clean_up(&self, domain: &str, token: &str, key_authorization: &str)
    -> Result<(), Self::Error>;

    fn timeout(&self) -> ProviderTimeout {
        ProviderTimeout::default()
    }
}
