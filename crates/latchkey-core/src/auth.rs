//! Credential checking for remote intents.
//!
//! The accepted set is fixed at startup and never mutated. Checks are plain
//! equality against the set. Comparison is not constant-time; timing side
//! channels are out of scope for this controller.

use std::{collections::HashSet, fmt};

use crate::error::ConfigError;

/// A presented or accepted secret.
///
/// `Debug` is redacted so credentials never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<&str> for Credential {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

/// Immutable set of accepted credentials.
#[derive(Debug, Clone)]
pub struct CredentialSet {
    accepted: HashSet<Credential>,
}

impl CredentialSet {
    /// Build the set. It must be non-empty and contain no empty secret.
    pub fn new<I, C>(credentials: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Credential>,
    {
        let accepted: HashSet<Credential> = credentials.into_iter().map(Into::into).collect();
        if accepted.is_empty() {
            return Err(ConfigError::NoCredentials);
        }
        if accepted.iter().any(|c| c.0.is_empty()) {
            return Err(ConfigError::EmptyCredential);
        }
        Ok(Self { accepted })
    }

    /// True iff `presented` is exactly one of the accepted credentials.
    ///
    /// A missing credential is never authorized.
    pub fn authorize(&self, presented: Option<&Credential>) -> bool {
        presented.is_some_and(|c| self.accepted.contains(c))
    }

    /// Number of accepted credentials.
    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

impl From<String> for Credential {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}

/// Whether an unlock asks for the deferred re-lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoLock {
    /// Re-lock after the configured delay.
    Requested,
    /// Stay unlocked until told otherwise.
    #[default]
    Declined,
}

impl AutoLock {
    /// Interpret the `autolock` request header. Only the exact value `true`
    /// requests auto-lock; anything else, including absence, declines.
    pub fn from_header(value: Option<&str>) -> Self {
        if value == Some("true") { Self::Requested } else { Self::Declined }
    }

    /// True for [`AutoLock::Requested`].
    pub fn is_requested(self) -> bool {
        self == Self::Requested
    }
}

impl From<bool> for AutoLock {
    fn from(requested: bool) -> Self {
        if requested { Self::Requested } else { Self::Declined }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn accepted() -> CredentialSet {
        CredentialSet::new(["password1", "password2", "password3"]).unwrap()
    }

    #[test]
    fn accepts_members() {
        let set = accepted();
        assert!(set.authorize(Some(&Credential::from("password2"))));
    }

    #[test]
    fn rejects_missing_and_wrong() {
        let set = accepted();
        assert!(!set.authorize(None));
        assert!(!set.authorize(Some(&Credential::from("wrongpass"))));
        assert!(!set.authorize(Some(&Credential::from(""))));
        assert!(!set.authorize(Some(&Credential::from("password2 "))));
        assert!(!set.authorize(Some(&Credential::from("PASSWORD2"))));
    }

    #[test]
    fn empty_set_is_a_config_error() {
        let empty: [&str; 0] = [];
        assert!(matches!(CredentialSet::new(empty), Err(ConfigError::NoCredentials)));
        assert!(matches!(CredentialSet::new(["ok", ""]), Err(ConfigError::EmptyCredential)));
    }

    #[test]
    fn debug_is_redacted() {
        let rendered = format!("{:?}", Credential::from("password1"));
        assert!(!rendered.contains("password1"));
    }

    #[test]
    fn autolock_header_must_be_exactly_true() {
        assert_eq!(AutoLock::from_header(Some("true")), AutoLock::Requested);
        assert_eq!(AutoLock::from_header(Some("TRUE")), AutoLock::Declined);
        assert_eq!(AutoLock::from_header(Some("1")), AutoLock::Declined);
        assert_eq!(AutoLock::from_header(None), AutoLock::Declined);
    }

    proptest! {
        #[test]
        fn authorize_iff_member(
            members in proptest::collection::hash_set("[a-z0-9]{1,12}", 1..6),
            probe in "[a-z0-9]{0,12}",
        ) {
            let set = CredentialSet::new(members.iter().cloned()).unwrap();
            let expected = members.contains(&probe);
            prop_assert_eq!(set.authorize(Some(&Credential::new(probe))), expected);
            prop_assert!(!set.authorize(None));
        }
    }
}
