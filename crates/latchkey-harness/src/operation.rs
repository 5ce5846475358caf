//! Operation vocabulary for model-based and fuzz testing.
//!
//! Durations are in loop ticks so the real controller and [`crate::ModelLock`]
//! agree on exactly which poll observes what.

use arbitrary::Arbitrary;
use latchkey_core::Credential;

/// Credentials accepted by simulated controllers.
pub const ACCEPTED_PASSWORDS: [&str; 3] = ["password1", "password2", "password3"];

/// Which credential a simulated request presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Password {
    /// An accepted credential.
    Valid,
    /// A credential outside the accepted set.
    Wrong,
    /// No `pass` header at all.
    Missing,
}

impl Password {
    /// Credential presented on the wire.
    pub fn credential(self) -> Option<Credential> {
        match self {
            Self::Valid => Some(Credential::from(ACCEPTED_PASSWORDS[1])),
            Self::Wrong => Some(Credential::from("wrongpass")),
            Self::Missing => None,
        }
    }

    /// Whether the controller should accept it.
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

/// One step of a simulated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Hold the button for `hold_ticks` polls, then release it and let the
    /// release settle.
    Press {
        /// Polls observed while pressed
        hold_ticks: u8,
    },
    /// Remote lock request.
    RemoteLock {
        /// Presented credential
        password: Password,
    },
    /// Remote unlock request.
    RemoteUnlock {
        /// Presented credential
        password: Password,
        /// `autolock: true` header present
        auto_lock: bool,
    },
    /// Remote state query.
    QueryState,
    /// Run the loop for `ticks` polls with the button released.
    Advance {
        /// Number of polls
        ticks: u8,
    },
}
