//! Invocation semantics: what the client promises about delivery.
//!
//! # Which one should I pick? (for beginners)
//!
//! UDP may drop a request or its reply without telling anyone.  The client
//! can react in three ways:
//!
//! ```text
//! ┌───────────────┬────────────┬───────────────────┬──────────────────────────┐
//! │ Semantic      │ Retransmit │ Filter duplicates │ On a duplicate request   │
//! ├───────────────┼────────────┼───────────────────┼──────────────────────────┤
//! │ maybe         │ no         │ n/a               │ n/a                      │
//! │ at-least-once │ yes        │ no                │ server re-executes       │
//! │ at-most-once  │ yes        │ yes               │ server replays its reply │
//! └───────────────┴────────────┴───────────────────┴──────────────────────────┘
//! ```
//!
//! On the client side at-least-once and at-most-once behave identically: both
//! re-send the same bytes (same sequence number) after a timeout.  The
//! difference lives in the server, which filters duplicates by sequence number
//! for at-most-once.  Use at-most-once for operations that must not run twice,
//! such as a withdrawal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The delivery guarantee a [`Transport`](super::Transport) provides.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum InvocationSemantic {
    /// One attempt, no retry.
    Maybe,
    /// Retry until a reply arrives; the server may execute the request more
    /// than once.
    #[default]
    AtLeastOnce,
    /// Retry until a reply arrives; the server executes the request at most
    /// once and replays its cached reply to duplicates.
    AtMostOnce,
}

impl InvocationSemantic {
    pub fn as_str(self) -> &'static str {
        match self {
            InvocationSemantic::Maybe => "maybe",
            InvocationSemantic::AtLeastOnce => "at-least-once",
            InvocationSemantic::AtMostOnce => "at-most-once",
        }
    }

    /// Returns `true` when a lost reply triggers a retransmission.
    pub fn retransmits(self) -> bool {
        !matches!(self, InvocationSemantic::Maybe)
    }
}

impl fmt::Display for InvocationSemantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no invocation semantic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid invocation semantic: {0:?}")]
pub struct InvalidSemantic(pub String);

impl FromStr for InvocationSemantic {
    type Err = InvalidSemantic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maybe" => Ok(InvocationSemantic::Maybe),
            "at-least-once" => Ok(InvocationSemantic::AtLeastOnce),
            "at-most-once" => Ok(InvocationSemantic::AtMostOnce),
            other => Err(InvalidSemantic(other.to_owned())),
        }
    }
}
