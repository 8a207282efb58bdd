use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::{errors::VoteError, identity::Identity};

/// One of the two options in a round.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Choice {
    Option1 = 1,
    Option2 = 2,
}

impl TryFrom<i64> for Choice {
    type Error = VoteError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Option1),
            2 => Ok(Self::Option2),
            other => Err(VoteError::InvalidChoice(other)),
        }
    }
}

impl Display for Choice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "option {}", *self as u8)
    }
}

/// An accepted vote. Ballots are never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    identity: Identity,
    choice: Choice,
    cast_at: DateTime<Utc>,
}

impl Ballot {
    pub(super) fn new(identity: Identity, choice: Choice, cast_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            choice,
            cast_at,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn choice(&self) -> Choice {
        self.choice
    }

    pub fn cast_at(&self) -> DateTime<Utc> {
        self.cast_at
    }
}
