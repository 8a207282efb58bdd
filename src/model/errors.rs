use thiserror::Error;

use super::{identity::IdentityError, round::RoundId};

/// Every way a vote can be refused. A refused vote never changes the tally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    /// The caller must re-authenticate.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// Terminal for the round.
    #[error("Round {0} is closed")]
    RoundClosed(RoundId),
    #[error("Invalid choice {0}, expected 1 or 2")]
    InvalidChoice(i64),
    /// Terminal for this identity in this round.
    #[error("Already voted in round {0}")]
    DuplicateVote(RoundId),
}

/// Problems with the parameters of a new round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundSpecError {
    #[error("Option names must not be empty")]
    EmptyOption,
    #[error("Both options are named '{0}'")]
    IdenticalOptions(String),
}
