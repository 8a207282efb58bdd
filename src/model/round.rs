use std::fmt::{Display, Formatter};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{serde::ts_seconds, DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{
    ballot::{Ballot, Choice},
    clock::Clock,
    errors::{RoundSpecError, VoteError},
    identity::{IdentityError, IdentityGate},
    tally::{TallySnapshot, TallyStore},
};

/// Rounds are numbered from 1.
pub type RoundId = u32;

/// Parameters of a new round, as supplied by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSpec {
    pub option1_name: String,
    pub option2_name: String,
    /// After this instant no votes are accepted.
    #[serde(with = "ts_seconds")]
    pub deadline: DateTime<Utc>,
}

impl RoundSpec {
    /// Check the option names are usable. Surrounding whitespace is ignored.
    fn validate(self) -> Result<Self, RoundSpecError> {
        let option1_name = self.option1_name.trim().to_string();
        let option2_name = self.option2_name.trim().to_string();
        if option1_name.is_empty() || option2_name.is_empty() {
            return Err(RoundSpecError::EmptyOption);
        }
        if option1_name == option2_name {
            return Err(RoundSpecError::IdenticalOptions(option1_name));
        }
        Ok(Self {
            option1_name,
            option2_name,
            deadline: self.deadline,
        })
    }
}

/// States in the round lifecycle. `Closed` is terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    Open,
    Closed,
}

/// What caused a round to close.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClosedBy {
    /// The deadline passed.
    Deadline,
    /// An administrator closed it early.
    Admin,
}

impl Display for ClosedBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deadline => write!(f, "deadline reached"),
            Self::Admin => write!(f, "closed by admin"),
        }
    }
}

/// A consistent view of a round at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    pub round_id: RoundId,
    pub option1_name: String,
    pub option2_name: String,
    pub deadline: DateTime<Utc>,
    pub status: RoundStatus,
    pub closed_by: Option<ClosedBy>,
    pub tally: TallySnapshot,
}

struct Lifecycle {
    status: RoundStatus,
    closed_by: Option<ClosedBy>,
}

/// One two-option, deadline-bounded vote.
///
/// This is the only thing callers talk to: reads go through
/// [`VotingRound::current_state`] and votes through [`VotingRound::cast_vote`].
/// The Open -> Closed transition is evaluated lazily on every access, so no
/// timer is needed for the deadline to take effect.
pub struct VotingRound {
    id: RoundId,
    option1_name: String,
    option2_name: String,
    deadline: DateTime<Utc>,
    lifecycle: RwLock<Lifecycle>,
    tally: TallyStore,
    clock: Arc<dyn Clock>,
    gate: Arc<dyn IdentityGate>,
}

impl VotingRound {
    /// Open a new round. A round whose deadline is not in the future starts
    /// out closed and will never accept a vote.
    pub fn new(
        id: RoundId,
        spec: RoundSpec,
        clock: Arc<dyn Clock>,
        gate: Arc<dyn IdentityGate>,
    ) -> Result<Self, RoundSpecError> {
        let spec = spec.validate()?;
        let created_at = clock.now();
        let round = Self {
            id,
            option1_name: spec.option1_name,
            option2_name: spec.option2_name,
            deadline: spec.deadline,
            lifecycle: RwLock::new(Lifecycle {
                status: RoundStatus::Open,
                closed_by: None,
            }),
            tally: TallyStore::new(id),
            clock,
            gate,
        };
        info!(
            "Created round {id}: '{}' vs '{}', deadline {}",
            round.option1_name, round.option2_name, round.deadline
        );
        round.refresh(created_at);
        Ok(round)
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Name of the given option.
    pub fn option_name(&self, choice: Choice) -> &str {
        match choice {
            Choice::Option1 => &self.option1_name,
            Choice::Option2 => &self.option2_name,
        }
    }

    /// Read the round. The only side effect is the lazy deadline closure.
    pub fn current_state(&self) -> RoundState {
        self.refresh(self.clock.now());
        let lifecycle = self.read_lifecycle();
        RoundState {
            round_id: self.id,
            option1_name: self.option1_name.clone(),
            option2_name: self.option2_name.clone(),
            deadline: self.deadline,
            status: lifecycle.status,
            closed_by: lifecycle.closed_by,
            tally: self.tally.snapshot(),
        }
    }

    /// Cast a vote on behalf of whoever `credential` resolves to.
    ///
    /// Checks happen in order: identity, round still open, valid choice,
    /// not already voted. Either the ballot is fully recorded or nothing is.
    pub fn cast_vote(&self, credential: &str, choice: i64) -> Result<Ballot, VoteError> {
        let result = self.try_cast_vote(credential, choice);
        match &result {
            Ok(ballot) => debug!("Round {}: accepted vote for {}", self.id, ballot.choice()),
            Err(e) => debug!("Round {}: refused vote: {e}", self.id),
        }
        result
    }

    fn try_cast_vote(&self, credential: &str, choice: i64) -> Result<Ballot, VoteError> {
        let identity = self.gate.resolve(credential)?;

        let now = self.clock.now();
        self.refresh(now);
        // Holding the read lock until the ballot is recorded keeps an explicit
        // close from slipping in between the status check and the record.
        let lifecycle = self.read_lifecycle();
        if lifecycle.status == RoundStatus::Closed {
            return Err(VoteError::RoundClosed(self.id));
        }

        let choice = Choice::try_from(choice)?;
        self.tally.record_if_absent(identity, choice, now)
    }

    /// Whether whoever `credential` resolves to already has a ballot here.
    pub fn has_voted(&self, credential: &str) -> Result<bool, IdentityError> {
        let identity = self.gate.resolve(credential)?;
        Ok(self.tally.has_voted(&identity))
    }

    /// Close the round ahead of its deadline. Returns whether this call did
    /// the closing; closing an already-closed round is a no-op.
    pub fn close(&self) -> bool {
        if self.refresh(self.clock.now()) == RoundStatus::Closed {
            return false;
        }
        self.close_with(ClosedBy::Admin)
    }

    /// Every ballot recorded so far, in acceptance order, and the tally they
    /// add up to.
    pub fn audit(&self) -> (Vec<Ballot>, TallySnapshot) {
        self.tally.audit()
    }

    /// Apply the lazy deadline transition and report the resulting status.
    fn refresh(&self, now: DateTime<Utc>) -> RoundStatus {
        if self.read_lifecycle().status == RoundStatus::Closed {
            return RoundStatus::Closed;
        }
        if now >= self.deadline {
            self.close_with(ClosedBy::Deadline);
            return RoundStatus::Closed;
        }
        RoundStatus::Open
    }

    fn close_with(&self, by: ClosedBy) -> bool {
        let mut lifecycle = self.write_lifecycle();
        if lifecycle.status == RoundStatus::Closed {
            return false;
        }
        lifecycle.status = RoundStatus::Closed;
        lifecycle.closed_by = Some(by);
        let tally = self.tally.snapshot();
        info!(
            "Round {} closed ({by}). Final tally: '{}' {}, '{}' {}",
            self.id, self.option1_name, tally.count1, self.option2_name, tally.count2
        );
        true
    }

    // Lifecycle updates are single assignments, so a poisoned lock still
    // holds a valid state.
    fn read_lifecycle(&self) -> RwLockReadGuard<'_, Lifecycle> {
        self.lifecycle.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lifecycle(&self) -> RwLockWriteGuard<'_, Lifecycle> {
        self.lifecycle.write().unwrap_or_else(PoisonError::into_inner)
    }
}
