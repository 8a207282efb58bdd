use chrono::{serde::ts_seconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    ballot::{Ballot, Choice},
    round::{RoundId, VotingRound},
};

/// A vote as submitted by the page. Any integer is accepted here and the
/// choice is validated by the round, so out-of-range values such as `300` or
/// `-1` get the same error as `3`, and only after the caller's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub choice: i64,
}

/// Confirmation of an accepted vote. Deliberately omits the voter's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotReceipt {
    pub round_id: RoundId,
    pub choice: Choice,
    pub option_name: String,
    #[serde(with = "ts_seconds")]
    pub cast_at: DateTime<Utc>,
}

impl BallotReceipt {
    pub fn new(round: &VotingRound, ballot: &Ballot) -> Self {
        Self {
            round_id: round.id(),
            choice: ballot.choice(),
            option_name: round.option_name(ballot.choice()).to_string(),
            cast_at: ballot.cast_at(),
        }
    }
}

/// One accepted ballot as shown to an administrator, without the voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotRecord {
    pub choice: Choice,
    #[serde(with = "ts_seconds")]
    pub cast_at: DateTime<Utc>,
}

/// Every ballot in a round together with the counts, read at the same
/// instant so the two always agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundAudit {
    pub round_id: RoundId,
    pub votes1: u64,
    pub votes2: u64,
    pub ballots: Vec<BallotRecord>,
}

impl RoundAudit {
    pub fn new(round: &VotingRound) -> Self {
        let (ballots, tally) = round.audit();
        Self {
            round_id: round.id(),
            votes1: tally.count1,
            votes2: tally.count2,
            ballots: ballots
                .iter()
                .map(|ballot| BallotRecord {
                    choice: ballot.choice(),
                    cast_at: ballot.cast_at(),
                })
                .collect(),
        }
    }
}
