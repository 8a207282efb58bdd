use chrono::{serde::ts_seconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::round::{ClosedBy, RoundId, RoundState, RoundStatus};

/// API-friendly view of a round: what the voting page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingDescription {
    pub round_id: RoundId,
    pub option1_name: String,
    pub option2_name: String,
    /// Seconds since the epoch.
    #[serde(with = "ts_seconds")]
    pub deadline: DateTime<Utc>,
    pub votes1: u64,
    pub votes2: u64,
    pub status: RoundStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<ClosedBy>,
}

impl From<RoundState> for VotingDescription {
    fn from(state: RoundState) -> Self {
        Self {
            round_id: state.round_id,
            option1_name: state.option1_name,
            option2_name: state.option2_name,
            deadline: state.deadline,
            votes1: state.tally.count1,
            votes2: state.tally.count2,
            status: state.status,
            closed_by: state.closed_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rocket::serde::json::{serde_json, serde_json::json};

    use super::*;
    use crate::model::tally::TallySnapshot;

    #[test]
    fn serializes_in_page_format() {
        let state = RoundState {
            round_id: 3,
            option1_name: "Luiz".to_string(),
            option2_name: "Monica".to_string(),
            deadline: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            status: RoundStatus::Open,
            closed_by: None,
            tally: TallySnapshot {
                count1: 4,
                count2: 9,
            },
        };
        let value = serde_json::to_value(VotingDescription::from(state)).unwrap();
        assert_eq!(
            value,
            json!({
                "roundId": 3,
                "option1Name": "Luiz",
                "option2Name": "Monica",
                "deadline": 1_700_000_000,
                "votes1": 4,
                "votes2": 9,
                "status": "Open",
            })
        );
    }
}
