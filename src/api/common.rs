use std::sync::Arc;

use rocket::http::Status;

use crate::error::{Error, Result};
use crate::model::{
    registry::RoundRegistry,
    round::{RoundId, VotingRound},
};

/// The round votes currently go to.
pub fn current_round(registry: &RoundRegistry) -> Result<Arc<VotingRound>> {
    registry.current().ok_or_else(|| {
        Error::Status(
            Status::NotFound,
            "No voting round has been created".to_string(),
        )
    })
}

/// A specific round.
pub fn round_by_id(registry: &RoundRegistry, round_id: RoundId) -> Result<Arc<VotingRound>> {
    registry.get(round_id).ok_or_else(|| {
        Error::Status(
            Status::NotFound,
            format!("No round found with ID {round_id}"),
        )
    })
}
