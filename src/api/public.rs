use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{api::voting::VotingDescription, registry::RoundRegistry, round::RoundId};

use super::common::{current_round, round_by_id};

pub fn routes() -> Vec<Route> {
    routes![current_voting, rounds, round]
}

#[get("/voting")]
fn current_voting(registry: &State<RoundRegistry>) -> Result<Json<VotingDescription>> {
    let round = current_round(registry)?;
    Ok(Json(round.current_state().into()))
}

#[get("/rounds")]
fn rounds(registry: &State<RoundRegistry>) -> Json<Vec<VotingDescription>> {
    let rounds = registry
        .all()
        .iter()
        .map(|round| round.current_state().into())
        .collect();
    Json(rounds)
}

#[get("/rounds/<round_id>")]
fn round(round_id: RoundId, registry: &State<RoundRegistry>) -> Result<Json<VotingDescription>> {
    let round = round_by_id(registry, round_id)?;
    Ok(Json(round.current_state().into()))
}
