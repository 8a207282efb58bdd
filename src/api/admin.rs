use log::info;
use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{
        auth::{Admin, AuthToken},
        ballot::RoundAudit,
        voting::VotingDescription,
    },
    registry::RoundRegistry,
    round::{RoundId, RoundSpec},
};

use super::common::round_by_id;

pub fn routes() -> Vec<Route> {
    routes![create_round, close_round, audit_round]
}

#[post("/admin/rounds", data = "<spec>", format = "json")]
fn create_round(
    token: AuthToken<Admin>,
    spec: Json<RoundSpec>,
    registry: &State<RoundRegistry>,
) -> Result<Json<VotingDescription>> {
    let round = registry.create_round(spec.into_inner())?;
    info!("Admin {} created round {}", token.subject, round.id());
    Ok(Json(round.current_state().into()))
}

#[post("/admin/rounds/<round_id>/close")]
fn close_round(
    token: AuthToken<Admin>,
    round_id: RoundId,
    registry: &State<RoundRegistry>,
) -> Result<Json<VotingDescription>> {
    let round = round_by_id(registry, round_id)?;
    if round.close() {
        info!("Admin {} closed round {round_id} early", token.subject);
    }
    Ok(Json(round.current_state().into()))
}

#[get("/admin/rounds/<round_id>/ballots")]
fn audit_round(
    _token: AuthToken<Admin>,
    round_id: RoundId,
    registry: &State<RoundRegistry>,
) -> Result<Json<RoundAudit>> {
    let round = round_by_id(registry, round_id)?;
    Ok(Json(RoundAudit::new(&round)))
}
