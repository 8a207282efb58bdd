use log::info;
use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::logging::RequestId;
use crate::model::{
    api::{
        auth::{AuthToken, Voter},
        ballot::{BallotReceipt, VoteRequest},
    },
    errors::VoteError,
    identity::IdentityError,
    registry::RoundRegistry,
};

use super::common::current_round;

pub fn routes() -> Vec<Route> {
    routes![add_vote, has_voted]
}

/// The session's wallet, or an identity error if there is no voter session.
fn credential(token: &Option<AuthToken<Voter>>) -> Result<&str> {
    match token {
        Some(token) => Ok(&token.subject),
        None => Err(VoteError::Identity(IdentityError::Missing).into()),
    }
}

#[post("/voting/votes", data = "<vote>", format = "json")]
fn add_vote(
    token: Option<AuthToken<Voter>>,
    vote: Json<VoteRequest>,
    registry: &State<RoundRegistry>,
    request_id: &RequestId,
) -> Result<Json<BallotReceipt>> {
    let credential = credential(&token)?;
    let round = current_round(registry)?;
    let ballot = round.cast_vote(credential, vote.choice)?;
    info!("req{request_id}: vote recorded in round {}", round.id());
    Ok(Json(BallotReceipt::new(&round, &ballot)))
}

#[get("/voting/voted")]
fn has_voted(token: Option<AuthToken<Voter>>, registry: &State<RoundRegistry>) -> Result<Json<bool>> {
    let credential = credential(&token)?;
    let round = current_round(registry)?;
    let voted = round.has_voted(credential).map_err(VoteError::from)?;
    Ok(Json(voted))
}
