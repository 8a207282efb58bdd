use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{error, info, warn};
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{Method, StatusClass},
    request::{FromRequest, Outcome},
    Data, Orbit, Request, Response, Rocket,
};

use crate::model::{
    registry::RoundRegistry,
    round::{RoundState, RoundStatus},
};

/// A unique identifier for a particular request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID. Wraps back to zero on overflow.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handlers can tag their own log lines with the request's ID.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r RequestId {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(req.local_cache(RequestId::next))
    }
}

/// One line describing a round and its tally.
pub fn round_summary(state: &RoundState) -> String {
    let status = match (state.status, state.closed_by) {
        (RoundStatus::Open, _) => format!("open until {}", state.deadline),
        (RoundStatus::Closed, Some(by)) => format!("closed, {by}"),
        (RoundStatus::Closed, None) => "closed".to_string(),
    };
    format!(
        "round {} ({status}): '{}' {}, '{}' {}",
        state.round_id,
        state.option1_name,
        state.tally.count1,
        state.option2_name,
        state.tally.count2
    )
}

/// Whether the request was an attempt to cast a vote.
fn is_vote(req: &Request<'_>) -> bool {
    req.method() == Method::Post && req.uri().path().as_str() == "/voting/votes"
}

/// Logs every request and response, and what the rounds look like when the
/// server comes up and goes down.
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let protocol = if rocket.config().tls_enabled() {
            "https"
        } else {
            "http"
        };
        let ip = &rocket.config().address;
        let port = &rocket.config().port;
        info!("Voting server launched on {protocol}://{ip}:{port}");

        match rocket.state::<RoundRegistry>().and_then(|r| r.current()) {
            Some(round) => info!("Current {}", round_summary(&round.current_state())),
            None => info!("No round yet, waiting for an admin to create one"),
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let id = req.local_cache(RequestId::next);
        info!("->req{id} {} {}", req.method(), req.uri());
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let id = req.local_cache(RequestId::next);
        let code = res.status();
        let route = req
            .route()
            .and_then(|r| r.name.as_deref())
            .unwrap_or("unmatched");

        if is_vote(req) {
            match code.class() {
                StatusClass::Success => info!("<-rsp{id} {code} vote accepted"),
                StatusClass::ServerError => error!("<-rsp{id} {code} vote failed"),
                _ => info!("<-rsp{id} {code} vote refused"),
            }
            return;
        }
        match code.class() {
            StatusClass::ServerError => error!("<-rsp{id} {code} {route}"),
            StatusClass::ClientError => warn!("<-rsp{id} {code} {route}"),
            _ => info!("<-rsp{id} {code} {route}"),
        }
    }

    async fn on_shutdown(&self, rocket: &Rocket<Orbit>) {
        let rounds = rocket
            .state::<RoundRegistry>()
            .map(|r| r.all())
            .unwrap_or_default();
        warn!("Shutting down, {} round(s) held in memory are lost", rounds.len());
        for round in rounds {
            warn!("Final {}", round_summary(&round.current_state()));
        }
    }
}
