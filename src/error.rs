use argon2::Error as Argon2Error;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use log::{debug, error};
use rocket::{
    http::{Status, StatusClass},
    response::Responder,
    Request,
};
use thiserror::Error;

use crate::model::errors::{RoundSpecError, VoteError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error(transparent)]
    Vote(#[from] VoteError),
    #[error(transparent)]
    RoundSpec(#[from] RoundSpecError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Argon2(_) => Status::InternalServerError,
            Self::Vote(err) => match err {
                VoteError::Identity(_) => Status::Unauthorized,
                VoteError::RoundClosed(_) | VoteError::DuplicateVote(_) => Status::Conflict,
                VoteError::InvalidChoice(_) => Status::BadRequest,
            },
            Self::RoundSpec(_) => Status::BadRequest,
            Self::Status(status, _) => *status,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.class() == StatusClass::ServerError {
            error!("{} {}: {self}", req.method(), req.uri());
        } else {
            debug!("{} {}: {self}", req.method(), req.uri());
        }
        (status, self.to_string()).respond_to(req)
    }
}
