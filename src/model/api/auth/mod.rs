mod request;
mod token;
mod user;

pub use request::{AdminCredentials, WalletLogin};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
pub use user::{Admin, Rights, User, Voter};
