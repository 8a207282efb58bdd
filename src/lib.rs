#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use std::sync::Arc;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, RoundsFairing};
use crate::logging::LoggerFairing;
use crate::model::clock::{Clock, SystemClock};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

/// Build a server configured from `Rocket.toml` and the environment, running
/// on the wall clock.
pub fn build() -> Rocket<Build> {
    assemble(rocket::build(), Arc::new(SystemClock))
}

fn assemble(rocket: Rocket<Build>, clock: Arc<dyn Clock>) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(RoundsFairing::new(clock))
        .attach(LoggerFairing)
}

/// A server with fixed test configuration and no seeded round, whose rounds
/// read the given clock.
#[cfg(test)]
pub(crate) fn rocket_for_test(clock: Arc<dyn Clock>) -> Rocket<Build> {
    assemble(rocket::custom(test_figment()), clock)
}

/// Test configuration that never reads `Rocket.toml`.
#[cfg(test)]
pub(crate) fn test_figment() -> rocket::figment::Figment {
    use crate::config::examples::{admin_password_hash, ADMIN_USERNAME};

    rocket::figment::Figment::from(rocket::Config::debug_default())
        .merge(("log_level", "off"))
        .merge(("auth_ttl", 3600))
        .merge(("admin_username", ADMIN_USERNAME))
        .merge(("admin_password_hash", admin_password_hash()))
        .merge(("jwt_secret", "test-jwt-secret"))
        .merge(("hmac_secret", "test-hmac-secret"))
}
