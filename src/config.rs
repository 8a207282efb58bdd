use std::sync::Arc;

use chrono::Duration;
use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    clock::Clock,
    identity::WalletGate,
    registry::RoundRegistry,
    round::RoundSpec,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    admin_username: String,
    round: Option<RoundSeed>,
    // secrets
    jwt_secret: String,
    hmac_secret: String,
    admin_password_hash: String,
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Secret key used to derive voter identities from wallets.
    pub fn hmac_secret(&self) -> &[u8] {
        self.hmac_secret.as_bytes()
    }

    /// The only admin account.
    pub fn admin_username(&self) -> &str {
        &self.admin_username
    }

    /// Argon2 encoded hash of the admin password.
    pub fn admin_password_hash(&self) -> &str {
        &self.admin_password_hash
    }

    /// Round to open at launch, if any.
    pub fn round(&self) -> Option<&RoundSeed> {
        self.round.as_ref()
    }
}

/// A round opened automatically when the server starts.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundSeed {
    pub option1_name: String,
    pub option2_name: String,
    /// How long the round stays open after launch.
    pub voting_seconds: u32,
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Admin login needs a hash argon2 can decode.
        if let Err(e) = argon2::verify_encoded(config.admin_password_hash(), b"") {
            error!("Configured `admin_password_hash` is not an argon2 encoded hash: {e}");
            return Err(rocket);
        }

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that builds the round registry, opens the configured round if
/// there is one, and places the registry into managed state.
/// This fairing depends on [`Config`] being available in managed state,
/// and so must be attached after [`ConfigFairing`].
pub struct RoundsFairing {
    clock: Arc<dyn Clock>,
}

impl RoundsFairing {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[rocket::async_trait]
impl Fairing for RoundsFairing {
    fn info(&self) -> Info {
        Info {
            name: "Voting Rounds",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.state::<Config>() {
            Some(config) => config,
            None => {
                error!("Config was not available when creating the round registry");
                return Err(rocket);
            }
        };
        let gate = Arc::new(WalletGate::new(config.hmac_secret()));
        let registry = RoundRegistry::new(self.clock.clone(), gate);

        if let Some(seed) = config.round() {
            let spec = RoundSpec {
                option1_name: seed.option1_name.clone(),
                option2_name: seed.option2_name.clone(),
                deadline: self.clock.now() + Duration::seconds(seed.voting_seconds.into()),
            };
            if let Err(e) = registry.create_round(spec) {
                error!("Failed to open the configured round: {e}");
                return Err(rocket);
            }
            info!("Opened configured round, voting for {} seconds", seed.voting_seconds);
        }

        // Manage the state.
        rocket = rocket.manage(registry);
        Ok(rocket)
    }
}


#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rocket::{
        error::ErrorKind,
        figment::{
            providers::{Format, Toml},
            Figment,
        },
    };

    use super::examples::*;
    use super::*;
    use crate::model::{
        clock::MockClock,
        round::{RoundStatus, VotingRound},
    };

    fn rocket_from(figment: Figment, clock: &MockClock) -> Rocket<Build> {
        crate::assemble(rocket::custom(figment), Arc::new(clock.clone()))
    }

    #[rocket::async_test]
    async fn undecodable_password_hash_fails_launch() {
        let figment =
            crate::test_figment().merge(("admin_password_hash", "set ROCKET_ADMIN_PASSWORD_HASH"));
        match rocket_from(figment, &MockClock::default()).ignite().await {
            Ok(_) => panic!("launched with a password hash that cannot be checked"),
            Err(e) => assert!(matches!(e.kind(), ErrorKind::FailedFairings(_))),
        }
    }

    #[rocket::async_test]
    async fn test_config_has_no_round() {
        let rocket = rocket_from(crate::test_figment(), &MockClock::default())
            .ignite()
            .await
            .unwrap();
        let config = rocket.state::<Config>().unwrap();
        assert_eq!(config.admin_username(), ADMIN_USERNAME);
        assert_eq!(config.auth_ttl(), Duration::hours(1));
        assert!(config.round().is_none());
        assert!(rocket.state::<RoundRegistry>().unwrap().current().is_none());
    }

    #[rocket::async_test]
    async fn development_profile_opens_seeded_round() {
        let clock = MockClock::default();
        let figment = Figment::from(rocket::Config::debug_default())
            .merge(Toml::file("Rocket.toml").nested())
            .merge(("log_level", "off"));
        let rocket = rocket_from(figment, &clock).ignite().await.unwrap();

        // The shipped development hash is for the example admin password.
        let config = rocket.state::<Config>().unwrap();
        assert!(
            argon2::verify_encoded(config.admin_password_hash(), ADMIN_PASSWORD.as_bytes())
                .unwrap()
        );

        let round: Arc<VotingRound> = rocket
            .state::<RoundRegistry>()
            .unwrap()
            .current()
            .unwrap();
        let state = round.current_state();
        assert_eq!(state.round_id, 1);
        assert_eq!((state.option1_name.as_str(), state.option2_name.as_str()), ("A", "B"));
        assert_eq!(state.deadline, clock.now() + Duration::hours(1));
        assert_eq!(state.status, RoundStatus::Open);
    }
}
