use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        api::auth::{Admin, AdminCredentials, AuthToken, Voter, WalletLogin, AUTH_TOKEN_COOKIE},
        errors::VoteError,
        identity::WalletGate,
    },
};

pub fn routes() -> Vec<Route> {
    routes![authenticate, login_voter, logout]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub fn authenticate(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    config: &State<Config>,
) -> Result<()> {
    // The hash is checked even when the username is wrong.
    let password_ok = argon2::verify_encoded(
        config.admin_password_hash(),
        credentials.password.as_bytes(),
    )?;
    let username_ok = credentials.username == config.admin_username();
    if !(username_ok && password_ok) {
        return Err(Error::Status(
            Status::Unauthorized,
            "No admin found with the provided username and password combination.".to_string(),
        ));
    }

    let admin = Admin {
        username: credentials.into_inner().username,
    };
    cookies.add(AuthToken::new(&admin).into_cookie(config));

    Ok(())
}

/// Open a voter session for a wallet the connector has already verified.
/// The address is normalised here so that the session carries its canonical
/// form.
#[post("/auth/voter", data = "<login>", format = "json")]
pub fn login_voter(
    login: Json<WalletLogin>,
    cookies: &CookieJar<'_>,
    config: &State<Config>,
) -> Result<()> {
    let wallet = WalletGate::normalise(&login.wallet).map_err(VoteError::from)?;
    let voter = Voter { wallet };
    cookies.add(AuthToken::new(&voter).into_cookie(config));
    Ok(())
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}
