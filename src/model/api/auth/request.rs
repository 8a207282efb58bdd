use serde::{Deserialize, Serialize};

/// A request to open a voter session for a connected wallet.
///
/// The wallet connector in front of this service is trusted to have proven
/// ownership of the address. Here it is only checked for shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletLogin {
    pub wallet: String,
}

/// Raw admin credentials, received from a user. The password is checked
/// against the configured hash and never stored.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}
