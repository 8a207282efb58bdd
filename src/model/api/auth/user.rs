use std::fmt::Display;

use serde_repr::{Deserialize_repr, Serialize_repr};

/// A user of our application, having defined rights.
pub trait User {
    /// The rights of this user type.
    const RIGHTS: Rights;
    /// The value stored in the token's subject claim.
    fn subject(&self) -> &str;
}

/// Different privilege levels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Rights {
    Voter = 0,
    Admin = 1,
}

impl Display for Rights {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Voter => "voter",
                Self::Admin => "admin",
            }
        )
    }
}

/// A voter, known by the wallet their session was opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voter {
    pub wallet: String,
}

/// A round administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub username: String,
}

impl User for Voter {
    const RIGHTS: Rights = Rights::Voter;

    fn subject(&self) -> &str {
        &self.wallet
    }
}

impl User for Admin {
    const RIGHTS: Rights = Rights::Admin;

    fn subject(&self) -> &str {
        &self.username
    }
}
