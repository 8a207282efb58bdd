use std::fmt::{Display, Formatter};

use data_encoding::HEXLOWER;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

pub type HmacSha256 = Hmac<Sha256>;

/// Number of hex digits in a wallet address, excluding the `0x` prefix.
pub const WALLET_HEX_DIGITS: usize = 40;

/// A stable token uniquely identifying one real-world voter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reasons a credential cannot be turned into an [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("No authenticated session")]
    Missing,
    #[error("Malformed credential: {0}")]
    Malformed(String),
}

/// Maps an opaque caller credential onto a stable [`Identity`].
///
/// Implementations must never alias: two different identities must never
/// come out of credentials belonging to different callers, and the same
/// caller must always get the same identity.
pub trait IdentityGate: Send + Sync {
    fn resolve(&self, credential: &str) -> Result<Identity, IdentityError>;
}

/// Resolves Ethereum-style wallet addresses.
///
/// Normalisation: surrounding whitespace is trimmed, a `0x` or `0X` prefix
/// is required, followed by exactly 40 hex digits which are lower-cased.
/// Mixed-case checksummed addresses therefore resolve to the same identity
/// as their lower-case form.
///
/// The identity is an HMAC of the normalised address, so the raw address is
/// never held by the tally.
pub struct WalletGate {
    key: Vec<u8>,
}

impl WalletGate {
    pub fn new(hmac_secret: &[u8]) -> Self {
        Self {
            key: hmac_secret.to_vec(),
        }
    }

    /// Normalise a wallet address, rejecting anything that isn't one.
    pub fn normalise(credential: &str) -> Result<String, IdentityError> {
        let trimmed = credential.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Missing);
        }
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| IdentityError::Malformed("missing 0x prefix".to_string()))?;
        if digits.len() != WALLET_HEX_DIGITS {
            return Err(IdentityError::Malformed(format!(
                "expected {WALLET_HEX_DIGITS} hex digits, got {}",
                digits.len()
            )));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdentityError::Malformed(
                "address contains non-hex characters".to_string(),
            ));
        }
        Ok(format!("0x{}", digits.to_ascii_lowercase()))
    }
}

impl IdentityGate for WalletGate {
    fn resolve(&self, credential: &str) -> Result<Identity, IdentityError> {
        let address = Self::normalise(credential)?;
        let mut hmac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        hmac.update(address.as_bytes());
        Ok(Identity(HEXLOWER.encode(&hmac.finalize().into_bytes())))
    }
}

/// Example data for tests.
#[cfg(test)]
pub mod examples {
    pub const WALLET_X: &str = "0x52908400098527886E0F7030069857D2E4169EE7";
    pub const WALLET_Y: &str = "0x8617e340b3d01fa5f11f306f4090fd50e238070d";
    pub const WALLET_Z: &str = "0xde709f2102306220921060314715629080e2fb77";

    /// A distinct, well-formed wallet for each `n`.
    pub fn wallet(n: u32) -> String {
        format!("0x{n:040x}")
    }
}

#[cfg(test)]
mod tests {
    use super::examples::*;
    use super::*;

    fn gate() -> WalletGate {
        WalletGate::new(b"test-hmac-secret")
    }

    #[test]
    fn same_wallet_same_identity() {
        let gate = gate();
        let canonical = gate.resolve(WALLET_X).unwrap();
        assert_eq!(canonical, gate.resolve(&WALLET_X.to_lowercase()).unwrap());
        assert_eq!(canonical, gate.resolve(&format!("  {WALLET_X}\n")).unwrap());
        assert_eq!(
            canonical,
            gate.resolve(&WALLET_X.replacen("0x", "0X", 1)).unwrap()
        );
    }

    #[test]
    fn different_wallets_different_identities() {
        let gate = gate();
        assert_ne!(
            gate.resolve(WALLET_X).unwrap(),
            gate.resolve(WALLET_Y).unwrap()
        );
    }

    #[test]
    fn identity_depends_on_secret() {
        let other = WalletGate::new(b"another-secret");
        assert_ne!(
            gate().resolve(WALLET_X).unwrap(),
            other.resolve(WALLET_X).unwrap()
        );
    }

    #[test]
    fn identity_does_not_leak_address() {
        let identity = gate().resolve(WALLET_Y).unwrap();
        assert!(!identity.as_str().contains(&WALLET_Y[2..]));
        assert_eq!(identity.as_str().len(), 64);
    }

    #[test]
    fn rejects_malformed() {
        let gate = gate();
        assert_eq!(gate.resolve(""), Err(IdentityError::Missing));
        assert_eq!(gate.resolve("   "), Err(IdentityError::Missing));
        for bad in [
            "52908400098527886E0F7030069857D2E4169EE7",
            "0x1234",
            "0x52908400098527886E0F7030069857D2E4169EE7ff",
            "0xZZ908400098527886E0F7030069857D2E4169EE7",
            "0x 2908400098527886E0F7030069857D2E4169EE7",
        ] {
            assert!(
                matches!(gate.resolve(bad), Err(IdentityError::Malformed(_))),
                "{bad} should be rejected"
            );
        }
    }
}
