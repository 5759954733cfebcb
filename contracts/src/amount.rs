//! # Raw Token Amounts
//!
//! Amounts are raw integers in the token's smallest unit; a token with
//! `decimals = 6` stores `1.5` as `1_500_000`. All arithmetic happens on
//! the raw integer.

/// A raw token amount.
pub type Amount = u128;

/// Serde helper that encodes an [`Amount`] as a decimal string.
///
/// JSON numbers lose precision beyond 2^53 in most clients, and `u128`
/// goes far past that, so amounts cross the wire as strings. Deserializing
/// also accepts a plain JSON integer for convenience.
///
/// # Usage
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Mint {
///     #[serde(with = "jpeth_contracts::amount::as_string")]
///     amount: Amount,
/// }
/// ```
pub mod as_string {
    use super::Amount;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.trim().parse::<Amount>().map_err(serde::de::Error::custom),
            Repr::Number(n) => Ok(Amount::from(n)),
        }
    }
}
