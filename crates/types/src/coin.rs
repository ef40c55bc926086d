// Path: crates/types/src/coin.rs
//! Multi-denomination coin values with total, deterministic arithmetic.

use crate::error::CoinError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single denomination and amount.
///
/// A `Coin` on its own may carry any amount, including zero: a zero-amount
/// fee is how "no fee" is expressed on the wire. Validity constraints apply
/// to [`Coins`] sequences, not to lone coins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination name. The empty string is a legal denomination.
    pub denom: String,
    /// Signed 64-bit amount.
    pub amount: i64,
}

impl Coin {
    /// Convenience constructor.
    pub fn new(denom: impl Into<String>, amount: i64) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// An ordered sequence of coins.
///
/// Canonical form: denominations unique and strictly ascending, every
/// amount strictly positive. All arithmetic preserves canonical form and
/// reports overflow as a hard error rather than wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Coins(pub Vec<Coin>);

impl Coins {
    /// The empty (zero) value.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a `Coins` from a single fee coin. A zero-amount coin maps to
    /// the empty value so that fee arithmetic stays in canonical form.
    pub fn from_coin(coin: Coin) -> Self {
        if coin.amount == 0 {
            Self::new()
        } else {
            Self(vec![coin])
        }
    }

    /// True iff denominations are unique and strictly ascending and every
    /// amount is strictly positive.
    pub fn is_valid(&self) -> bool {
        for (i, coin) in self.0.iter().enumerate() {
            if coin.amount <= 0 {
                return false;
            }
            if i > 0 && self.0[i - 1].denom >= coin.denom {
                return false;
            }
        }
        true
    }

    /// True iff the sequence is empty. A zero-amount coin is not "zero";
    /// it is invalid.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// The amount held in `denom`, zero if absent.
    pub fn amount_of(&self, denom: &str) -> i64 {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(0)
    }

    /// Componentwise `>=` over the union of denominations, treating
    /// missing denominations as zero.
    pub fn is_gte(&self, other: &Coins) -> bool {
        other
            .0
            .iter()
            .all(|c| self.amount_of(&c.denom) >= c.amount)
    }

    /// Merge-adds two canonical values. Returns `CoinError::Overflow` if
    /// any per-denomination sum exceeds the `i64` range.
    pub fn plus(&self, other: &Coins) -> Result<Coins, CoinError> {
        let mut out = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut a, mut b) = (self.0.iter().peekable(), other.0.iter().peekable());
        loop {
            match (a.peek(), b.peek()) {
                (Some(ca), Some(cb)) => {
                    if ca.denom < cb.denom {
                        out.push((*ca).clone());
                        a.next();
                    } else if ca.denom > cb.denom {
                        out.push((*cb).clone());
                        b.next();
                    } else {
                        let sum = ca
                            .amount
                            .checked_add(cb.amount)
                            .ok_or(CoinError::Overflow)?;
                        if sum != 0 {
                            out.push(Coin::new(ca.denom.clone(), sum));
                        }
                        a.next();
                        b.next();
                    }
                }
                (Some(ca), None) => {
                    out.push((*ca).clone());
                    a.next();
                }
                (None, Some(cb)) => {
                    out.push((*cb).clone());
                    b.next();
                }
                (None, None) => break,
            }
        }
        Ok(Coins(out))
    }

    /// Subtracts `other` from `self`. The left side must dominate the
    /// right in every denomination; otherwise `CoinError::Underflow`.
    pub fn minus(&self, other: &Coins) -> Result<Coins, CoinError> {
        if !self.is_gte(other) {
            return Err(CoinError::Underflow);
        }
        let mut out = Vec::with_capacity(self.0.len());
        for coin in &self.0 {
            let rest = coin
                .amount
                .checked_sub(other.amount_of(&coin.denom))
                .ok_or(CoinError::Underflow)?;
            if rest != 0 {
                out.push(Coin::new(coin.denom.clone(), rest));
            }
        }
        Ok(Coins(out))
    }
}

impl From<Vec<Coin>> for Coins {
    fn from(coins: Vec<Coin>) -> Self {
        Self(coins)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", parts.join(","))
    }
}
