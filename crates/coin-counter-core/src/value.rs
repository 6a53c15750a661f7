use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Classification, CoinError, Denomination};

/// Monetary value of each size class, in currency subunits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Denominations {
    pub small: u32,
    pub medium: u32,
    pub large: u32,
    /// Subunits per currency unit.
    pub divisor: u32,
    /// Prefix printed before the amount.
    pub currency: String,
}

impl Default for Denominations {
    fn default() -> Self {
        Self {
            small: 5,
            medium: 10,
            large: 25,
            divisor: 100,
            currency: "R$".to_string(),
        }
    }
}

impl Denominations {
    pub fn value_of(&self, denom: Denomination) -> u32 {
        match denom {
            Denomination::Small => self.small,
            Denomination::Medium => self.medium,
            Denomination::Large => self.large,
        }
    }

    pub fn validate(&self) -> Result<(), CoinError> {
        if self.divisor == 0 {
            return Err(CoinError::ZeroDivisor);
        }
        Ok(())
    }
}

/// Sum of coin values, kept in integer subunits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub subunits: u64,
    pub divisor: u32,
    pub currency: String,
}

impl Value {
    pub fn amount(&self) -> f64 {
        self.subunits as f64 / self.divisor as f64
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.divisor == 100 {
            write!(
                f,
                "{}{}.{:02}",
                self.currency,
                self.subunits / 100,
                self.subunits % 100
            )
        } else {
            write!(f, "{}{:.2}", self.currency, self.amount())
        }
    }
}

/// `Σ bucket count × bucket value`, over all buckets.
pub fn total_value(cls: &Classification, denoms: &Denominations) -> Result<Value, CoinError> {
    denoms.validate()?;
    let subunits = Denomination::ALL
        .into_iter()
        .map(|d| cls.count(d) as u64 * denoms.value_of(d) as u64)
        .sum();
    Ok(Value {
        subunits,
        divisor: denoms.divisor,
        currency: denoms.currency.clone(),
    })
}
