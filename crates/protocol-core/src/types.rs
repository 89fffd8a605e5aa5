// protocol-core/src/types.rs

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Timestamp in Unix epoch seconds
pub type Timestamp = u64;

/// Period index (floor of timestamp / week length)
pub type PeriodIndex = u64;

/// Seconds in one emission period
pub const WEEK_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Seconds in one hour (vault lockout window before a period boundary)
pub const HOUR_SECONDS: u64 = 60 * 60;

/// Basis-point scale: 10_000 = 100%
pub const BPS_BASIS: u64 = 10_000;

/// Token amount (using BigUint for arbitrary precision)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(BigUint);

impl Amount {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(BigUint::from(0u64))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    pub fn from_tokens(tokens: u64) -> Self {
        // 1 token = 10^18 base units
        Self(BigUint::from(tokens) * BigUint::from(10u64).pow(18))
    }

    pub fn inner(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::from(0u64)
    }

    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        Some(Amount(&self.0 + &other.0))
    }

    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 < other.0 {
            None
        } else {
            Some(Amount(&self.0 - &other.0))
        }
    }

    /// `self - other`, clamped to zero on underflow.
    pub fn saturating_sub(&self, other: &Amount) -> Amount {
        self.checked_sub(other).unwrap_or_else(Amount::zero)
    }

    /// `floor(self * numerator / denominator)`. None when the denominator is zero.
    pub fn mul_div_floor(&self, numerator: &Amount, denominator: &Amount) -> Option<Amount> {
        if denominator.is_zero() {
            return None;
        }
        Some(Amount((&self.0 * &numerator.0) / &denominator.0))
    }

    /// `ceil(self * numerator / denominator)`. None when the denominator is zero.
    pub fn mul_div_ceil(&self, numerator: &Amount, denominator: &Amount) -> Option<Amount> {
        if denominator.is_zero() {
            return None;
        }
        let product = &self.0 * &numerator.0;
        if product == BigUint::from(0u64) {
            return Some(Amount::zero());
        }
        Some(Amount((product - BigUint::from(1u64)) / &denominator.0 + BigUint::from(1u64)))
    }

    /// Lossless narrowing for display and tests. None above u128::MAX.
    pub fn to_u128(&self) -> Option<u128> {
        self.0.to_u128()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, other: Amount) -> Amount {
        Amount(&self.0 + &other.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, other: Amount) -> Amount {
        Amount(&self.0 - &other.0)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
