// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use serde::{Deserialize, Serialize};

/// A coin amount. 128 bits wide so that large contract payouts and the
/// cumulative tax pool cannot overflow in practice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Currency(u128);

impl Currency {
    pub const ZERO: Currency = Currency(0);
    /// Base units per whole coin.
    const COIN: u128 = 1_000_000_000_000;

    /// An amount of `n` whole coins.
    pub const fn coins(n: u64) -> Currency {
        Currency(n as u128 * Currency::COIN)
    }

    pub const fn from_base_units(units: u128) -> Currency {
        Currency(units)
    }

    pub fn as_base_units(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Currency) -> Option<Currency> {
        self.0.checked_add(other.0).map(Currency)
    }

    pub fn checked_sub(self, other: Currency) -> Option<Currency> {
        self.0.checked_sub(other.0).map(Currency)
    }

    pub fn div_u64(self, divisor: u64) -> Currency {
        Currency(self.0 / divisor as u128)
    }

    pub fn mul_u64(self, factor: u64) -> Currency {
        Currency(self.0 * factor as u128)
    }
}

impl Add for Currency {
    type Output = Currency;

    fn add(self, other: Currency) -> Currency {
        Currency(self.0 + other.0)
    }
}

impl AddAssign for Currency {
    fn add_assign(&mut self, other: Currency) {
        self.0 += other.0;
    }
}

impl Sub for Currency {
    type Output = Currency;

    fn sub(self, other: Currency) -> Currency {
        Currency(self.0 - other.0)
    }
}

impl Sum for Currency {
    fn sum<I: Iterator<Item = Currency>>(iter: I) -> Currency {
        iter.fold(Currency::ZERO, Add::add)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn coin_arithmetic() {
        assert_eq!(Currency::coins(5) + Currency::coins(9), Currency::coins(14));
        assert_eq!(Currency::coins(35) - Currency::coins(1), Currency::coins(34));
        assert_eq!(
            (1..=13).map(Currency::coins).sum::<Currency>(),
            Currency::coins(91)
        );
    }

    #[test]
    fn checked_sub_underflow() {
        assert_eq!(Currency::coins(1).checked_sub(Currency::coins(2)), None);
    }

    #[test]
    fn div_then_mul_orders_matter() {
        // claim maths divides the pool share before scaling by stake units
        let pool = Currency::from_base_units(1_000_000);
        assert_eq!(pool.div_u64(10_000).mul_u64(10_000), pool);
        assert_eq!(pool.div_u64(10_000).mul_u64(5_000), Currency::from_base_units(500_000));
    }
}
