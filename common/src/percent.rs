//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// Whole percentage in the `0..=100` range.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[display("{_0}%")]
pub struct Percent(u8);

impl Percent {
    /// Zero [`Percent`].
    pub const ZERO: Self = Self(0);

    /// Creates a new [`Percent`] if the provided value is not greater than
    /// `100`.
    #[must_use]
    pub const fn new(val: u8) -> Option<Self> {
        if val > 100 {
            None
        } else {
            Some(Self(val))
        }
    }

    /// Calculates the share of `part` in `total` rounded to the nearest whole
    /// percent (halves round up).
    ///
    /// Returns [`Percent::ZERO`] if `total` is zero, and saturates at `100`
    /// if `part` exceeds `total`.
    #[must_use]
    pub fn ratio(part: u64, total: u64) -> Self {
        if total == 0 {
            return Self::ZERO;
        }
        let share = Decimal::from(part.min(total)) * Decimal::ONE_HUNDRED
            / Decimal::from(total);
        let rounded = share
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Self(u8::try_from(rounded).map_or(100, |v| v.min(100)))
    }

    /// Returns the value of this [`Percent`].
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    /// Parses values like `70`, `70%` or `69.5` (the latter rounded).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_suffix('%').unwrap_or(s).trim();
        Decimal::from_str(s)
            .ok()
            .map(|d| {
                d.round_dp_with_strategy(
                    0,
                    RoundingStrategy::MidpointAwayFromZero,
                )
            })
            .and_then(|d| u8::try_from(d).ok())
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

impl<'de> Deserialize<'de> for Percent {
    /// Accepts both numbers and strings, as backends often send percentages
    /// as `"70.00"`.
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(d)? {
            Raw::Number(n) => Decimal::try_from(n)
                .map_err(D::Error::custom)?
                .to_string()
                .parse(),
            Raw::Text(s) => s.parse(),
        }
        .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod spec {
    use super::Percent;

    #[test]
    fn ratio_rounds_to_nearest() {
        assert_eq!(Percent::ratio(7, 10).get(), 70);
        assert_eq!(Percent::ratio(2, 3).get(), 67);
        assert_eq!(Percent::ratio(1, 8).get(), 13);
        assert_eq!(Percent::ratio(1, 200).get(), 1);
        assert_eq!(Percent::ratio(0, 10).get(), 0);
        assert_eq!(Percent::ratio(10, 10).get(), 100);
    }

    #[test]
    fn ratio_of_empty_total_is_zero() {
        assert_eq!(Percent::ratio(0, 0), Percent::ZERO);
        assert_eq!(Percent::ratio(5, 0), Percent::ZERO);
    }

    #[test]
    fn parses_backend_representations() {
        assert_eq!("70".parse::<Percent>().unwrap().get(), 70);
        assert_eq!("70%".parse::<Percent>().unwrap().get(), 70);
        assert_eq!("66.67".parse::<Percent>().unwrap().get(), 67);
        assert!("101".parse::<Percent>().is_err());
        assert!("-1".parse::<Percent>().is_err());

        let p: Percent = serde_json::from_str("\"85.50\"").unwrap();
        assert_eq!(p.get(), 86);
        let p: Percent = serde_json::from_str("42").unwrap();
        assert_eq!(p.get(), 42);
        assert_eq!(p.to_string(), "42%");
    }
}
