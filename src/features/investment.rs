use rand::{Rng, RngCore};
use rust_decimal::prelude::*;

/// Largest unit a source may yield; keeps the factor inside `[-1, 1)`.
const LARGEST_UNIT: f64 = 1.0 - f64::EPSILON;

/// Source of uniformly distributed values in `[0, 1)`.
pub trait UnitSource {
    fn next_unit(&mut self) -> f64;
}

impl<R: RngCore + ?Sized> UnitSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Loss,
    Gain,
    Neutral,
}

/// Multiplier applied to an invested principal, uniform in `[-1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct InvestmentFactor(f64);

impl InvestmentFactor {
    /// Maps a unit draw onto the factor range. Out of range units are clamped.
    pub fn from_unit(unit: f64) -> Self {
        let unit = unit.max(0.0).min(LARGEST_UNIT);
        Self(-1.0 + unit * 2.0)
    }

    pub fn draw<U: UnitSource + ?Sized>(units: &mut U) -> Self {
        let factor = Self::from_unit(units.next_unit());
        debug!("Drew investment factor {}", factor.value());
        factor
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Magnitude of the gain or loss, in percent.
    pub fn percent(&self) -> f64 {
        self.0.abs() * 100.0
    }

    pub fn outcome(&self) -> Outcome {
        if self.0 < 0.0 {
            Outcome::Loss
        } else if self.0 > 0.0 {
            Outcome::Gain
        } else {
            Outcome::Neutral
        }
    }

    pub(crate) fn to_decimal(self) -> Decimal {
        // Always finite after clamping in `from_unit`
        Decimal::from_f64(self.0).unwrap_or_default()
    }
}

/// Result of a successful investment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Investment {
    pub factor: InvestmentFactor,
    pub balance: Decimal,
}

/// Replays a fixed list of units, then stays neutral.
#[cfg(test)]
pub(crate) struct ScriptedUnits(std::collections::VecDeque<f64>);

#[cfg(test)]
impl ScriptedUnits {
    pub(crate) fn new(units: impl IntoIterator<Item = f64>) -> Self {
        Self(units.into_iter().collect())
    }
}

#[cfg(test)]
impl UnitSource for ScriptedUnits {
    fn next_unit(&mut self) -> f64 {
        self.0.pop_front().unwrap_or(0.5)
    }
}
