use super::binomial::binomial;
use crate::error::{OddsError, OddsResult};

/// Draws without replacement from a population with two outcome classes.
///
/// `population` cards contain `successes` copies of interest; `draws` cards are
/// taken. All terms are exact integer counts divided once by C(population, draws).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hypergeometric {
    population: u32,
    successes: u32,
    draws: u32,
    denominator: u128,
}

impl Hypergeometric {
    pub fn new(population: u32, successes: u32, draws: u32) -> OddsResult<Self> {
        if population == 0 {
            return Err(OddsError::EmptyDeck);
        }
        if successes > population {
            return Err(OddsError::invalid(
                "successes",
                format!("{successes} exceeds population {population}"),
            ));
        }
        if draws > population {
            return Err(OddsError::invalid(
                "hand_size",
                format!("{draws} exceeds deck size {population}"),
            ));
        }
        let denominator = binomial(population, draws).ok_or(OddsError::Overflow {
            population,
            draws,
        })?;
        Ok(Self {
            population,
            successes,
            draws,
            denominator,
        })
    }

    pub const fn population(&self) -> u32 {
        self.population
    }

    pub const fn successes(&self) -> u32 {
        self.successes
    }

    pub const fn draws(&self) -> u32 {
        self.draws
    }

    /// Number of hands holding exactly `k` successes: C(K, k) · C(N − K, n − k).
    pub fn ways(&self, k: u32) -> OddsResult<u128> {
        if k > self.draws || k > self.successes {
            return Ok(0);
        }
        let hits = self.binomial(self.successes, k)?;
        let misses = self.binomial(self.population - self.successes, self.draws - k)?;
        hits.checked_mul(misses).ok_or(self.overflow())
    }

    pub fn pmf(&self, k: u32) -> OddsResult<f64> {
        Ok(ratio(self.ways(k)?, self.denominator))
    }

    /// P(X ≥ k); trivially one for k = 0 and zero past min(K, n).
    pub fn at_least(&self, k: u32) -> OddsResult<f64> {
        if k == 0 {
            return Ok(1.0);
        }
        let upper = self.successes.min(self.draws);
        if k > upper {
            return Ok(0.0);
        }
        let mut favourable: u128 = 0;
        for i in k..=upper {
            favourable = favourable
                .checked_add(self.ways(i)?)
                .ok_or(self.overflow())?;
        }
        Ok(ratio(favourable, self.denominator))
    }

    /// PMF for every k in 0..=draws.
    pub fn distribution(&self) -> OddsResult<Vec<f64>> {
        (0..=self.draws).map(|k| self.pmf(k)).collect()
    }

    pub fn mean(&self) -> f64 {
        f64::from(self.draws) * f64::from(self.successes) / f64::from(self.population)
    }

    fn binomial(&self, n: u32, k: u32) -> OddsResult<u128> {
        binomial(n, k).ok_or(self.overflow())
    }

    fn overflow(&self) -> OddsError {
        OddsError::Overflow {
            population: self.population,
            draws: self.draws,
        }
    }
}

pub(crate) fn ratio(numerator: u128, denominator: u128) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64).clamp(0.0, 1.0)
}
