use crate::error::OddsResult;
use crate::model::category::Category;
use crate::model::deck::DeckModel;
use crate::model::hand::HandSample;
use crate::odds::{self, CategoryCount, CategoryThreshold, CombinedQuery, OddsCache};
use crate::sample::HandSampler;
use rand::Rng;
use tracing::{Level, event};

const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Query front end over the pure functions in [`odds`] and [`crate::sample`].
///
/// The engine never mutates a deck. Its only state is the memo of combined
/// queries, which is why `combined` takes `&mut self`.
#[derive(Debug)]
pub struct ProbabilityEngine {
    cache: OddsCache,
    stats: CacheStats,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl Default for ProbabilityEngine {
    fn default() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ProbabilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            cache: OddsCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn at_least(
        &self,
        deck: &DeckModel,
        category: &Category,
        k: u32,
        hand_size: u32,
    ) -> OddsResult<f64> {
        odds::probability_at_least(deck, category, k, hand_size)
    }

    pub fn exactly(
        &self,
        deck: &DeckModel,
        category: &Category,
        k: u32,
        hand_size: u32,
    ) -> OddsResult<f64> {
        odds::probability_exactly(deck, category, k, hand_size)
    }

    pub fn distribution(
        &self,
        deck: &DeckModel,
        category: &Category,
        hand_size: u32,
    ) -> OddsResult<Vec<f64>> {
        odds::exact_distribution(deck, category, hand_size)
    }

    /// Memoized [`odds::probability_combined`].
    pub fn combined(
        &mut self,
        deck: &DeckModel,
        thresholds: &[CategoryThreshold],
        hand_size: u32,
    ) -> OddsResult<f64> {
        let query = CombinedQuery::resolve(deck, thresholds, hand_size)?;
        if let Some(probability) = self.cache.get(&query) {
            self.stats.hits += 1;
            event!(
                target: "handsim_core::odds",
                Level::TRACE,
                hand_size,
                thresholds = thresholds.len(),
                "combined query served from cache"
            );
            return Ok(probability);
        }

        let probability = query.evaluate()?;
        self.stats.misses += 1;
        event!(
            target: "handsim_core::odds",
            Level::DEBUG,
            hand_size,
            thresholds = thresholds.len(),
            probability,
            "combined query evaluated"
        );
        self.cache.insert(query, probability);
        Ok(probability)
    }

    pub fn exact_split(
        &self,
        deck: &DeckModel,
        counts: &[CategoryCount],
        hand_size: u32,
    ) -> OddsResult<f64> {
        odds::probability_exact_split(deck, counts, hand_size)
    }

    pub fn sample_hand<'d, R: Rng + ?Sized>(
        &self,
        deck: &'d DeckModel,
        hand_size: u32,
        rng: &mut R,
    ) -> OddsResult<HandSample<'d>> {
        HandSampler::sample_hand(deck, hand_size, rng)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.stats
    }

    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }
}
