//! Monetary cost of joining two fragments.
//!
//! A junction is described by its signed gap: the number of target positions
//! missing between the end of the left fragment and the start of the right
//! one. Zero means the fragments are adjacent and negative values are
//! overlaps.
//!
//! The cost of a gap is the sum of two parts:
//!
//! - a step penalty for junction efficiency, so mid-range gaps cost more
//!   than very short or very long ones
//! - the price of bridging it: nothing for an overlap, primers with tails
//!   for short gaps, and synthesis plus primers for longer gaps
//!
//! Lengths outside the precomputed range are infeasible and map to
//! `f64::INFINITY`.

use serde::{Deserialize, Serialize};

/// Default lower end of the precomputed gap range
pub const DEFAULT_MIN_GAP: i64 = -500;

/// Default upper end of the precomputed gap range
pub const DEFAULT_MAX_GAP: i64 = 3000;

/// A step in the efficiency penalty: gaps in `min..=max` cost `cost`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBand {
    pub min: i64,
    pub max: i64,
    pub cost: f64,
}

/// Price of synthesizing a bridge of up to `max_length` bp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisTier {
    pub max_length: i64,
    pub cost: f64,
}

/// Parameters of the junction cost model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Efficiency penalty bands; gaps outside every band have no penalty
    pub bands: Vec<CostBand>,
    /// Price of one primer
    pub primer_cost: f64,
    /// Primers ordered to make one junction
    pub primers_per_junction: u32,
    /// Bases a single primer tail can add beyond its annealing region
    pub max_primer_extension: i64,
    /// Price per bridged base when primer tails close the gap
    pub cost_per_bp: f64,
    /// Synthesis prices for gaps too long for primer tails, ascending
    pub synthesis_tiers: Vec<SynthesisTier>,
    /// Smallest precomputed gap
    pub min_gap: i64,
    /// Largest precomputed gap
    pub max_gap: i64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            bands: vec![
                CostBand { min: 11, max: 19, cost: 0.1 },
                CostBand { min: 20, max: 30, cost: 0.75 },
                CostBand { min: 31, max: 100, cost: 0.9 },
            ],
            primer_cost: 14.0,
            primers_per_junction: 2,
            // primers are 60 bp with 20 bp annealed
            max_primer_extension: 40,
            cost_per_bp: 0.2,
            synthesis_tiers: vec![
                SynthesisTier { max_length: 500, cost: 89.0 },
                SynthesisTier { max_length: 750, cost: 129.0 },
                SynthesisTier { max_length: DEFAULT_MAX_GAP, cost: 150.0 },
            ],
            min_gap: DEFAULT_MIN_GAP,
            max_gap: DEFAULT_MAX_GAP,
        }
    }
}

impl CostConfig {
    /// Efficiency penalty for a gap
    pub fn band_cost(&self, gap: i64) -> f64 {
        self.bands
            .iter()
            .find(|band| band.min <= gap && gap <= band.max)
            .map_or(0.0, |band| band.cost)
    }

    /// Price of bridging a gap, infinite when no tier covers it
    pub fn bridge_cost(&self, gap: i64) -> f64 {
        if gap <= 0 {
            return 0.0;
        }
        let primers = self.primer_cost * f64::from(self.primers_per_junction);
        let reach = self.max_primer_extension * i64::from(self.primers_per_junction);
        if gap <= reach {
            return primers + gap_to_f64(gap) * self.cost_per_bp;
        }
        self.synthesis_tiers
            .iter()
            .find(|tier| gap <= tier.max_length)
            .map_or(f64::INFINITY, |tier| tier.cost + primers)
    }

    /// Total cost of a junction with this gap, ignoring the precomputed range
    pub fn gap_cost(&self, gap: i64) -> f64 {
        self.band_cost(gap) + self.bridge_cost(gap)
    }
}

#[inline]
fn gap_to_f64(gap: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        gap as f64
    }
}

/// Junction costs precomputed over a contiguous range of gaps
#[derive(Debug, Clone)]
pub struct GapCostTable {
    min_gap: i64,
    costs: Vec<f64>,
}

impl GapCostTable {
    #[must_use]
    pub fn new(config: &CostConfig) -> Self {
        let costs = if config.max_gap < config.min_gap {
            Vec::new()
        } else {
            (config.min_gap..=config.max_gap)
                .map(|gap| config.gap_cost(gap))
                .collect()
        };
        Self {
            min_gap: config.min_gap,
            costs,
        }
    }

    /// Cost of a gap, `f64::INFINITY` outside the table or when infeasible
    pub fn get(&self, gap: i64) -> f64 {
        gap.checked_sub(self.min_gap)
            .and_then(|offset| usize::try_from(offset).ok())
            .and_then(|index| self.costs.get(index))
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    pub fn is_feasible(&self, gap: i64) -> bool {
        self.get(gap).is_finite()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Smallest and largest gap with an entry
    pub fn range(&self) -> Option<(i64, i64)> {
        let last = i64::try_from(self.costs.len()).ok()?.checked_sub(1)?;
        Some((self.min_gap, self.min_gap + last))
    }
}

impl Default for GapCostTable {
    fn default() -> Self {
        Self::new(&CostConfig::default())
    }
}
