use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::{Infeasibility, PlanError, Result};
use crate::packer::{ExactPacker, best_fit_decreasing};
use crate::pieces::{label_pieces, piece_count, required_length, split_length};
use crate::types::{Crop, PackingResult, PlannerConfig, Ratio};

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Largest multiplier found.
    pub multiplier: f64,
    /// The same multiplier as an exact ratio, when the integer boundary
    /// could be confirmed.
    pub boundary: Option<Ratio>,
    pub result: PackingResult,
    /// Number of multiplier trials evaluated.
    pub trials: u32,
}

/// Which packer turns pieces into rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Packing {
    #[default]
    Exact,
    BestFit,
}

pub struct Solver {
    crops: Vec<Crop>,
    config: PlannerConfig,
}

impl Solver {
    pub fn new(crops: Vec<Crop>, config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        let mut names = HashSet::new();
        for crop in &crops {
            if crop.name.is_empty() {
                return Err(PlanError::InvalidInput("crop names must be non-empty".to_string()));
            }
            if crop.name.contains('#') {
                return Err(PlanError::InvalidInput(format!(
                    "crop name '{}' must not contain '#', it marks split pieces",
                    crop.name
                )));
            }
            if !names.insert(crop.name.as_str()) {
                return Err(PlanError::InvalidInput(format!(
                    "duplicate crop name '{}'",
                    crop.name
                )));
            }
            if crop.baseline_count == 0 {
                return Err(PlanError::InvalidInput(format!(
                    "baseline count of '{}' must be non-zero",
                    crop.name
                )));
            }
            if crop.spacing == 0 {
                return Err(PlanError::InvalidInput(format!(
                    "spacing of '{}' must be non-zero",
                    crop.name
                )));
            }
        }
        Ok(Self { crops, config })
    }

    pub fn crops(&self) -> &[Crop] {
        &self.crops
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Scaled counts for every crop at `multiplier`.
    pub fn counts_at(
        &self,
        multiplier: f64,
    ) -> std::result::Result<BTreeMap<String, u64>, Infeasibility> {
        self.crops
            .iter()
            .map(|c| {
                let count = c
                    .scaled_count(multiplier)
                    .ok_or_else(|| Infeasibility::LengthOverflow {
                        crop: c.name.clone(),
                    })?;
                Ok((c.name.clone(), count))
            })
            .collect()
    }

    pub fn evaluate(&self, multiplier: f64) -> std::result::Result<PackingResult, Infeasibility> {
        debug_assert!(multiplier.is_finite() && multiplier >= 0.0);
        self.evaluate_counts(&self.counts_at(multiplier)?)
    }

    /// Evaluates an explicit count vector. Crops missing from `counts` are
    /// planted zero times.
    pub fn evaluate_counts(
        &self,
        counts: &BTreeMap<String, u64>,
    ) -> std::result::Result<PackingResult, Infeasibility> {
        self.evaluate_counts_with(counts, Packing::Exact)
    }

    pub fn evaluate_counts_with(
        &self,
        counts: &BTreeMap<String, u64>,
        packing: Packing,
    ) -> std::result::Result<PackingResult, Infeasibility> {
        let config = &self.config;
        let mut scaled_counts = BTreeMap::new();
        let mut pieces = Vec::new();
        let mut total_length = 0u64;

        for crop in &self.crops {
            let count = counts.get(&crop.name).copied().unwrap_or(0);
            scaled_counts.insert(crop.name.clone(), count);

            let overflow = || Infeasibility::LengthOverflow {
                crop: crop.name.clone(),
            };
            let length = required_length(count, crop.spacing, crop.trellised, config.bed_width)
                .ok_or_else(overflow)?;
            let lengths = split_length(length, config.row_length, config.rows).ok_or_else(|| {
                Infeasibility::InfeasibleSplit {
                    crop: crop.name.clone(),
                    pieces: piece_count(length, config.row_length),
                    rows: config.rows,
                }
            })?;
            pieces.extend(label_pieces(&crop.name, &lengths));
            total_length = total_length.checked_add(length).ok_or_else(overflow)?;
        }

        let capacity = config.capacity();
        if total_length > capacity {
            return Err(Infeasibility::CapacityExceeded {
                required: total_length,
                capacity,
            });
        }

        let rows = match packing {
            Packing::Exact => ExactPacker::new(config.rows, config.row_length).pack(&pieces),
            Packing::BestFit => best_fit_decreasing(&pieces, config.rows, config.row_length),
        }
        .ok_or(Infeasibility::PackingInfeasible {
            pieces: pieces.len(),
        })?;

        Ok(PackingResult {
            scaled_counts,
            pieces,
            rows,
            row_length: config.row_length,
            total_length,
            waste: capacity - total_length,
        })
    }

    /// Finds the largest multiplier whose scaled crops still pack into the rows.
    pub fn solve(&self) -> Result<SearchOutcome> {
        let config = &self.config;
        let mut trials = 0u32;
        let mut trial = |x: f64| {
            trials += 1;
            let verdict = self.evaluate(x);
            match &verdict {
                Ok(result) => tracing::debug!(x, total_length = result.total_length, "feasible"),
                Err(reason) => tracing::debug!(x, %reason, "infeasible"),
            }
            verdict
        };

        let mut lo = 0.0;
        let mut hi = 1.0;
        let mut best = None;

        // Grow until infeasible
        while let Ok(result) = trial(hi) {
            lo = hi;
            best = Some(result);
            hi *= 2.0;
            if hi > config.multiplier_ceiling {
                return Err(PlanError::SearchExhausted {
                    ceiling: config.multiplier_ceiling,
                });
            }
        }

        for _ in 0..config.max_iterations {
            let mid = (lo + hi) / 2.0;
            match trial(mid) {
                Ok(result) => {
                    lo = mid;
                    best = Some(result);
                }
                Err(_) => hi = mid,
            }
            if hi - lo < config.tolerance {
                break;
            }
        }

        self.settle(lo, best, trials)
    }

    /// Many multipliers share one count vector. Reports the smallest
    /// count / baseline ratio of the vector at `lo` exactly, or falls back to
    /// `lo` and the last feasible result if that vector does not pack.
    fn settle(&self, lo: f64, best: Option<PackingResult>, trials: u32) -> Result<SearchOutcome> {
        let trials = trials + 1;
        let verdict = self.counts_at(lo).and_then(|counts| {
            let boundary = self
                .crops
                .iter()
                .map(|c| Ratio::new(counts[&c.name], c.baseline_count as u64))
                .min();
            self.evaluate_counts(&counts).map(|result| (boundary, result))
        });

        match verdict {
            Ok((Some(boundary), result)) => {
                tracing::info!(
                    multiplier = boundary.as_f64(),
                    %boundary,
                    trials,
                    waste = result.waste,
                    "multiplier search converged"
                );
                Ok(SearchOutcome {
                    multiplier: boundary.as_f64(),
                    boundary: Some(boundary),
                    result,
                    trials,
                })
            }
            verdict => {
                if let Err(reason) = verdict {
                    tracing::warn!(lo, %reason, "boundary counts infeasible, using last feasible trial");
                }
                let result = best.ok_or(PlanError::NoFeasiblePacking)?;
                Ok(SearchOutcome {
                    multiplier: lo,
                    boundary: None,
                    result,
                    trials,
                })
            }
        }
    }
}

/// Runs the multiplier search for `crops` under `config`.
pub fn find_max_x(crops: Vec<Crop>, config: PlannerConfig) -> Result<SearchOutcome> {
    Solver::new(crops, config)?.solve()
}
