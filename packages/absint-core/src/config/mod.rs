//! Analysis configuration (spec.md §6 "Configuration").
//!
//! A single validated struct rather than this codebase's usual multi-tier
//! preset/YAML configuration system: that apparatus exists to serve an
//! indexing pipeline with dozens of independently-tunable stages and an
//! end-user CLI, neither of which this spec has (§1 Non-goals: "no
//! interactive UI"). The engine still gets the same `serde` + validated
//! struct + `thiserror` treatment as any one stage of that system would.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_reduction_cycles must be >= 1, got {0}")]
    MaxReductionCyclesTooSmall(u32),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Which numerical domain backs the fixpoint (spec.md §6). Descriptive only:
/// see [`AnalysisConfig::numerical_domain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericalDomainKind {
    Interval,
    IntervalCongruence,
    Dbm,
    ApronOctagon,
    ApronPolka,
    VarPackingDbm,
}

/// How much of the memory model the analysis tracks (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    RegisterOnly,
    Pointer,
    Memory,
}

/// Analysis-wide tunables, all surfaced in spec.md §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of pre-widening join iterations at a loop head before
    /// switching to `widening` (spec.md §4.13 step 4).
    pub widening_delay: u32,
    /// Number of post-fixpoint narrowing passes (spec.md §4.13 step 5).
    pub narrowing_iterations: u32,
    /// Budget for the linear-interval-solver's reduction loop (spec.md
    /// §4.6).
    pub max_reduction_cycles: u32,
    /// Advisory only: the fixpoint driver is generic over `S: NumericalState`
    /// and the concrete domain is chosen by the caller at the type level
    /// (spec.md §6), not read out of this struct. This field exists so a
    /// serialized config documents which domain a given analysis run used;
    /// there is no dispatcher here that maps it to a `NumericalState` impl.
    pub numerical_domain: NumericalDomainKind,
    pub precision: Precision,
    /// Optional widening thresholds, tried before falling back to `±∞`
    /// (spec.md §4.1, §4.13).
    pub widening_thresholds: Vec<i64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            widening_delay: 1,
            narrowing_iterations: 2,
            max_reduction_cycles: 10,
            numerical_domain: NumericalDomainKind::Interval,
            precision: Precision::Pointer,
            widening_thresholds: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_reduction_cycles < 1 {
            return Err(ConfigError::MaxReductionCyclesTooSmall(self.max_reduction_cycles));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.widening_delay, 1);
        assert_eq!(cfg.narrowing_iterations, 2);
        assert_eq!(cfg.max_reduction_cycles, 10);
        assert_eq!(cfg.numerical_domain, NumericalDomainKind::Interval);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_reduction_cycles() {
        let mut cfg = AnalysisConfig::default();
        cfg.max_reduction_cycles = 0;
        assert!(cfg.validate().is_err());
    }
}
