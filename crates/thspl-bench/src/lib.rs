//! Benchmark framework for thspl batch queries.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use thspl_core::linspace;
use thspl_core::units::constants::{PCRIT_PA, PTRIPLE_PA};
use thspl_water::{WaterEngine, WaterError};
use tracing::debug;

pub type BenchResult<T> = Result<T, BenchError>;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("Engine error: {0}")]
    Engine(#[from] WaterError),

    #[error("Invalid scenario '{id}': {what}")]
    Scenario { id: String, what: String },
}

/// A benchmark scenario definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkScenario {
    /// Unique identifier for this benchmark.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub workload: Workload,
    pub notes: Option<String>,
}

/// What a scenario queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Workload {
    /// `properties()` over an `n_h` x `n_p` grid, pressures log-spaced over the domain.
    Grid { n_h: usize, n_p: usize },
    /// `temperature()` along one isobar with a scalar pressure.
    CrossSection {
        n_h: usize,
        pressure_pa: f64,
        dx: usize,
    },
    /// `derivatives()` over an `n_h` x `n_p` grid.
    DerivativeSweep { n_h: usize, n_p: usize, dx: usize },
    /// Boiling and dew enthalpy at `n_p` log-spaced pressures.
    Saturation { n_p: usize },
}

impl Workload {
    pub fn points(&self) -> usize {
        match *self {
            Workload::Grid { n_h, n_p } | Workload::DerivativeSweep { n_h, n_p, .. } => n_h * n_p,
            Workload::CrossSection { n_h, .. } => n_h,
            Workload::Saturation { n_p } => 2 * n_p,
        }
    }
}

/// A single run's timing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_time_s: f64,
    pub points: usize,
    pub failures: usize,
    pub clamped: usize,
}

impl RunMetrics {
    pub fn points_per_second(&self) -> f64 {
        if self.total_time_s > 0.0 {
            self.points as f64 / self.total_time_s
        } else {
            0.0
        }
    }
}

/// Aggregated statistics for multiple runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub run_count: usize,
    pub total_time_median_s: f64,
    pub total_time_min_s: f64,
    pub total_time_max_s: f64,
    pub points_per_second_median: f64,
    pub failures_total: usize,
    pub clamped_total: usize,
}

/// Complete benchmark result for a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub scenario: BenchmarkScenario,
    pub runs: Vec<RunMetrics>,
    pub aggregate: AggregateMetrics,
}

/// Collection of benchmark results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub timestamp: String,
    /// SHA-256 of the coefficient table the suite ran against.
    pub table_fingerprint: String,
    pub results: Vec<BenchmarkResult>,
}

/// `n` pressures log-spaced over `[lo, hi]`.
fn log_pressures(lo: f64, hi: f64, n: usize) -> BenchResult<Vec<f64>> {
    Ok(linspace(lo.ln(), hi.ln(), n)
        .map_err(WaterError::from)?
        .into_iter()
        .map(f64::exp)
        .collect())
}

/// Flattened `(h, p)` grid, pressure-major.
fn grid(n_h: usize, n_p: usize) -> BenchResult<(Vec<f64>, Vec<f64>)> {
    let hs = linspace(1e3, 4.5e6, n_h).map_err(WaterError::from)?;
    let ps = log_pressures(PTRIPLE_PA, 1e8, n_p)?;
    let mut h = Vec::with_capacity(n_h * n_p);
    let mut p = Vec::with_capacity(n_h * n_p);
    for &pj in &ps {
        for &hi in &hs {
            h.push(hi);
            p.push(pj);
        }
    }
    Ok((h, p))
}

fn run_once(engine: &WaterEngine, workload: Workload) -> BenchResult<RunMetrics> {
    let start = Instant::now();
    let (points, failures, clamped) = match workload {
        Workload::Grid { n_h, n_p } => {
            let (h, p) = grid(n_h, n_p)?;
            let batch = engine.properties(&h, &p)?;
            (batch.len(), batch.failures().count(), batch.clamped_count())
        }
        Workload::DerivativeSweep { n_h, n_p, dx } => {
            let (h, p) = grid(n_h, n_p)?;
            let batch = engine.derivatives(&h, &p, dx)?;
            (batch.len(), batch.failures().count(), batch.clamped_count())
        }
        Workload::CrossSection {
            n_h,
            pressure_pa,
            dx,
        } => {
            let h = linspace(1e3, 4.5e6, n_h).map_err(WaterError::from)?;
            let batch = engine.temperature(&h, pressure_pa, dx)?;
            (batch.len(), batch.failures().count(), batch.clamped_count())
        }
        Workload::Saturation { n_p } => {
            let (lo, hi) = engine.saturation().domain();
            let mut failures = 0;
            let mut clamped = 0;
            for p in log_pressures(lo, hi, n_p)? {
                for result in [engine.boiling_enthalpy(p), engine.dew_enthalpy(p)] {
                    match result {
                        Ok(v) if v.clamped => clamped += 1,
                        Ok(_) => {}
                        Err(_) => failures += 1,
                    }
                }
            }
            (2 * n_p, failures, clamped)
        }
    };
    Ok(RunMetrics {
        total_time_s: start.elapsed().as_secs_f64(),
        points,
        failures,
        clamped,
    })
}

/// Run a single benchmark scenario N times against one engine.
pub fn run_scenario(
    engine: &WaterEngine,
    scenario: &BenchmarkScenario,
    times: usize,
) -> BenchResult<BenchmarkResult> {
    if scenario.workload.points() == 0 {
        return Err(BenchError::Scenario {
            id: scenario.id.clone(),
            what: "workload has no points".to_string(),
        });
    }

    let mut runs = Vec::with_capacity(times);
    for run_idx in 0..times {
        let metrics = run_once(engine, scenario.workload)?;
        debug!(
            scenario = %scenario.id,
            run = run_idx,
            seconds = metrics.total_time_s,
            "benchmark run finished"
        );
        runs.push(metrics);
    }

    let aggregate = compute_aggregates(&runs);

    Ok(BenchmarkResult {
        scenario: scenario.clone(),
        runs,
        aggregate,
    })
}

pub fn compute_aggregates(runs: &[RunMetrics]) -> AggregateMetrics {
    if runs.is_empty() {
        return AggregateMetrics {
            run_count: 0,
            total_time_median_s: 0.0,
            total_time_min_s: 0.0,
            total_time_max_s: 0.0,
            points_per_second_median: 0.0,
            failures_total: 0,
            clamped_total: 0,
        };
    }

    let mut total_times: Vec<_> = runs.iter().map(|r| r.total_time_s).collect();
    let mut rates: Vec<_> = runs.iter().map(RunMetrics::points_per_second).collect();
    total_times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    rates.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    AggregateMetrics {
        run_count: runs.len(),
        total_time_median_s: total_times[total_times.len() / 2],
        total_time_min_s: total_times[0],
        total_time_max_s: total_times[total_times.len() - 1],
        points_per_second_median: rates[rates.len() / 2],
        failures_total: runs.iter().map(|r| r.failures).sum(),
        clamped_total: runs.iter().map(|r| r.clamped).sum(),
    }
}

/// Default benchmark scenarios.
pub fn default_benchmarks() -> Vec<BenchmarkScenario> {
    vec![
        BenchmarkScenario {
            id: "grid_small".to_string(),
            name: "Property Grid 100x100".to_string(),
            workload: Workload::Grid { n_h: 100, n_p: 100 },
            notes: Some("10 000 points, enough to take the parallel path".to_string()),
        },
        BenchmarkScenario {
            id: "grid_large".to_string(),
            name: "Property Grid 1000x500".to_string(),
            workload: Workload::Grid {
                n_h: 1000,
                n_p: 500,
            },
            notes: None,
        },
        BenchmarkScenario {
            id: "isobar_supercritical".to_string(),
            name: "Temperature Slope at 23 MPa".to_string(),
            workload: Workload::CrossSection {
                n_h: 10_000,
                pressure_pa: 23e6,
                dx: 1,
            },
            notes: Some("Scalar pressure broadcast".to_string()),
        },
        BenchmarkScenario {
            id: "isobar_critical".to_string(),
            name: "Temperature at the Critical Pressure".to_string(),
            workload: Workload::CrossSection {
                n_h: 10_000,
                pressure_pa: PCRIT_PA,
                dx: 0,
            },
            notes: None,
        },
        BenchmarkScenario {
            id: "second_derivatives".to_string(),
            name: "Second Enthalpy Derivatives 300x300".to_string(),
            workload: Workload::DerivativeSweep {
                n_h: 300,
                n_p: 300,
                dx: 2,
            },
            notes: Some("Exercises the reciprocal density recurrence".to_string()),
        },
        BenchmarkScenario {
            id: "saturation".to_string(),
            name: "Saturation Curves".to_string(),
            workload: Workload::Saturation { n_p: 10_000 },
            notes: None,
        },
    ]
}
