//! Performance indicators derived from finished runs.
//!
//! Nothing here feeds back into a simulation; every value is recomputed from
//! an immutable [`SimulationResult`]. Empty inputs give zeros rather than
//! sentinel values.

use serde::Serialize;

use crate::collector::SimulationResult;

/// Headline numbers of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub completed_customers: usize,
    pub mean_wait: f64,
    pub max_wait: f64,
    pub mean_system_time: f64,
    pub max_queue_length: usize,
    /// Mean sampled busy count over capacity, in percent.
    pub avg_utilization: f64,
}

impl Summary {
    pub fn from_result(result: &SimulationResult) -> Summary {
        let avg_utilization = if result.num_servers == 0 {
            0.0
        } else {
            let busy: Vec<f64> = result.busy_counts.iter().map(|&b| b as f64).collect();
            mean(&busy) / result.num_servers as f64 * 100.0
        };

        Summary {
            completed_customers: result.system_times.len(),
            mean_wait: mean(&result.wait_times),
            max_wait: max(&result.wait_times),
            mean_system_time: mean(&result.system_times),
            max_queue_length: result.queue_lengths.iter().copied().max().unwrap_or(0),
            avg_utilization,
        }
    }
}

impl SimulationResult {
    pub fn summary(&self) -> Summary {
        Summary::from_result(self)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Spread of one indicator across replications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl MeanStd {
    /// Sample statistics; the standard deviation is 0 below two values.
    pub fn from_values(values: &[f64]) -> MeanStd {
        if values.is_empty() {
            return MeanStd {
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        let mean = mean(values);
        let std = if values.len() > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (values.len() - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        MeanStd {
            mean,
            std,
            min: values.iter().copied().reduce(f64::min).unwrap_or(0.0),
            max: max(values),
        }
    }
}

/// Aggregate of many replications of the same scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationReport {
    pub replications: usize,
    pub successful: usize,
    pub completed_customers: MeanStd,
    pub mean_wait: MeanStd,
    pub max_wait: MeanStd,
    pub mean_system_time: MeanStd,
    pub max_queue_length: MeanStd,
    pub avg_utilization: MeanStd,
}

impl ReplicationReport {
    /// `replications` counts failed runs too; `summaries` holds the ones
    /// that finished.
    pub fn from_summaries(replications: usize, summaries: &[Summary]) -> ReplicationReport {
        let field = |f: fn(&Summary) -> f64| -> MeanStd {
            let values: Vec<f64> = summaries.iter().map(f).collect();
            MeanStd::from_values(&values)
        };

        ReplicationReport {
            replications,
            successful: summaries.len(),
            completed_customers: field(|s| s.completed_customers as f64),
            mean_wait: field(|s| s.mean_wait),
            max_wait: field(|s| s.max_wait),
            mean_system_time: field(|s| s.mean_system_time),
            max_queue_length: field(|s| s.max_queue_length as f64),
            avg_utilization: field(|s| s.avg_utilization),
        }
    }
}
