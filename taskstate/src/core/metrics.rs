//! Cost accounting for a run.
//!
//! Tracks `accumulated_cost`, the running total in USD of model usage, and the
//! ordered list of individual charges that make it up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CostError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    accumulated_cost: f64,
    costs: Vec<f64>,
}

/// Point-in-time copy of the accumulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub accumulated_cost: f64,
    pub costs: Vec<f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulated_cost(&self) -> f64 {
        self.accumulated_cost
    }

    /// Overwrite the running total. The charge history is left as is.
    pub fn set_accumulated_cost(&mut self, value: f64) -> Result<(), CostError> {
        if !is_valid_amount(value) {
            return Err(CostError::NegativeTotal(value));
        }
        self.accumulated_cost = value;
        Ok(())
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    /// Record one charge. Nothing changes if the charge or the new total
    /// would not be a finite, non-negative number.
    pub fn add_cost(&mut self, value: f64) -> Result<(), CostError> {
        if !is_valid_amount(value) {
            return Err(CostError::NegativeCost(value));
        }
        let total = self.accumulated_cost + value;
        if !total.is_finite() {
            return Err(CostError::TotalOverflow(total));
        }
        self.accumulated_cost = total;
        self.costs.push(value);
        Ok(())
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            accumulated_cost: self.accumulated_cost,
            costs: self.costs.clone(),
        }
    }

    /// One `key: value` line per metric.
    pub fn log(&self) -> String {
        format!(
            "accumulated_cost: {}\ncosts: {:?}\n",
            self.accumulated_cost, self.costs
        )
    }

    /// Whether the values could have been produced through this API.
    pub(crate) fn is_consistent(&self) -> bool {
        is_valid_amount(self.accumulated_cost) && self.costs.iter().all(|c| is_valid_amount(*c))
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Metrics(accumulated_cost={}, costs={:?})",
            self.accumulated_cost, self.costs
        )
    }
}

// Non-finite values serialize as JSON `null` and could not be restored.
fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
