use std::collections::BTreeMap;

use crate::discretization::mesh::Grid;
use crate::error::BoundaryError;

/// Volumetric source terms per cell, positive for injection.
#[derive(Clone, Debug, Default)]
pub struct SourceTerms {
    rates: BTreeMap<usize, f64>,
}

impl SourceTerms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `rate` to every cell in `cells`. Repeated cells accumulate.
    pub fn add(&mut self, grid: &Grid, cells: &[usize], rate: f64) -> Result<(), BoundaryError> {
        if let Some(&cell) = cells.iter().find(|&&c| c >= grid.num_cells()) {
            return Err(BoundaryError::CellOutOfRange {
                cell,
                num_cells: grid.num_cells(),
            });
        }
        for &cell in cells {
            *self.rates.entry(cell).or_insert(0.0) += rate;
        }
        Ok(())
    }

    pub fn rate(&self, cell: usize) -> f64 {
        self.rates.get(&cell).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.rates.iter().map(|(c, q)| (*c, *q))
    }

    pub fn net_rate(&self) -> f64 {
        self.rates.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
