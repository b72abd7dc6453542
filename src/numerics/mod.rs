pub mod linear;
pub mod sparse;
pub mod timing;
pub mod tpfa;

use nalgebra::DVector;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tolerance {
    Absolute(f64),
    Relative(f64),
    Combined(f64, f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvergenceMetric {
    L2Norm,
    MaxNorm,
}

/// Residual-based convergence criterion for iterative linear solvers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Convergence {
    pub tolerance: Tolerance,
    pub metric: ConvergenceMetric,
}

impl Default for Convergence {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::Relative(1e-11),
            metric: ConvergenceMetric::L2Norm,
        }
    }
}

impl Convergence {
    pub fn norm(&self, vector: &DVector<f64>) -> f64 {
        match self.metric {
            ConvergenceMetric::L2Norm => vector.norm(),
            ConvergenceMetric::MaxNorm => vector.amax(),
        }
    }

    /// `reference` is the norm the relative tolerance is measured against,
    /// normally the right-hand side.
    pub fn check_tolerance(&self, norm: f64, reference: f64) -> bool {
        match self.tolerance {
            Tolerance::Absolute(tol) => norm < tol,
            Tolerance::Relative(tol) => norm <= tol * reference,
            Tolerance::Combined(abs_tol, rel_tol) => norm < abs_tol || norm <= rel_tol * reference,
        }
    }
}
