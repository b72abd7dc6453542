use kryst::solver::LinearSolver as _;
use kryst::{
    parallel::{NoComm, UniverseComm},
    preconditioner::PcSide,
};
use nalgebra::DVector;
use std::sync::Arc;
use tracing::debug;

use super::sparse::{self, CsrMatrix};
use super::{Convergence, Tolerance};
use crate::error::SolverError;

/// Configuration of the Jacobi-scaled BiCGStab solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KrylovConfig {
    pub max_iterations: usize,
    pub convergence: Convergence,
}

impl Default for KrylovConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            convergence: Convergence::default(),
        }
    }
}

/// Backend used for the pressure system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LinearSolver {
    /// Dense LU factorization. Exact up to round-off, cubic cost.
    Direct,
    BiCgStab(KrylovConfig),
}

impl Default for LinearSolver {
    fn default() -> Self {
        LinearSolver::BiCgStab(KrylovConfig::default())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearSolveStats {
    pub iterations: usize,
    /// Final residual norm `|b - A x|`.
    pub residual: f64,
}

impl LinearSolver {
    pub fn solve(
        &self,
        a: &CsrMatrix,
        b: &DVector<f64>,
    ) -> Result<(DVector<f64>, LinearSolveStats), SolverError> {
        let n = sparse::nrows(a);
        if b.len() != n {
            return Err(SolverError::DimensionMismatch {
                name: "right-hand side",
                expected: n,
                actual: b.len(),
            });
        }
        match self {
            LinearSolver::Direct => solve_direct(a, b),
            LinearSolver::BiCgStab(config) => solve_bicgstab(a, b, config),
        }
    }
}

pub fn solve_direct(
    a: &CsrMatrix,
    b: &DVector<f64>,
) -> Result<(DVector<f64>, LinearSolveStats), SolverError> {
    let x = sparse::to_dense(a)
        .lu()
        .solve(b)
        .ok_or_else(|| SolverError::SingularSystem("LU factorization has a zero pivot".into()))?;

    if !x.iter().all(|v| v.is_finite()) {
        return Err(SolverError::SingularSystem(
            "LU solve produced non-finite values".into(),
        ));
    }
    let residual = (b - sparse::mul_vec(a, &x)).norm();
    Ok((
        x,
        LinearSolveStats {
            iterations: 1,
            residual,
        },
    ))
}

/// BiCGStab from `kryst` on the system with every row divided by its
/// diagonal entry. Convergence is judged on the true residual of the scaled
/// system.
pub fn solve_bicgstab(
    a: &CsrMatrix,
    b: &DVector<f64>,
    config: &KrylovConfig,
) -> Result<(DVector<f64>, LinearSolveStats), SolverError> {
    let n = b.len();
    let mut x = DVector::<f64>::zeros(n);
    if config.convergence.norm(b) == 0.0 {
        return Ok((x, LinearSolveStats::default()));
    }

    let diag = sparse::diagonal(a);
    if let Some(i) = diag.iter().position(|d| !(*d > 0.0)) {
        return Err(SolverError::SingularSystem(format!(
            "non-positive diagonal entry {:e} in row {i}",
            diag[i]
        )));
    }

    let b_scaled = b.component_div(&diag);
    let b_norm = config.convergence.norm(&b_scaled);
    // Target a tenth of the acceptance tolerance.
    let rtol = 0.1 * relative_tolerance(&config.convergence, b_norm);

    let op = kryst::matrix::op::CsrOp::new(Arc::new(sparse::row_scaled(a, &diag)));
    let mut bicgstab = kryst::solver::bicgstab::BiCgStabSolver::new(rtol, config.max_iterations);
    let mut workspace = kryst::context::ksp_context::Workspace::new(n);
    bicgstab.setup_workspace(&mut workspace);

    let stats = bicgstab
        .solve(
            &op,
            None,
            b_scaled.as_slice(),
            x.as_mut_slice(),
            PcSide::Left,
            &UniverseComm::NoComm(NoComm {}),
            None,
            Some(&mut workspace),
        )
        .map_err(|e| SolverError::KrylovFailure(format!("{e:?}")))?;

    if !x.iter().all(|v| v.is_finite()) {
        return Err(SolverError::KrylovFailure(
            "BiCGStab produced non-finite values".into(),
        ));
    }

    let residual = b - sparse::mul_vec(a, &x);
    let r_norm = config.convergence.norm(&residual.component_div(&diag));
    if !config.convergence.check_tolerance(r_norm, b_norm) {
        return Err(SolverError::NonConvergence {
            iterations: stats.iterations,
            residual: r_norm,
        });
    }

    debug!(
        iterations = stats.iterations,
        residual = r_norm,
        "BiCGStab converged"
    );
    Ok((
        x,
        LinearSolveStats {
            iterations: stats.iterations,
            residual: residual.norm(),
        },
    ))
}

/// Tolerance relative to `reference` equivalent to `convergence`.
fn relative_tolerance(convergence: &Convergence, reference: f64) -> f64 {
    match convergence.tolerance {
        Tolerance::Absolute(tol) => tol / reference,
        Tolerance::Relative(tol) => tol,
        Tolerance::Combined(abs_tol, rel_tol) => rel_tol.max(abs_tol / reference),
    }
}
