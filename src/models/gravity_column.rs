use glam::DVec3;
use nalgebra::DVector;
use tracing::info;

use crate::discretization::generator::cartesian_grid;
use crate::discretization::geometry::compute_geometry;
use crate::discretization::mesh::Grid;
use crate::discretization::transmissibility::{Transmissibility, compute_transmissibility};
use crate::error::Result;
use crate::numerics::tpfa::{PressureSolution, TpfaSolver};
use crate::physics::bc::{BoundaryConditions, BoundarySide};
use crate::physics::fluid::{Fluid, make_single_fluid};
use crate::physics::rock::Rock;
use crate::units::{Unit, convert_from, gravity_down};

/// Input of the gravity column case, in field units where noted.
#[derive(Debug, Clone)]
pub struct GravityColumnCase {
    pub cells: [usize; 3],
    /// Domain size in meters.
    pub extents: [f64; 3],
    /// Permeability in darcy.
    pub permeability_darcy: f64,
    pub porosity: f64,
    /// Viscosity in centipoise.
    pub viscosity_cp: f64,
    /// Density in kg/m^3.
    pub density: f64,
    /// Pressure imposed on the top side, in bar.
    pub top_pressure_bar: f64,
    pub gravity: DVec3,
}

impl Default for GravityColumnCase {
    fn default() -> Self {
        Self {
            cells: [1, 1, 30],
            extents: [1.0, 1.0, 30.0],
            permeability_darcy: 0.1,
            porosity: 1.0,
            viscosity_cp: 1.0,
            density: 1014.0,
            top_pressure_bar: 100.0,
            gravity: gravity_down(),
        }
    }
}

/// Fully set-up gravity column, ready to solve.
#[derive(Debug, Clone)]
pub struct GravityColumnProblem {
    pub grid: Grid,
    pub rock: Rock,
    pub fluid: Fluid,
    pub bc: BoundaryConditions,
    pub trans: Transmissibility,
    pub gravity: DVec3,
    /// Top pressure in Pa.
    pub top_pressure: f64,
}

pub fn gravity_column_problem_def(case: &GravityColumnCase) -> Result<GravityColumnProblem> {
    let grid = compute_geometry(cartesian_grid(case.cells, case.extents)?)?;
    let rock = Rock::uniform(
        &grid,
        convert_from(case.permeability_darcy, Unit::Darcy),
        case.porosity,
    )?;
    let fluid = make_single_fluid(convert_from(case.viscosity_cp, Unit::Centipoise), case.density)?;

    let top_pressure = convert_from(case.top_pressure_bar, Unit::Bar);
    let mut bc = BoundaryConditions::new();
    bc.add_boundary_pressure(&grid, BoundarySide::Top, top_pressure)?;

    let trans = compute_transmissibility(&grid, &rock)?;

    info!(
        cells = grid.num_cells(),
        faces = grid.num_faces(),
        top_pressure,
        "gravity column set up"
    );

    Ok(GravityColumnProblem {
        grid,
        rock,
        fluid,
        bc,
        trans,
        gravity: case.gravity,
        top_pressure,
    })
}

impl GravityColumnProblem {
    pub fn solve(&self, solver: &TpfaSolver) -> Result<PressureSolution> {
        solver.solve(
            &self.grid,
            &self.trans,
            &self.fluid,
            &self.bc,
            None,
            self.gravity,
        )
    }

    /// Analytic hydrostatic pressure `p_top + rho g . x` at every cell center,
    /// with the top side at depth zero.
    pub fn hydrostatic_pressure(&self) -> DVector<f64> {
        let rho = self.fluid.density();
        DVector::from_iterator(
            self.grid.num_cells(),
            self.grid
                .cells
                .iter()
                .map(|c| self.top_pressure + rho * self.gravity.dot(DVec3::from(c.centroid))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_case_setup() {
        let problem = gravity_column_problem_def(&GravityColumnCase::default()).unwrap();
        assert_eq!(problem.grid.num_cells(), 30);
        assert_eq!(problem.bc.len(), 1);
        assert_eq!(problem.top_pressure, 1e7);
        let p = problem.hydrostatic_pressure();
        assert!(p.iter().zip(p.iter().skip(1)).all(|(a, b)| b > a));
    }
}
