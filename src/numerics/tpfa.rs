use glam::DVec3;
use nalgebra::DVector;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::linear::{LinearSolveStats, LinearSolver};
use super::sparse::{self, CsrMatrix};
use super::timing::{Phase, finalize_timing, reset_timing, timed};
use crate::discretization::mesh::Grid;
use crate::discretization::transmissibility::Transmissibility;
use crate::error::{BoundaryError, Error, GridError, SolverError};
use crate::physics::bc::{BoundaryCondition, BoundaryConditions};
use crate::physics::fluid::Fluid;
use crate::physics::source::SourceTerms;

/// Incompressible single-phase pressure solver on two-point fluxes.
#[derive(Clone, Copy, Debug)]
pub struct TpfaSolver {
    pub linear: LinearSolver,
    /// Fix the pressure of one cell in every connected region that has no
    /// pressure boundary. Without it such regions make the system singular.
    pub pin_reference: bool,
}

impl Default for TpfaSolver {
    fn default() -> Self {
        Self {
            linear: LinearSolver::default(),
            pin_reference: true,
        }
    }
}

/// Assembled linear system `A p = b` over cell pressures.
pub struct PressureSystem {
    pub matrix: CsrMatrix,
    pub rhs: DVector<f64>,
    /// Cells whose diagonal was reinforced to remove the constant null space.
    pub pinned_cells: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct PressureSolution {
    pub cell_pressure: DVector<f64>,
    pub face_pressure: DVector<f64>,
    /// Volumetric flux along each face normal.
    pub face_flux: DVector<f64>,
    pub pinned_cells: Vec<usize>,
    pub linear_stats: LinearSolveStats,
}

impl TpfaSolver {
    pub fn assemble(
        &self,
        grid: &Grid,
        trans: &Transmissibility,
        fluid: &Fluid,
        bc: &BoundaryConditions,
        sources: Option<&SourceTerms>,
        gravity: DVec3,
    ) -> Result<PressureSystem, Error> {
        check_inputs(grid, trans, bc, sources)?;

        let n = grid.num_cells();
        let mobility = fluid.mobility();
        let rho = fluid.density();

        let mut triplets = Vec::with_capacity(n + 4 * grid.num_faces());
        let mut rhs = DVector::<f64>::zeros(n);
        let mut diag = vec![0.0; n];

        for (f, face) in grid.faces.iter().enumerate() {
            let t = trans.face[f] * mobility;
            match face.neighbor_cell_ids {
                (a, Some(b)) => {
                    let dg = rho * gravity.dot(cell_center(grid, b) - cell_center(grid, a));
                    triplets.push((a, a, t));
                    triplets.push((b, b, t));
                    triplets.push((a, b, -t));
                    triplets.push((b, a, -t));
                    diag[a] += t;
                    diag[b] += t;
                    rhs[a] -= t * dg;
                    rhs[b] += t * dg;
                }
                (c, None) => match bc.get(f) {
                    Some(BoundaryCondition::Pressure(p)) => {
                        let dg = rho * gravity.dot(face_center(grid, f) - cell_center(grid, c));
                        triplets.push((c, c, t));
                        diag[c] += t;
                        rhs[c] += t * (p - dg);
                    }
                    Some(BoundaryCondition::Flux(q)) => rhs[c] += q,
                    None => {}
                },
            }
        }

        if let Some(sources) = sources {
            for (cell, q) in sources.iter() {
                rhs[cell] += q;
            }
        }

        let mut pinned_cells = Vec::new();
        for region in floating_regions(grid, bc) {
            if !self.pin_reference {
                return Err(SolverError::SingularSystem(format!(
                    "{} cells starting at cell {} have no pressure boundary and no reference is pinned",
                    region.cells.len(),
                    region.cells[0]
                ))
                .into());
            }

            let gross: f64 = region.cells.iter().map(|&c| rhs[c].abs()).sum();
            let net: f64 = region.cells.iter().map(|&c| rhs[c]).sum();
            if net.abs() > 1e-10 * gross.max(f64::MIN_POSITIVE) {
                warn!(
                    net_rate = net,
                    cell = region.cells[0],
                    "sources in a region without pressure boundary do not balance"
                );
            }

            let cell = region.cells[0];
            let weight = if diag[cell] > 0.0 { diag[cell] } else { 1.0 };
            triplets.push((cell, cell, weight));
            debug!(cell, region_size = region.cells.len(), "pinned reference pressure");
            pinned_cells.push(cell);
        }

        Ok(PressureSystem {
            matrix: sparse::csr_from_triplets(n, triplets),
            rhs,
            pinned_cells,
        })
    }

    pub fn solve(
        &self,
        grid: &Grid,
        trans: &Transmissibility,
        fluid: &Fluid,
        bc: &BoundaryConditions,
        sources: Option<&SourceTerms>,
        gravity: DVec3,
    ) -> Result<PressureSolution, Error> {
        reset_timing();
        let solve_start = Instant::now();

        let system = timed(Phase::Assembly, || {
            self.assemble(grid, trans, fluid, bc, sources, gravity)
        })?;
        info!(
            cells = grid.num_cells(),
            nonzeros = sparse::nnz(&system.matrix),
            pinned = system.pinned_cells.len(),
            "assembled TPFA pressure system"
        );

        let (cell_pressure, linear_stats) = timed(Phase::LinearSolve, || {
            self.linear.solve(&system.matrix, &system.rhs)
        })?;
        info!(
            iterations = linear_stats.iterations,
            residual = linear_stats.residual,
            "solved pressure system"
        );

        let (face_pressure, face_flux) =
            reconstruct_faces(grid, trans, fluid, bc, gravity, &cell_pressure);

        finalize_timing(solve_start.elapsed()).log_summary();

        Ok(PressureSolution {
            cell_pressure,
            face_pressure,
            face_flux,
            pinned_cells: system.pinned_cells,
            linear_stats,
        })
    }
}

/// Solve with the default solver configuration and no source terms.
pub fn solve_pressure_tpfa(
    grid: &Grid,
    trans: &Transmissibility,
    fluid: &Fluid,
    bc: &BoundaryConditions,
    gravity: DVec3,
) -> Result<PressureSolution, Error> {
    TpfaSolver::default().solve(grid, trans, fluid, bc, None, gravity)
}

/// Face pressures and fluxes from solved cell pressures.
pub fn reconstruct_faces(
    grid: &Grid,
    trans: &Transmissibility,
    fluid: &Fluid,
    bc: &BoundaryConditions,
    gravity: DVec3,
    cell_pressure: &DVector<f64>,
) -> (DVector<f64>, DVector<f64>) {
    let nf = grid.num_faces();
    let mobility = fluid.mobility();
    let rho = fluid.density();
    let mut face_pressure = DVector::zeros(nf);
    let mut face_flux = DVector::zeros(nf);

    for (f, face) in grid.faces.iter().enumerate() {
        let xf = face_center(grid, f);
        match face.neighbor_cell_ids {
            (a, Some(b)) => {
                let (xa, xb) = (cell_center(grid, a), cell_center(grid, b));
                let (pa, pb) = (cell_pressure[a], cell_pressure[b]);
                let t = trans.face[f] * mobility;
                face_flux[f] = t * (pa - pb + rho * gravity.dot(xb - xa));

                let (ha, hb) = (trans.half[f].0, trans.half[f].1.unwrap_or(0.0));
                face_pressure[f] = (ha * (pa + rho * gravity.dot(xf - xa))
                    + hb * (pb + rho * gravity.dot(xf - xb)))
                    / (ha + hb);
            }
            (c, None) => {
                let pc = cell_pressure[c];
                let dg = rho * gravity.dot(xf - cell_center(grid, c));
                let flux = match bc.get(f) {
                    Some(BoundaryCondition::Pressure(p)) => trans.face[f] * mobility * (pc - p + dg),
                    Some(BoundaryCondition::Flux(q)) => -q,
                    None => 0.0,
                };
                face_flux[f] = flux;
                face_pressure[f] = match bc.get(f) {
                    Some(BoundaryCondition::Pressure(p)) => *p,
                    _ => boundary_face_pressure(grid, trans, fluid, gravity, cell_pressure, f, flux),
                };
            }
        }
    }

    (face_pressure, face_flux)
}

/// Pressure on boundary face `face` implied by the adjacent cell pressure and
/// the outward flux through the face.
pub fn boundary_face_pressure(
    grid: &Grid,
    trans: &Transmissibility,
    fluid: &Fluid,
    gravity: DVec3,
    cell_pressure: &DVector<f64>,
    face: usize,
    outward_flux: f64,
) -> f64 {
    let c = grid.faces[face].neighbor_cell_ids.0;
    let dg = fluid.density() * gravity.dot(face_center(grid, face) - cell_center(grid, c));
    cell_pressure[c] + dg - outward_flux * fluid.viscosity() / trans.half[face].0
}

fn check_inputs(
    grid: &Grid,
    trans: &Transmissibility,
    bc: &BoundaryConditions,
    sources: Option<&SourceTerms>,
) -> Result<(), Error> {
    if !grid.has_geometry() {
        return Err(GridError::MissingGeometry.into());
    }
    for (name, len) in [
        ("face transmissibility", trans.face.len()),
        ("half-transmissibility", trans.half.len()),
    ] {
        if len != grid.num_faces() {
            return Err(SolverError::DimensionMismatch {
                name,
                expected: grid.num_faces(),
                actual: len,
            }
            .into());
        }
    }
    for (face, _) in bc.iter() {
        if face >= grid.num_faces() {
            return Err(BoundaryError::FaceOutOfRange {
                face,
                num_faces: grid.num_faces(),
            }
            .into());
        }
        if !grid.is_boundary_face(face) {
            return Err(BoundaryError::InteriorFace(face).into());
        }
    }
    if let Some(sources) = sources {
        if let Some((cell, _)) = sources.iter().find(|(c, _)| *c >= grid.num_cells()) {
            return Err(BoundaryError::CellOutOfRange {
                cell,
                num_cells: grid.num_cells(),
            }
            .into());
        }
    }
    Ok(())
}

struct Region {
    cells: Vec<usize>,
}

/// Connected groups of cells that touch no pressure boundary face.
fn floating_regions(grid: &Grid, bc: &BoundaryConditions) -> Vec<Region> {
    let mut visited = vec![false; grid.num_cells()];
    let mut regions = Vec::new();

    for seed in 0..grid.num_cells() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut stack = vec![seed];
        let mut cells = Vec::new();
        let mut anchored = false;

        while let Some(cell) = stack.pop() {
            cells.push(cell);
            for &f in &grid.cells[cell].face_ids {
                match grid.faces[f].neighbor_cell_ids {
                    (a, Some(b)) => {
                        let other = if a == cell { b } else { a };
                        if !visited[other] {
                            visited[other] = true;
                            stack.push(other);
                        }
                    }
                    (_, None) => {
                        anchored |= matches!(bc.get(f), Some(BoundaryCondition::Pressure(_)));
                    }
                }
            }
        }

        if !anchored {
            cells.sort_unstable();
            regions.push(Region { cells });
        }
    }

    regions
}

fn cell_center(grid: &Grid, cell: usize) -> DVec3 {
    DVec3::from(grid.cells[cell].centroid)
}

fn face_center(grid: &Grid, face: usize) -> DVec3 {
    DVec3::from(grid.faces[face].centroid)
}
