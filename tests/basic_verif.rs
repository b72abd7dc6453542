use approx::assert_relative_eq;
use glam::DVec3;

use tpfa_rs::discretization::generator::{cartesian_grid, tensor_grid, twist_grid};
use tpfa_rs::discretization::geometry::compute_geometry;
use tpfa_rs::discretization::mesh::Grid;
use tpfa_rs::discretization::transmissibility::compute_transmissibility;
use tpfa_rs::models::gravity_column::{GravityColumnCase, gravity_column_problem_def};
use tpfa_rs::numerics::linear::LinearSolver;
use tpfa_rs::numerics::tpfa::{TpfaSolver, boundary_face_pressure, solve_pressure_tpfa};
use tpfa_rs::physics::bc::{BoundaryConditions, BoundarySide};
use tpfa_rs::physics::fluid::make_single_fluid;
use tpfa_rs::physics::rock::Rock;
use tpfa_rs::units::{Unit, convert_from, gravity_down};

const DIRECT: TpfaSolver = TpfaSolver {
    linear: LinearSolver::Direct,
    pin_reference: true,
};

fn build(grid: Grid) -> Grid {
    compute_geometry(grid).expect("geometry")
}

#[test]
fn linear_pressure_without_gravity() {
    let n = 20;
    let length = 50.0;
    let grid = build(cartesian_grid([n, 1, 1], [length, 2.0, 3.0]).unwrap());
    let rock = Rock::uniform(&grid, convert_from(100.0, Unit::Millidarcy), 0.2).unwrap();
    let fluid = make_single_fluid(convert_from(1.0, Unit::Centipoise), 1000.0).unwrap();
    let trans = compute_transmissibility(&grid, &rock).unwrap();

    let (p_west, p_east) = (2e5, 1e5);
    let mut bc = BoundaryConditions::new();
    bc.add_boundary_pressure(&grid, BoundarySide::West, p_west).unwrap();
    bc.add_boundary_pressure(&grid, BoundarySide::East, p_east).unwrap();

    let exact = |x: f64| p_west + (p_east - p_west) * x / length;

    let direct = DIRECT
        .solve(&grid, &trans, &fluid, &bc, None, DVec3::ZERO)
        .unwrap();
    let krylov = solve_pressure_tpfa(&grid, &trans, &fluid, &bc, DVec3::ZERO).unwrap();

    for (c, cell) in grid.cells.iter().enumerate() {
        assert_relative_eq!(direct.cell_pressure[c], exact(cell.centroid[0]), max_relative = 1e-10);
        assert_relative_eq!(krylov.cell_pressure[c], exact(cell.centroid[0]), max_relative = 1e-7);
    }

    // Constant flux everywhere along +x.
    let flux = direct.face_flux[BoundarySide::East.faces(&grid)[0]];
    assert!(flux > 0.0);
    for f in grid.interior_faces() {
        assert_relative_eq!(direct.face_flux[f], flux, max_relative = 1e-9);
    }
}

#[test]
fn volumes_sum_to_the_box() {
    let extents = [3.0, 2.0, 5.0];
    let boxed = extents.iter().product::<f64>();

    let cartesian = build(cartesian_grid([4, 3, 6], extents).unwrap());
    assert_relative_eq!(cartesian.total_volume(), boxed, max_relative = 1e-12);

    let twisted = build(twist_grid(cartesian_grid([4, 3, 6], extents).unwrap(), 0.04).unwrap());
    assert_relative_eq!(twisted.total_volume(), boxed, max_relative = 1e-10);
    assert!(twisted.cells.iter().all(|c| c.volume > 0.0));

    let tensor = build(
        tensor_grid(&[0.0, 0.5, 2.0, 3.0], &[0.0, 1.5, 2.0], &[0.0, 1.0, 4.0, 5.0]).unwrap(),
    );
    assert_relative_eq!(tensor.total_volume(), boxed, max_relative = 1e-12);
}

#[test]
fn hydrostatic_column_has_no_flow() {
    let grid = build(cartesian_grid([2, 2, 5], [1.0, 1.0, 10.0]).unwrap());
    let rock = Rock::uniform(&grid, 1e-13, 0.3).unwrap();
    let fluid = make_single_fluid(1e-3, 1000.0).unwrap();
    let trans = compute_transmissibility(&grid, &rock).unwrap();
    let g = gravity_down();
    let rho_g = fluid.density() * g.z;

    let p0 = 1e5;
    let mut bc = BoundaryConditions::new();
    bc.add_boundary_pressure(&grid, BoundarySide::Top, p0).unwrap();
    bc.add_boundary_pressure(&grid, BoundarySide::Bottom, p0 + rho_g * 10.0)
        .unwrap();

    let sol = DIRECT.solve(&grid, &trans, &fluid, &bc, None, g).unwrap();

    for (c, cell) in grid.cells.iter().enumerate() {
        assert_relative_eq!(sol.cell_pressure[c], p0 + rho_g * cell.centroid[2], max_relative = 1e-12);
    }
    for (f, face) in grid.faces.iter().enumerate() {
        assert!(sol.face_flux[f].abs() < 1e-12, "flux {} on face {f}", sol.face_flux[f]);
        assert_relative_eq!(sol.face_pressure[f], p0 + rho_g * face.centroid[2], max_relative = 1e-12);
    }
}

#[test]
fn hydrostatic_holds_on_twisted_grid() {
    let grid = build(twist_grid(cartesian_grid([3, 3, 4], [1.0, 1.0, 4.0]).unwrap(), 0.03).unwrap());
    let rock = Rock::uniform(&grid, 1e-13, 0.3).unwrap();
    let fluid = make_single_fluid(1e-3, 850.0).unwrap();
    let trans = compute_transmissibility(&grid, &rock).unwrap();
    let g = gravity_down();

    let p0 = 5e5;
    let mut bc = BoundaryConditions::new();
    bc.add_boundary_pressure(&grid, BoundarySide::Top, p0).unwrap();
    let sol = DIRECT.solve(&grid, &trans, &fluid, &bc, None, g).unwrap();

    for (c, cell) in grid.cells.iter().enumerate() {
        let expected = p0 + fluid.density() * g.dot(DVec3::from(cell.centroid));
        assert_relative_eq!(sol.cell_pressure[c], expected, max_relative = 1e-10);
    }
    assert!(sol.face_flux.amax() < 1e-12);
}

#[test]
fn gravity_column_matches_hydrostatic_profile() {
    let case = GravityColumnCase::default();
    let problem = gravity_column_problem_def(&case).unwrap();
    let expected = problem.hydrostatic_pressure();

    let direct = problem.solve(&DIRECT).unwrap();
    let krylov = problem.solve(&TpfaSolver::default()).unwrap();
    assert!(direct.pinned_cells.is_empty());

    for c in 0..problem.grid.num_cells() {
        assert_relative_eq!(direct.cell_pressure[c], expected[c], max_relative = 1e-10);
        assert_relative_eq!(krylov.cell_pressure[c], expected[c], max_relative = 1e-7);
    }

    // Pressure grows strictly with depth; cells are ordered top to bottom.
    for c in 1..problem.grid.num_cells() {
        assert!(problem.grid.cells[c].centroid[2] > problem.grid.cells[c - 1].centroid[2]);
        assert!(direct.cell_pressure[c] > direct.cell_pressure[c - 1]);
    }

    // 100 bar on top, plus 30 m of water column at the bottom face.
    let top = BoundarySide::Top.faces(&problem.grid)[0];
    let bottom = BoundarySide::Bottom.faces(&problem.grid)[0];
    assert_eq!(direct.face_pressure[top], 1e7);
    let recovered = boundary_face_pressure(
        &problem.grid,
        &problem.trans,
        &problem.fluid,
        problem.gravity,
        &direct.cell_pressure,
        top,
        direct.face_flux[top],
    );
    assert_relative_eq!(recovered, 1e7, max_relative = 1e-10);
    assert_relative_eq!(
        direct.face_pressure[bottom],
        1e7 + 1014.0 * 9.80665 * 30.0,
        max_relative = 1e-10
    );
    assert!(direct.face_flux.amax() < 1e-12);
}
