use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use tpfa_rs::discretization::generator::{cartesian_grid, twist_grid};
use tpfa_rs::discretization::geometry::compute_geometry;
use tpfa_rs::discretization::mesh::Grid;
use tpfa_rs::discretization::transmissibility::{Transmissibility, compute_transmissibility};
use tpfa_rs::numerics::linear::LinearSolver;
use tpfa_rs::numerics::sparse;
use tpfa_rs::numerics::tpfa::TpfaSolver;
use tpfa_rs::physics::bc::{BoundaryConditions, BoundarySide};
use tpfa_rs::physics::fluid::{Fluid, make_single_fluid};
use tpfa_rs::physics::rock::Rock;
use tpfa_rs::units::gravity_down;

fn problem_sizes() -> Vec<usize> {
    vec![10, 20]
}

fn solver_sizes() -> Vec<usize> {
    vec![6, 10]
}

fn twisted(n: usize) -> Grid {
    let grid = cartesian_grid([n, n, n], [1.0, 1.0, 1.0]).unwrap();
    twist_grid(grid, 0.03).unwrap()
}

fn setup(n: usize) -> (Grid, Transmissibility, Fluid, BoundaryConditions) {
    let grid = compute_geometry(twisted(n)).unwrap();
    let rock = Rock::uniform(&grid, 1e-13, 0.2).unwrap();
    let trans = compute_transmissibility(&grid, &rock).unwrap();
    let fluid = make_single_fluid(1e-3, 1000.0).unwrap();
    let mut bc = BoundaryConditions::new();
    bc.add_boundary_pressure(&grid, BoundarySide::Top, 1e7).unwrap();
    bc.add_boundary_flux(&grid, BoundarySide::West, 1e-3).unwrap();
    (grid, trans, fluid, bc)
}

fn bench_grid_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_build");
    for &size in &problem_sizes() {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &n| {
            b.iter(|| std::hint::black_box(twisted(n)));
        });
    }
    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");
    for &size in &problem_sizes() {
        let grid = twisted(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter_batched(
                || grid.clone(),
                |g| std::hint::black_box(compute_geometry(g).unwrap()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_transmissibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("transmissibility");
    for &size in &problem_sizes() {
        let grid = compute_geometry(twisted(size)).unwrap();
        let rock = Rock::uniform(&grid, 1e-13, 0.2).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| std::hint::black_box(compute_transmissibility(&grid, &rock).unwrap()));
        });
    }
    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    for &size in &problem_sizes() {
        let (grid, trans, fluid, bc) = setup(size);
        let solver = TpfaSolver::default();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let system = solver
                    .assemble(&grid, &trans, &fluid, &bc, None, gravity_down())
                    .unwrap();
                std::hint::black_box(sparse::nnz(&system.matrix));
            });
        });
    }
    group.finish();
}

fn bench_solvers(c: &mut Criterion) {
    for (name, linear) in [
        ("direct_solve", LinearSolver::Direct),
        ("bicgstab_solve", LinearSolver::default()),
    ] {
        let mut group = c.benchmark_group(name);
        for &size in &solver_sizes() {
            let (grid, trans, fluid, bc) = setup(size);
            let solver = TpfaSolver {
                linear,
                ..TpfaSolver::default()
            };
            group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
                b.iter(|| {
                    let sol = solver
                        .solve(&grid, &trans, &fluid, &bc, None, gravity_down())
                        .unwrap();
                    std::hint::black_box(sol.cell_pressure);
                });
            });
        }
        group.finish();
    }
}

criterion_group!(
    benches,
    bench_grid_build,
    bench_geometry,
    bench_transmissibility,
    bench_assembly,
    bench_solvers
);
criterion_main!(benches);
