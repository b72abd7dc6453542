use nalgebra::DVector;
use std::fs;
use tpfa_rs::models::gravity_column::{
    GravityColumnCase, GravityColumnProblem, gravity_column_problem_def,
};
use tpfa_rs::numerics::linear::{KrylovConfig, LinearSolver};
use tpfa_rs::numerics::tpfa::{PressureSolution, TpfaSolver};
use tpfa_rs::processing::csv_writer;
use tpfa_rs::processing::summary::SimulationSummary;
use tpfa_rs::units::{Unit, convert_to};
use tracing_subscriber::EnvFilter;

const OUTPUT_DIR: &str = "output/gravity_column";

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    fs::create_dir_all(OUTPUT_DIR).expect("Failed to create output directory");

    let case = GravityColumnCase::default();
    let problem = gravity_column_problem_def(&case).expect("Failed to set up gravity column");

    let mut summary = SimulationSummary::from_problem(
        &problem.grid,
        &problem.rock,
        &problem.fluid,
        problem.top_pressure,
    );

    let direct_result = run_solver(&problem, LinearSolver::Direct, "direct");
    let krylov_result = run_solver(
        &problem,
        LinearSolver::BiCgStab(KrylovConfig::default()),
        "BiCGStab",
    );

    if let Some(ref solution) = direct_result {
        summary.add_direct_solver_info(solution.linear_stats);
    }
    if let Some(ref solution) = krylov_result {
        summary.add_krylov_solver_info(solution.linear_stats);
    }

    let hydrostatic = problem.hydrostatic_pressure();
    if let Some(solution) = direct_result.as_ref().or(krylov_result.as_ref()) {
        summary.add_solution(solution, &hydrostatic);
        save_solution(&problem, solution, &hydrostatic);
        print_profile(&problem, solution, &hydrostatic);
    }

    if let (Some(direct), Some(krylov)) = (direct_result.as_ref(), krylov_result.as_ref()) {
        summary.add_comparison(&direct.cell_pressure, &krylov.cell_pressure);
        compare_solutions(&direct.cell_pressure, &krylov.cell_pressure);
    }

    let summary_path = format!("{OUTPUT_DIR}/summary.txt");
    summary
        .write_to_file(&summary_path)
        .expect("Failed to write summary");
    summary.print_to_console();

    println!("Summary saved to {summary_path}");
}

fn run_solver(
    problem: &GravityColumnProblem,
    linear: LinearSolver,
    label: &str,
) -> Option<PressureSolution> {
    let solver = TpfaSolver {
        linear,
        ..TpfaSolver::default()
    };

    println!("Running TPFA pressure solve ({label})...");
    match problem.solve(&solver) {
        Ok(solution) => {
            println!("Solver finished successfully.\n");
            Some(solution)
        }
        Err(e) => {
            eprintln!("Solver ({label}) failed: {e}");
            None
        }
    }
}

fn save_solution(
    problem: &GravityColumnProblem,
    solution: &PressureSolution,
    hydrostatic: &DVector<f64>,
) {
    let cells_path = format!("{OUTPUT_DIR}/cells.csv");
    csv_writer::write_cell_solution(&cells_path, &problem.grid, solution, Some(hydrostatic))
        .expect("Failed to write cell solution");
    println!("Cell pressures saved to {cells_path}");

    let faces_path = format!("{OUTPUT_DIR}/faces.csv");
    csv_writer::write_face_solution(&faces_path, &problem.grid, solution)
        .expect("Failed to write face solution");
    println!("Face pressures and fluxes saved to {faces_path}");
}

fn print_profile(
    problem: &GravityColumnProblem,
    solution: &PressureSolution,
    hydrostatic: &DVector<f64>,
) {
    println!("{:>10} {:>14} {:>14} {:>12}", "depth [m]", "p [bar]", "p_hydro [bar]", "error [Pa]");
    for (c, cell) in problem.grid.cells.iter().enumerate() {
        println!(
            "{:>10.3} {:>14.6} {:>14.6} {:>12.3e}",
            cell.centroid[2],
            convert_to(solution.cell_pressure[c], Unit::Bar),
            convert_to(hydrostatic[c], Unit::Bar),
            solution.cell_pressure[c] - hydrostatic[c]
        );
    }
    println!();
}

fn compare_solutions(direct: &DVector<f64>, krylov: &DVector<f64>) {
    let n = direct.len();
    if krylov.len() != n {
        eprintln!(
            "Cannot compare: different lengths (direct {}, BiCGStab {})",
            n,
            krylov.len()
        );
        return;
    }

    let diff = krylov - direct;
    let max_idx = diff.iamax();
    let max_abs = diff[max_idx].abs();
    let rel_l2 = diff.norm() / direct.norm();

    println!("Solution comparison (BiCGStab vs direct):");
    println!("  L2 diff: {:.3e}", diff.norm());
    println!("  Relative L2 diff: {:.3e}", rel_l2);
    println!("  Max abs diff: {:.3e} at cell {}", max_abs, max_idx);
}
