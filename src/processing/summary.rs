use crate::discretization::mesh::Grid;
use crate::numerics::linear::LinearSolveStats;
use crate::numerics::tpfa::PressureSolution;
use crate::physics::fluid::Fluid;
use crate::physics::rock::Rock;
use crate::units::{Unit, convert_to};
use nalgebra::DVector;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub struct SimulationSummary {
    // Grid info
    pub num_cells: usize,
    pub num_faces: usize,
    pub num_boundary_faces: usize,
    pub num_nodes: usize,
    pub cartesian_dims: [usize; 3],
    pub physical_dims: [f64; 3],
    pub total_volume: f64,
    pub min_cell_volume: f64,
    pub max_cell_volume: f64,
    pub pore_volume: f64,

    // Physics info
    pub viscosity: f64,
    pub density: f64,
    pub top_pressure: f64,

    // Solver info
    pub direct: Option<LinearSolveStats>,
    pub krylov: Option<LinearSolveStats>,
    pub max_solution_diff: Option<f64>,
    pub mean_solution_diff: Option<f64>,

    // Accuracy against a reference profile
    pub max_reference_error: Option<f64>,
    pub pressure_range: Option<(f64, f64)>,
    pub max_abs_flux: Option<f64>,
}

impl SimulationSummary {
    pub fn from_problem(grid: &Grid, rock: &Rock, fluid: &Fluid, top_pressure: f64) -> Self {
        let volumes = grid.cells.iter().map(|c| c.volume);
        let min_volume = volumes.clone().fold(f64::INFINITY, f64::min);
        let max_volume = volumes.fold(f64::NEG_INFINITY, f64::max);

        Self {
            num_cells: grid.num_cells(),
            num_faces: grid.num_faces(),
            num_boundary_faces: grid.boundary_faces().count(),
            num_nodes: grid.nodes.len(),
            cartesian_dims: grid.cartesian_dims,
            physical_dims: grid.physical_dims,
            total_volume: grid.total_volume(),
            min_cell_volume: min_volume,
            max_cell_volume: max_volume,
            pore_volume: rock.pore_volumes(grid).iter().sum(),
            viscosity: fluid.viscosity(),
            density: fluid.density(),
            top_pressure,
            direct: None,
            krylov: None,
            max_solution_diff: None,
            mean_solution_diff: None,
            max_reference_error: None,
            pressure_range: None,
            max_abs_flux: None,
        }
    }

    pub fn add_direct_solver_info(&mut self, stats: LinearSolveStats) {
        self.direct = Some(stats);
    }

    pub fn add_krylov_solver_info(&mut self, stats: LinearSolveStats) {
        self.krylov = Some(stats);
    }

    pub fn add_comparison(&mut self, direct: &DVector<f64>, krylov: &DVector<f64>) {
        let diffs: Vec<f64> = direct
            .iter()
            .zip(krylov.iter())
            .map(|(d, s)| (d - s).abs())
            .collect();

        self.max_solution_diff = Some(diffs.iter().cloned().fold(0.0, f64::max));
        self.mean_solution_diff = Some(diffs.iter().sum::<f64>() / diffs.len().max(1) as f64);
    }

    /// Record the pressure range, the largest face flux and the largest
    /// deviation from `reference`.
    pub fn add_solution(&mut self, solution: &PressureSolution, reference: &DVector<f64>) {
        self.pressure_range = Some((solution.cell_pressure.min(), solution.cell_pressure.max()));
        self.max_abs_flux = Some(solution.face_flux.amax());
        self.max_reference_error = Some((&solution.cell_pressure - reference).amax());
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file, "TPFA PRESSURE SIMULATION SUMMARY")?;
        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file)?;

        writeln!(file, "GRID STATISTICS")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(
            file,
            "Cartesian dims:      {} x {} x {}",
            self.cartesian_dims[0], self.cartesian_dims[1], self.cartesian_dims[2]
        )?;
        writeln!(
            file,
            "Physical dims:       {:.4} x {:.4} x {:.4} m",
            self.physical_dims[0], self.physical_dims[1], self.physical_dims[2]
        )?;
        writeln!(file, "Number of cells:     {}", self.num_cells)?;
        writeln!(
            file,
            "Number of faces:     {} ({} on the boundary)",
            self.num_faces, self.num_boundary_faces
        )?;
        writeln!(file, "Number of nodes:     {}", self.num_nodes)?;
        writeln!(file, "Total volume:        {:.6e} m^3", self.total_volume)?;
        writeln!(
            file,
            "Cell volume range:   {:.6e} to {:.6e} m^3",
            self.min_cell_volume, self.max_cell_volume
        )?;
        writeln!(file, "Pore volume:         {:.6e} m^3", self.pore_volume)?;
        writeln!(file)?;

        writeln!(file, "FLUID")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(
            file,
            "Viscosity:           {:.4} cP",
            convert_to(self.viscosity, Unit::Centipoise)
        )?;
        writeln!(file, "Density:             {:.4} kg/m^3", self.density)?;
        writeln!(
            file,
            "Top pressure:        {:.4} bar",
            convert_to(self.top_pressure, Unit::Bar)
        )?;
        writeln!(file)?;

        if let Some((lo, hi)) = self.pressure_range {
            writeln!(file, "RESULTS")?;
            writeln!(file, "{}", "-".repeat(60))?;
            writeln!(
                file,
                "Cell pressure:       {:.6} to {:.6} bar",
                convert_to(lo, Unit::Bar),
                convert_to(hi, Unit::Bar)
            )?;
            if let Some(flux) = self.max_abs_flux {
                writeln!(file, "Max |face flux|:     {:.6e} m^3/s", flux)?;
            }
            if let Some(err) = self.max_reference_error {
                writeln!(file, "Max |p - p_hydro|:   {:.6e} Pa", err)?;
            }
            writeln!(file)?;
        }

        if self.direct.is_some() || self.krylov.is_some() {
            writeln!(file, "SOLVER PERFORMANCE")?;
            writeln!(file, "{}", "-".repeat(60))?;

            if let Some(stats) = self.direct {
                writeln!(file, "Direct solver:")?;
                writeln!(file, "  Final residual:    {:.6e}", stats.residual)?;
            }

            if let Some(stats) = self.krylov {
                writeln!(file, "BiCGStab:")?;
                writeln!(file, "  Iterations:        {}", stats.iterations)?;
                writeln!(file, "  Final residual:    {:.6e}", stats.residual)?;
            }
            writeln!(file)?;
        }

        if let (Some(max_diff), Some(mean_diff)) = (self.max_solution_diff, self.mean_solution_diff)
        {
            writeln!(file, "SOLVER COMPARISON")?;
            writeln!(file, "{}", "-".repeat(60))?;
            writeln!(file, "Max difference:      {:.6e} Pa", max_diff)?;
            writeln!(file, "Mean difference:     {:.6e} Pa", mean_diff)?;
            writeln!(file)?;
        }

        writeln!(file, "{}", "=".repeat(60))?;

        Ok(())
    }

    pub fn print_to_console(&self) {
        println!("\n{}", "=".repeat(60));
        println!("SIMULATION SUMMARY");
        println!("{}", "=".repeat(60));
        println!(
            "Grid:          {} cells, {} faces",
            self.num_cells, self.num_faces
        );
        if let Some((lo, hi)) = self.pressure_range {
            println!(
                "Pressure:      {:.4} to {:.4} bar",
                convert_to(lo, Unit::Bar),
                convert_to(hi, Unit::Bar)
            );
        }
        if let Some(err) = self.max_reference_error {
            println!("Hydro error:   {:.3e} Pa", err);
        }
        if let Some(stats) = self.krylov {
            println!("BiCGStab:      {} iterations", stats.iterations);
        }
        if let Some(max_diff) = self.max_solution_diff {
            println!("Max diff:      {:.3e} Pa", max_diff);
        }
        println!("{}\n", "=".repeat(60));
    }
}
