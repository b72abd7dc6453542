use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use nalgebra::DVector;

use crate::discretization::mesh::Grid;
use crate::numerics::tpfa::PressureSolution;

/// Write equally long numeric columns with a header row.
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[&str], columns: &[Vec<f64>]) -> io::Result<()> {
    if headers.len() != columns.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Headers count ({}) doesn't match data columns ({})",
                headers.len(),
                columns.len()
            ),
        ));
    }
    let n_rows = columns.first().map_or(0, Vec::len);
    if let Some(col) = columns.iter().position(|c| c.len() != n_rows) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Column '{}' has {} rows, expected {}",
                headers[col],
                columns[col].len(),
                n_rows
            ),
        ));
    }

    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{}", headers.join(","))?;
    for i in 0..n_rows {
        let row: Vec<String> = columns.iter().map(|c| format!("{:.15e}", c[i])).collect();
        writeln!(file, "{}", row.join(","))?;
    }
    file.flush()
}

/// Per-cell centroid, volume and pressure, optionally next to a reference
/// pressure and the difference to it.
pub fn write_cell_solution<P: AsRef<Path>>(
    path: P,
    grid: &Grid,
    solution: &PressureSolution,
    reference: Option<&DVector<f64>>,
) -> io::Result<()> {
    let mut headers = vec!["x", "y", "z", "volume", "pressure"];
    let mut columns: Vec<Vec<f64>> = (0..3)
        .map(|a| grid.cells.iter().map(|c| c.centroid[a]).collect())
        .collect();
    columns.push(grid.cells.iter().map(|c| c.volume).collect());
    columns.push(solution.cell_pressure.iter().copied().collect());

    if let Some(reference) = reference {
        headers.extend(["reference", "error"]);
        columns.push(reference.iter().copied().collect());
        columns.push(
            solution
                .cell_pressure
                .iter()
                .zip(reference.iter())
                .map(|(p, r)| p - r)
                .collect(),
        );
    }

    write_csv(path, &headers, &columns)
}

/// Per-face centroid, area, pressure and flux.
pub fn write_face_solution<P: AsRef<Path>>(
    path: P,
    grid: &Grid,
    solution: &PressureSolution,
) -> io::Result<()> {
    let mut columns: Vec<Vec<f64>> = (0..3)
        .map(|a| grid.faces.iter().map(|f| f.centroid[a]).collect())
        .collect();
    columns.push(grid.faces.iter().map(|f| f.area).collect());
    columns.push(
        grid.faces
            .iter()
            .map(|f| if f.neighbor_cell_ids.1.is_none() { 1.0 } else { 0.0 })
            .collect(),
    );
    columns.push(solution.face_pressure.iter().copied().collect());
    columns.push(solution.face_flux.iter().copied().collect());

    write_csv(
        path,
        &["x", "y", "z", "area", "boundary", "pressure", "flux"],
        &columns,
    )
}
