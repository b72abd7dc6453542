use super::mesh::Grid;
use crate::error::{GridError, TransmissibilityError};
use crate::physics::rock::Rock;
use glam::DVec3;

/// Two-point transmissibilities, one per face.
#[derive(Debug, Clone)]
pub struct Transmissibility {
    /// Combined face transmissibility.
    pub face: Vec<f64>,
    /// Half-transmissibilities ordered like `Face::neighbor_cell_ids`.
    pub half: Vec<(f64, Option<f64>)>,
}

impl Transmissibility {
    pub fn len(&self) -> usize {
        self.face.len()
    }

    pub fn is_empty(&self) -> bool {
        self.face.is_empty()
    }
}

/// One-sided transmissibility `A (c . K n) / |c|^2` of `cell` towards `face`,
/// with `n` pointing out of the cell.
pub fn half_transmissibility(
    grid: &Grid,
    rock: &Rock,
    cell: usize,
    face: usize,
) -> Result<f64, TransmissibilityError> {
    let f = &grid.faces[face];
    let mut normal = DVec3::from(f.normal);
    if f.neighbor_cell_ids.0 != cell {
        normal = -normal;
    }
    let c = DVec3::from(f.centroid) - DVec3::from(grid.cells[cell].centroid);
    let value = f.area * c.dot(rock.tensor(cell) * normal) / c.length_squared();

    if !(value.is_finite() && value > 0.0) {
        return Err(TransmissibilityError::ZeroTransmissibility { cell, face, value });
    }
    Ok(value)
}

/// Harmonic combination of the half-transmissibilities on either side of
/// every face. Boundary faces keep their single half-transmissibility.
pub fn compute_transmissibility(
    grid: &Grid,
    rock: &Rock,
) -> Result<Transmissibility, crate::error::Error> {
    if !grid.has_geometry() {
        return Err(GridError::MissingGeometry.into());
    }

    let mut face_t = Vec::with_capacity(grid.num_faces());
    let mut half = Vec::with_capacity(grid.num_faces());
    for (f, face) in grid.faces.iter().enumerate() {
        let (a, b) = face.neighbor_cell_ids;
        let t1 = half_transmissibility(grid, rock, a, f)?;
        match b {
            Some(b) => {
                let t2 = half_transmissibility(grid, rock, b, f)?;
                face_t.push(t1 * t2 / (t1 + t2));
                half.push((t1, Some(t2)));
            }
            None => {
                face_t.push(t1);
                half.push((t1, None));
            }
        }
    }

    Ok(Transmissibility { face: face_t, half })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::generator::{cartesian_grid, twist_grid};
    use crate::discretization::geometry::compute_geometry;
    use crate::error::Error;
    use crate::physics::rock::{Permeability, set_permeability};
    use approx::assert_relative_eq;

    #[test]
    fn uniform_cubes() {
        let g = compute_geometry(cartesian_grid([2, 1, 1], [2.0, 1.0, 1.0]).unwrap()).unwrap();
        let rock = Rock::uniform(&g, 1.0, 1.0).unwrap();
        let t = compute_transmissibility(&g, &rock).unwrap();
        for f in g.interior_faces() {
            // Two half-transmissibilities of 2 in series.
            assert_relative_eq!(t.face[f], 1.0, epsilon = 1e-12);
        }
        for f in g.boundary_faces() {
            assert_relative_eq!(t.face[f], 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn harmonic_average_of_heterogeneous_cells() {
        let g = compute_geometry(cartesian_grid([2, 1, 1], [2.0, 1.0, 1.0]).unwrap()).unwrap();
        let rock = set_permeability(&g, Permeability::Isotropic(vec![1.0, 3.0])).unwrap();
        let t = compute_transmissibility(&g, &rock).unwrap();
        let f = g.interior_faces().next().unwrap();
        let (t1, t2) = (2.0, 6.0);
        assert_relative_eq!(t.face[f], t1 * t2 / (t1 + t2), epsilon = 1e-12);
    }

    #[test]
    fn symmetric_under_cell_swap() {
        let g = cartesian_grid([4, 3, 2], [1.0, 1.0, 1.0]).unwrap();
        let g = compute_geometry(twist_grid(g, 0.02).unwrap()).unwrap();
        let perm: Vec<f64> = (0..g.num_cells()).map(|c| 1.0 + c as f64).collect();
        let rock = set_permeability(&g, Permeability::Isotropic(perm)).unwrap();
        let t = compute_transmissibility(&g, &rock).unwrap();

        let mut swapped = g.clone();
        for face in &mut swapped.faces {
            if let (a, Some(b)) = face.neighbor_cell_ids {
                face.neighbor_cell_ids = (b, Some(a));
                face.normal = [-face.normal[0], -face.normal[1], -face.normal[2]];
                face.node_ids.reverse();
            }
        }
        let ts = compute_transmissibility(&swapped, &rock).unwrap();
        for f in 0..g.num_faces() {
            assert_relative_eq!(t.face[f], ts.face[f], max_relative = 1e-12);
        }
    }

    #[test]
    fn requires_geometry() {
        let g = cartesian_grid([1, 1, 1], [1.0, 1.0, 1.0]).unwrap();
        let rock = Rock::uniform(&g, 1.0, 1.0).unwrap();
        assert!(matches!(
            compute_transmissibility(&g, &rock),
            Err(Error::Grid(GridError::MissingGeometry))
        ));
    }

    #[test]
    fn flat_cell_gives_zero_transmissibility() {
        let g = compute_geometry(cartesian_grid([1, 1, 1], [1.0, 1.0, 1.0]).unwrap()).unwrap();
        let rock = Rock::uniform(&g, 1.0, 1.0).unwrap();
        let mut collapsed = g.clone();
        // Put the cell center on a face: the cell-to-face vector vanishes.
        collapsed.cells[0].centroid = collapsed.faces[0].centroid;
        assert!(matches!(
            compute_transmissibility(&collapsed, &rock),
            Err(Error::Transmissibility(TransmissibilityError::ZeroTransmissibility { .. }))
        ));
    }
}
