use super::mesh::Grid;
use crate::error::GridError;
use glam::DVec3;

/// Derive face areas, normals and centroids, and cell volumes and centroids.
///
/// Faces are split into triangles fanned around the mean of their nodes, and
/// cells into tetrahedra spanned by those triangles and a reference point
/// inside the cell, so neither planar faces nor axis-aligned cells are assumed.
pub fn compute_geometry(mut grid: Grid) -> Result<Grid, GridError> {
    // Per-face sub-triangles, kept for the cell pass.
    let mut face_triangles: Vec<Vec<Triangle>> = Vec::with_capacity(grid.faces.len());

    for (face_id, face) in grid.faces.iter_mut().enumerate() {
        let points: Vec<DVec3> = face
            .node_ids
            .iter()
            .map(|&n| DVec3::from(grid.nodes[n].position))
            .collect();
        if points.len() < 3 {
            return Err(GridError::DegenerateGeometry(format!(
                "face {face_id} has {} nodes",
                points.len()
            )));
        }
        let center = points.iter().copied().sum::<DVec3>() / points.len() as f64;

        let triangles: Vec<Triangle> = (0..points.len())
            .map(|i| Triangle::new(points[i], points[(i + 1) % points.len()], center))
            .collect();

        let area_vector: DVec3 = triangles.iter().map(|t| t.area_vector).sum();
        let area: f64 = triangles.iter().map(|t| t.area_vector.length()).sum();
        if !(area > 0.0) || area_vector.length() <= 0.0 {
            return Err(GridError::DegenerateGeometry(format!(
                "face {face_id} has non-positive area {area:e}"
            )));
        }
        let centroid = triangles
            .iter()
            .map(|t| t.centroid * t.area_vector.length())
            .sum::<DVec3>()
            / area;

        face.area = area;
        face.normal = area_vector.normalize().to_array();
        face.centroid = centroid.to_array();
        face_triangles.push(triangles);
    }

    for (cell_id, cell) in grid.cells.iter_mut().enumerate() {
        let reference = cell
            .face_ids
            .iter()
            .map(|&f| DVec3::from(grid.faces[f].centroid))
            .sum::<DVec3>()
            / cell.face_ids.len() as f64;

        let mut volume = 0.0;
        let mut moment = DVec3::ZERO;
        for &f in &cell.face_ids {
            let orientation = if grid.faces[f].neighbor_cell_ids.0 == cell_id {
                1.0
            } else {
                -1.0
            };
            for tri in &face_triangles[f] {
                // Signed tetrahedron volume with apex at the reference point.
                let v = orientation * (tri.centroid - reference).dot(tri.area_vector) / 3.0;
                volume += v;
                moment += v * (reference + 0.75 * (tri.centroid - reference));
            }
        }

        if !(volume > 0.0) {
            return Err(GridError::DegenerateGeometry(format!(
                "cell {cell_id} has non-positive volume {volume:e}"
            )));
        }
        cell.volume = volume;
        cell.centroid = (moment / volume).to_array();
    }

    grid.geometry_computed = true;
    Ok(grid)
}

struct Triangle {
    /// Half the cross product of two edges: normal scaled by area.
    area_vector: DVec3,
    centroid: DVec3,
}

impl Triangle {
    fn new(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self {
            area_vector: 0.5 * (b - a).cross(c - a),
            centroid: (a + b + c) / 3.0,
        }
    }
}
