use super::mesh::{Cell, Face, Grid, Node};
use crate::error::GridError;
use crate::physics::bc::BoundarySide;
use std::f64::consts::PI;

/// Build a regular Cartesian grid of `cells[0] x cells[1] x cells[2]` cells
/// covering `[0, extents[0]] x [0, extents[1]] x [0, extents[2]]`.
///
/// The third axis points downwards, so layer `k = 0` touches the top side.
pub fn cartesian_grid(cells: [usize; 3], extents: [f64; 3]) -> Result<Grid, GridError> {
    for axis in 0..3 {
        if cells[axis] == 0 {
            return Err(GridError::InvalidDimension(format!(
                "cell count along axis {axis} must be positive"
            )));
        }
        if !(extents[axis].is_finite() && extents[axis] > 0.0) {
            return Err(GridError::InvalidDimension(format!(
                "extent along axis {axis} must be positive, got {}",
                extents[axis]
            )));
        }
    }

    let coords = |axis: usize| -> Vec<f64> {
        let h = extents[axis] / cells[axis] as f64;
        (0..=cells[axis]).map(|i| i as f64 * h).collect()
    };
    tensor_grid(&coords(0), &coords(1), &coords(2))
}

/// Build a tensor-product grid from strictly increasing node coordinates
/// along each axis.
pub fn tensor_grid(xs: &[f64], ys: &[f64], zs: &[f64]) -> Result<Grid, GridError> {
    for (axis, c) in [xs, ys, zs].iter().enumerate() {
        if c.len() < 2 {
            return Err(GridError::InvalidDimension(format!(
                "axis {axis} needs at least two node coordinates, got {}",
                c.len()
            )));
        }
        if c.iter().any(|v| !v.is_finite()) || c.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GridError::InvalidDimension(format!(
                "node coordinates along axis {axis} must be finite and strictly increasing"
            )));
        }
    }

    let (nx, ny, nz) = (xs.len() - 1, ys.len() - 1, zs.len() - 1);
    let lattice = Lattice { nx, ny, nz };

    let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for &z in zs {
        for &y in ys {
            for &x in xs {
                nodes.push(Node {
                    position: [x, y, z],
                });
            }
        }
    }

    let mut faces = Vec::with_capacity(lattice.num_faces());

    // x-faces, base orientation +x
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..=nx {
                let quad = [
                    lattice.node(i, j, k),
                    lattice.node(i, j + 1, k),
                    lattice.node(i, j + 1, k + 1),
                    lattice.node(i, j, k + 1),
                ];
                let lo = (i > 0).then(|| lattice.cell(i - 1, j, k));
                let hi = (i < nx).then(|| lattice.cell(i, j, k));
                faces.push(oriented_face(quad, lo, hi, BoundarySide::West, BoundarySide::East));
            }
        }
    }

    // y-faces, base orientation +y
    for k in 0..nz {
        for j in 0..=ny {
            for i in 0..nx {
                let quad = [
                    lattice.node(i, j, k),
                    lattice.node(i, j, k + 1),
                    lattice.node(i + 1, j, k + 1),
                    lattice.node(i + 1, j, k),
                ];
                let lo = (j > 0).then(|| lattice.cell(i, j - 1, k));
                let hi = (j < ny).then(|| lattice.cell(i, j, k));
                faces.push(oriented_face(quad, lo, hi, BoundarySide::South, BoundarySide::North));
            }
        }
    }

    // z-faces, base orientation +z (downwards)
    for k in 0..=nz {
        for j in 0..ny {
            for i in 0..nx {
                let quad = [
                    lattice.node(i, j, k),
                    lattice.node(i + 1, j, k),
                    lattice.node(i + 1, j + 1, k),
                    lattice.node(i, j + 1, k),
                ];
                let lo = (k > 0).then(|| lattice.cell(i, j, k - 1));
                let hi = (k < nz).then(|| lattice.cell(i, j, k));
                faces.push(oriented_face(quad, lo, hi, BoundarySide::Top, BoundarySide::Bottom));
            }
        }
    }

    let mut cells = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                cells.push(Cell {
                    index_map: lattice.cell(i, j, k),
                    face_ids: vec![
                        lattice.x_face(i, j, k),
                        lattice.x_face(i + 1, j, k),
                        lattice.y_face(i, j, k),
                        lattice.y_face(i, j + 1, k),
                        lattice.z_face(i, j, k),
                        lattice.z_face(i, j, k + 1),
                    ],
                    volume: 0.0,
                    centroid: [0.0; 3],
                });
            }
        }
    }

    Ok(Grid {
        cells,
        faces,
        nodes,
        cartesian_dims: [nx, ny, nz],
        physical_dims: [xs[nx] - xs[0], ys[ny] - ys[0], zs[nz] - zs[0]],
        geometry_computed: false,
    })
}

/// Perturb the node coordinates of a grid in the horizontal plane.
///
/// The displacement is a smooth sinusoidal field scaled by `amplitude` (a
/// fraction of the domain extent) that vanishes on the lateral boundaries and
/// grows with depth, so vertical faces become non-planar while the outer box
/// of the domain is preserved. Any previously computed geometry is discarded.
pub fn twist_grid(mut grid: Grid, amplitude: f64) -> Result<Grid, GridError> {
    if !amplitude.is_finite() {
        return Err(GridError::InvalidDimension(format!(
            "twist amplitude must be finite, got {amplitude}"
        )));
    }

    let mut lo = [f64::INFINITY; 3];
    let mut hi = [f64::NEG_INFINITY; 3];
    for node in &grid.nodes {
        for axis in 0..3 {
            lo[axis] = lo[axis].min(node.position[axis]);
            hi[axis] = hi[axis].max(node.position[axis]);
        }
    }
    let len: Vec<f64> = (0..3).map(|a| hi[a] - lo[a]).collect();

    for node in &mut grid.nodes {
        let [x, y, z] = node.position;
        let u = (x - lo[0]) / len[0];
        let v = (y - lo[1]) / len[1];
        let depth = if len[2] > 0.0 { (z - lo[2]) / len[2] } else { 0.0 };
        let scale = amplitude * (1.0 + depth);

        node.position[0] = x + scale * len[0] * (PI * u).sin() * (3.0 * PI * (v - 0.5)).sin();
        node.position[1] = y - scale * len[1] * (3.0 * PI * (u - 0.5)).sin() * (PI * v).sin();
    }

    for cell in &mut grid.cells {
        cell.volume = 0.0;
        cell.centroid = [0.0; 3];
    }
    for face in &mut grid.faces {
        face.area = 0.0;
        face.normal = [0.0; 3];
        face.centroid = [0.0; 3];
    }
    grid.geometry_computed = false;
    Ok(grid)
}

/// Orient a lattice face: interior faces and the high-side boundary keep the
/// base orientation, the low-side boundary is flipped so its normal points out.
fn oriented_face(
    quad: [usize; 4],
    lo: Option<usize>,
    hi: Option<usize>,
    lo_side: BoundarySide,
    hi_side: BoundarySide,
) -> Face {
    let (node_ids, neighbor_cell_ids, tag) = match (lo, hi) {
        (Some(a), Some(b)) => (quad.to_vec(), (a, Some(b)), None),
        (Some(a), None) => (quad.to_vec(), (a, None), Some(hi_side)),
        (None, Some(b)) => (quad.iter().rev().copied().collect(), (b, None), Some(lo_side)),
        (None, None) => unreachable!("lattice faces always touch at least one cell"),
    };
    Face {
        node_ids,
        neighbor_cell_ids,
        tag,
        area: 0.0,
        normal: [0.0; 3],
        centroid: [0.0; 3],
    }
}

struct Lattice {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl Lattice {
    fn node(&self, i: usize, j: usize, k: usize) -> usize {
        i + (self.nx + 1) * (j + (self.ny + 1) * k)
    }

    fn cell(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.nx * (j + self.ny * k)
    }

    fn num_x_faces(&self) -> usize {
        (self.nx + 1) * self.ny * self.nz
    }

    fn num_y_faces(&self) -> usize {
        self.nx * (self.ny + 1) * self.nz
    }

    fn num_faces(&self) -> usize {
        self.num_x_faces() + self.num_y_faces() + self.nx * self.ny * (self.nz + 1)
    }

    fn x_face(&self, i: usize, j: usize, k: usize) -> usize {
        i + (self.nx + 1) * (j + self.ny * k)
    }

    fn y_face(&self, i: usize, j: usize, k: usize) -> usize {
        self.num_x_faces() + i + self.nx * (j + (self.ny + 1) * k)
    }

    fn z_face(&self, i: usize, j: usize, k: usize) -> usize {
        self.num_x_faces() + self.num_y_faces() + i + self.nx * (j + self.ny * k)
    }
}
