use crate::physics::bc::BoundarySide;

/// The complete computational grid.
#[derive(Debug, Clone)]
pub struct Grid {
    pub cells: Vec<Cell>,
    pub faces: Vec<Face>,
    pub nodes: Vec<Node>,
    /// Number of cells along each axis of the underlying lattice.
    pub cartesian_dims: [usize; 3],
    /// Physical extent of the domain along each axis.
    pub physical_dims: [f64; 3],
    pub(crate) geometry_computed: bool,
}

/// A single control volume.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Linear lattice index `i + nx * (j + ny * k)`.
    pub index_map: usize,
    pub face_ids: Vec<usize>,
    pub volume: f64,
    pub centroid: [f64; 3],
}

/// An interface between two cells, or between a cell and the outside.
#[derive(Debug, Clone)]
pub struct Face {
    /// Node ids ordered so the right-hand rule gives `normal`.
    pub node_ids: Vec<usize>,
    /// Tuple of (cell1_id, optional cell2_id). `None` indicates a boundary face.
    /// The normal points from the first cell towards the second one, or out of
    /// the domain on boundary faces.
    pub neighbor_cell_ids: (usize, Option<usize>),
    /// Side of the domain a boundary face lies on. `None` for interior faces.
    pub tag: Option<BoundarySide>,
    pub area: f64,
    pub normal: [f64; 3],
    pub centroid: [f64; 3],
}

#[derive(Debug, Clone)]
pub struct Node {
    pub position: [f64; 3],
}

impl Grid {
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// True once [`compute_geometry`](super::geometry::compute_geometry) has run.
    pub fn has_geometry(&self) -> bool {
        self.geometry_computed
    }

    /// Lattice `(i, j, k)` of a cell.
    pub fn ijk(&self, cell: usize) -> [usize; 3] {
        let [nx, ny, _] = self.cartesian_dims;
        let idx = self.cells[cell].index_map;
        [idx % nx, (idx / nx) % ny, idx / (nx * ny)]
    }

    pub fn is_boundary_face(&self, face: usize) -> bool {
        self.faces[face].neighbor_cell_ids.1.is_none()
    }

    pub fn boundary_faces(&self) -> impl Iterator<Item = usize> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.neighbor_cell_ids.1.is_none())
            .map(|(i, _)| i)
    }

    pub fn interior_faces(&self) -> impl Iterator<Item = usize> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.neighbor_cell_ids.1.is_some())
            .map(|(i, _)| i)
    }

    pub fn total_volume(&self) -> f64 {
        self.cells.iter().map(|c| c.volume).sum()
    }
}
