use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::discretization::mesh::Grid;
use crate::error::{BoundaryError, GridError};

/// Side of a logically Cartesian domain. The third axis points downwards, so
/// `Top` is the minimum-depth side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoundarySide {
    West,
    East,
    South,
    North,
    Top,
    Bottom,
}

impl BoundarySide {
    pub const ALL: [BoundarySide; 6] = [
        BoundarySide::West,
        BoundarySide::East,
        BoundarySide::South,
        BoundarySide::North,
        BoundarySide::Top,
        BoundarySide::Bottom,
    ];

    /// Face-selection predicate for this side.
    pub fn selects(&self, grid: &Grid, face: usize) -> bool {
        let f = &grid.faces[face];
        f.neighbor_cell_ids.1.is_none() && f.tag == Some(*self)
    }

    /// All faces on this side, in face-id order.
    pub fn faces(&self, grid: &Grid) -> Vec<usize> {
        (0..grid.num_faces())
            .filter(|&f| self.selects(grid, f))
            .collect()
    }
}

impl fmt::Display for BoundarySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundarySide::West => "WEST",
            BoundarySide::East => "EAST",
            BoundarySide::South => "SOUTH",
            BoundarySide::North => "NORTH",
            BoundarySide::Top => "TOP",
            BoundarySide::Bottom => "BOTTOM",
        };
        f.write_str(name)
    }
}

impl FromStr for BoundarySide {
    type Err = BoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WEST" | "LEFT" | "XMIN" => Ok(BoundarySide::West),
            "EAST" | "RIGHT" | "XMAX" => Ok(BoundarySide::East),
            "SOUTH" | "FRONT" | "YMIN" => Ok(BoundarySide::South),
            "NORTH" | "BACK" | "YMAX" => Ok(BoundarySide::North),
            "TOP" | "UPPER" | "ZMIN" => Ok(BoundarySide::Top),
            "BOTTOM" | "LOWER" | "ZMAX" => Ok(BoundarySide::Bottom),
            _ => Err(BoundaryError::UnknownSide(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BcKind {
    Pressure,
    Flux,
}

/// Condition imposed on a single boundary face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryCondition {
    /// Fixed face pressure.
    Pressure(f64),
    /// Volumetric rate through the face, positive into the domain.
    Flux(f64),
}

impl BoundaryCondition {
    pub fn new(kind: BcKind, value: f64) -> Self {
        match kind {
            BcKind::Pressure => BoundaryCondition::Pressure(value),
            BcKind::Flux => BoundaryCondition::Flux(value),
        }
    }

    pub fn kind(&self) -> BcKind {
        match self {
            BoundaryCondition::Pressure(_) => BcKind::Pressure,
            BoundaryCondition::Flux(_) => BcKind::Flux,
        }
    }
}

/// Boundary conditions keyed by face. Each face is constrained at most once.
#[derive(Clone, Debug, Default)]
pub struct BoundaryConditions {
    conditions: BTreeMap<usize, BoundaryCondition>,
}

impl BoundaryConditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain `faces` with the same value. Nothing is added unless every
    /// face is a free boundary face.
    pub fn add_faces(
        &mut self,
        grid: &Grid,
        faces: &[usize],
        kind: BcKind,
        value: f64,
    ) -> Result<(), BoundaryError> {
        let values = vec![value; faces.len()];
        self.add_faces_with(grid, faces, kind, &values)
    }

    /// Constrain `faces` with one value per face.
    pub fn add_faces_with(
        &mut self,
        grid: &Grid,
        faces: &[usize],
        kind: BcKind,
        values: &[f64],
    ) -> Result<(), BoundaryError> {
        if faces.len() != values.len() {
            return Err(BoundaryError::ValueCountMismatch {
                expected: faces.len(),
                given: values.len(),
            });
        }

        let mut pending = BTreeSet::new();
        for (&face, &value) in faces.iter().zip(values) {
            if face >= grid.num_faces() {
                return Err(BoundaryError::FaceOutOfRange {
                    face,
                    num_faces: grid.num_faces(),
                });
            }
            if !grid.is_boundary_face(face) {
                return Err(BoundaryError::InteriorFace(face));
            }
            if self.conditions.contains_key(&face) || !pending.insert(face) {
                return Err(BoundaryError::DuplicateConstraint(face));
            }
            if !value.is_finite() {
                return Err(BoundaryError::InvalidValue { face, value });
            }
        }

        for (&face, &value) in faces.iter().zip(values) {
            self.conditions
                .insert(face, BoundaryCondition::new(kind, value));
        }
        Ok(())
    }

    /// Fix the pressure on every face of a side.
    pub fn add_boundary_pressure(
        &mut self,
        grid: &Grid,
        side: BoundarySide,
        pressure: f64,
    ) -> Result<(), BoundaryError> {
        self.add_faces(grid, &side.faces(grid), BcKind::Pressure, pressure)
    }

    /// Inject `total_rate` through a side, split over its faces by area.
    pub fn add_boundary_flux(
        &mut self,
        grid: &Grid,
        side: BoundarySide,
        total_rate: f64,
    ) -> Result<(), crate::error::Error> {
        if !grid.has_geometry() {
            return Err(GridError::MissingGeometry.into());
        }
        let faces = side.faces(grid);
        let total_area: f64 = faces.iter().map(|&f| grid.faces[f].area).sum();
        let rates: Vec<f64> = faces
            .iter()
            .map(|&f| total_rate * grid.faces[f].area / total_area)
            .collect();
        self.add_faces_with(grid, &faces, BcKind::Flux, &rates)?;
        Ok(())
    }

    pub fn get(&self, face: usize) -> Option<&BoundaryCondition> {
        self.conditions.get(&face)
    }

    /// Constraints in face-id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BoundaryCondition)> {
        self.conditions.iter().map(|(f, c)| (*f, c))
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn has_pressure(&self) -> bool {
        self.conditions
            .values()
            .any(|c| matches!(c, BoundaryCondition::Pressure(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::generator::cartesian_grid;
    use crate::discretization::geometry::compute_geometry;

    #[test]
    fn parse_sides() {
        assert_eq!("TOP".parse::<BoundarySide>(), Ok(BoundarySide::Top));
        assert_eq!("bottom".parse::<BoundarySide>(), Ok(BoundarySide::Bottom));
        assert_eq!(
            "up".parse::<BoundarySide>(),
            Err(BoundaryError::UnknownSide("up".into()))
        );
        assert_eq!(BoundarySide::North.to_string(), "NORTH");
    }

    #[test]
    fn side_selects_boundary_faces_only() {
        let g = cartesian_grid([2, 3, 4], [1.0, 1.0, 1.0]).unwrap();
        assert_eq!(BoundarySide::Top.faces(&g).len(), 6);
        assert_eq!(BoundarySide::West.faces(&g).len(), 12);
        let total: usize = BoundarySide::ALL.iter().map(|s| s.faces(&g).len()).sum();
        assert_eq!(total, g.boundary_faces().count());
    }

    #[test]
    fn rejects_interior_and_duplicate_faces() {
        let g = cartesian_grid([2, 1, 1], [1.0, 1.0, 1.0]).unwrap();
        let mut bc = BoundaryConditions::new();
        let interior = g.interior_faces().next().unwrap();
        assert_eq!(
            bc.add_faces(&g, &[0, interior], BcKind::Pressure, 1.0),
            Err(BoundaryError::InteriorFace(interior))
        );
        assert!(bc.is_empty(), "failed call must not add anything");

        bc.add_boundary_pressure(&g, BoundarySide::West, 1.0).unwrap();
        let west = BoundarySide::West.faces(&g)[0];
        assert_eq!(
            bc.add_faces(&g, &[west], BcKind::Flux, 2.0),
            Err(BoundaryError::DuplicateConstraint(west))
        );
        let east = BoundarySide::East.faces(&g)[0];
        assert_eq!(
            bc.add_faces(&g, &[east, east], BcKind::Flux, 2.0),
            Err(BoundaryError::DuplicateConstraint(east))
        );
        assert!(matches!(
            bc.add_faces(&g, &[10_000], BcKind::Flux, 2.0),
            Err(BoundaryError::FaceOutOfRange { face: 10_000, .. })
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let g = compute_geometry(cartesian_grid([2, 2, 1], [1.0, 1.0, 1.0]).unwrap()).unwrap();
        let mut bc = BoundaryConditions::new();
        let west = BoundarySide::West.faces(&g);

        assert!(matches!(
            bc.add_boundary_pressure(&g, BoundarySide::West, f64::NAN),
            Err(BoundaryError::InvalidValue { face, value }) if face == west[0] && value.is_nan()
        ));
        assert_eq!(
            bc.add_faces_with(&g, &west, BcKind::Pressure, &[1.0, f64::INFINITY]),
            Err(BoundaryError::InvalidValue {
                face: west[1],
                value: f64::INFINITY
            })
        );
        assert!(matches!(
            bc.add_boundary_flux(&g, BoundarySide::East, f64::NEG_INFINITY),
            Err(crate::error::Error::Boundary(BoundaryError::InvalidValue { .. }))
        ));
        assert!(bc.is_empty());

        bc.add_boundary_pressure(&g, BoundarySide::West, 1.0).unwrap();
        assert_eq!(bc.len(), 2);
    }

    #[test]
    fn iterates_in_face_order() {
        let g = cartesian_grid([2, 2, 2], [1.0, 1.0, 1.0]).unwrap();
        let mut bc = BoundaryConditions::new();
        bc.add_boundary_pressure(&g, BoundarySide::Bottom, 2.0).unwrap();
        bc.add_boundary_pressure(&g, BoundarySide::West, 1.0).unwrap();
        let faces: Vec<usize> = bc.iter().map(|(f, _)| f).collect();
        let mut sorted = faces.clone();
        sorted.sort_unstable();
        assert_eq!(faces, sorted);
        assert!(bc.has_pressure());
    }

    #[test]
    fn flux_side_is_split_by_area() {
        let g = compute_geometry(cartesian_grid([2, 2, 1], [2.0, 1.0, 1.0]).unwrap()).unwrap();
        let mut bc = BoundaryConditions::new();
        bc.add_boundary_flux(&g, BoundarySide::Top, 4.0).unwrap();
        assert_eq!(bc.len(), 4);
        let total: f64 = bc
            .iter()
            .map(|(_, c)| match c {
                BoundaryCondition::Flux(q) => *q,
                BoundaryCondition::Pressure(_) => 0.0,
            })
            .sum();
        assert!((total - 4.0).abs() < 1e-12);
    }
}
