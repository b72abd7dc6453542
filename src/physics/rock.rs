use crate::discretization::mesh::Grid;
use crate::error::PropertyError;
use glam::{DMat3, DVec3};

/// Per-cell absolute permeability.
#[derive(Debug, Clone, PartialEq)]
pub enum Permeability {
    /// One value per cell.
    Isotropic(Vec<f64>),
    /// `[kxx, kyy, kzz]` per cell.
    Diagonal(Vec<[f64; 3]>),
    /// Symmetric tensor `[kxx, kxy, kxz, kyy, kyz, kzz]` per cell.
    Tensor(Vec<[f64; 6]>),
}

impl Permeability {
    pub fn len(&self) -> usize {
        match self {
            Permeability::Isotropic(k) => k.len(),
            Permeability::Diagonal(k) => k.len(),
            Permeability::Tensor(k) => k.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rock properties attached to every cell of a grid.
#[derive(Debug, Clone)]
pub struct Rock {
    permeability: Permeability,
    porosity: Vec<f64>,
}

impl Rock {
    /// Homogeneous isotropic rock.
    pub fn uniform(grid: &Grid, permeability: f64, porosity: f64) -> Result<Self, PropertyError> {
        let n = grid.num_cells();
        Self::new(
            grid,
            Permeability::Isotropic(vec![permeability; n]),
            vec![porosity; n],
        )
    }

    pub fn new(
        grid: &Grid,
        permeability: Permeability,
        porosity: Vec<f64>,
    ) -> Result<Self, PropertyError> {
        let n = grid.num_cells();
        check_len("permeability", n, permeability.len())?;
        check_len("porosity", n, porosity.len())?;

        match &permeability {
            Permeability::Isotropic(k) => {
                for &v in k {
                    check_positive("permeability", v)?;
                }
            }
            Permeability::Diagonal(k) => {
                for &v in k.iter().flatten() {
                    check_positive("permeability", v)?;
                }
            }
            Permeability::Tensor(k) => {
                for (cell, t) in k.iter().enumerate() {
                    if !is_positive_definite(t) {
                        return Err(PropertyError::InvalidProperty {
                            name: "permeability",
                            reason: format!("tensor of cell {cell} is not positive definite"),
                        });
                    }
                }
            }
        }

        for &phi in &porosity {
            if !(phi.is_finite() && phi > 0.0 && phi <= 1.0) {
                return Err(PropertyError::InvalidProperty {
                    name: "porosity",
                    reason: format!("{phi} is outside (0, 1]"),
                });
            }
        }

        Ok(Self {
            permeability,
            porosity,
        })
    }

    pub fn permeability(&self) -> &Permeability {
        &self.permeability
    }

    pub fn porosity(&self) -> &[f64] {
        &self.porosity
    }

    /// Full permeability tensor of a cell.
    pub fn tensor(&self, cell: usize) -> DMat3 {
        match &self.permeability {
            Permeability::Isotropic(k) => DMat3::from_diagonal(DVec3::splat(k[cell])),
            Permeability::Diagonal(k) => DMat3::from_diagonal(DVec3::from(k[cell])),
            Permeability::Tensor(k) => {
                let [xx, xy, xz, yy, yz, zz] = k[cell];
                DMat3::from_cols(
                    DVec3::new(xx, xy, xz),
                    DVec3::new(xy, yy, yz),
                    DVec3::new(xz, yz, zz),
                )
            }
        }
    }

    pub fn pore_volumes(&self, grid: &Grid) -> Vec<f64> {
        grid.cells
            .iter()
            .zip(&self.porosity)
            .map(|(c, phi)| c.volume * phi)
            .collect()
    }
}

/// Attach permeability to a grid with unit porosity.
pub fn set_permeability(grid: &Grid, values: Permeability) -> Result<Rock, PropertyError> {
    Rock::new(grid, values, vec![1.0; grid.num_cells()])
}

fn check_len(name: &'static str, expected: usize, actual: usize) -> Result<(), PropertyError> {
    if expected != actual {
        return Err(PropertyError::LengthMismatch {
            name,
            expected,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), PropertyError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(PropertyError::InvalidProperty {
            name,
            reason: format!("{value} is not positive"),
        });
    }
    Ok(())
}

/// Sylvester's criterion on the leading principal minors.
fn is_positive_definite(t: &[f64; 6]) -> bool {
    let [xx, xy, xz, yy, yz, zz] = *t;
    if t.iter().any(|v| !v.is_finite()) {
        return false;
    }
    let m2 = xx * yy - xy * xy;
    let m3 = xx * (yy * zz - yz * yz) - xy * (xy * zz - yz * xz) + xz * (xy * yz - yy * xz);
    xx > 0.0 && m2 > 0.0 && m3 > 0.0
}
