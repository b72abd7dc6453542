use super::rock::check_positive;
use crate::error::PropertyError;

/// Single-phase fluid with constant properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fluid {
    viscosity: f64,
    density: f64,
}

impl Fluid {
    pub fn new(viscosity: f64, density: f64) -> Result<Self, PropertyError> {
        check_positive("viscosity", viscosity)?;
        check_positive("density", density)?;
        Ok(Self { viscosity, density })
    }

    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Inverse viscosity.
    pub fn mobility(&self) -> f64 {
        1.0 / self.viscosity
    }
}

pub fn make_single_fluid(viscosity: f64, density: f64) -> Result<Fluid, PropertyError> {
    Fluid::new(viscosity, density)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_properties() {
        let f = make_single_fluid(1e-3, 1014.0).unwrap();
        assert_eq!(f.mobility(), 1e3);
        assert!(make_single_fluid(0.0, 1.0).is_err());
        assert!(make_single_fluid(1.0, f64::NAN).is_err());
    }
}
