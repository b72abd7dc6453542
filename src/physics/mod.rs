pub mod bc;
pub mod fluid;
pub mod rock;
pub mod source;

pub use bc::{BcKind, BoundaryCondition, BoundaryConditions, BoundarySide};
pub use fluid::{Fluid, make_single_fluid};
pub use rock::{Permeability, Rock, set_permeability};
pub use source::SourceTerms;
