pub mod generator;
pub mod geometry;
pub mod mesh;
pub mod transmissibility;
