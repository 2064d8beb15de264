mod network;
mod representation;

pub use network::AngleNetwork;
pub use representation::{AngleSolver, Bend, OrthogonalRepresentation, Orthogonalize};
