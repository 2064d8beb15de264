pub mod distance_2d;
pub mod intersect_2d;

/// 2D point type used for input drawings.
pub type Point2 = nalgebra::Point2<f64>;

/// Integer grid point produced by compaction.
pub type GridPoint = nalgebra::Point2<i64>;

/// Integer grid offset.
pub type GridVector = nalgebra::Vector2<i64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-9;
