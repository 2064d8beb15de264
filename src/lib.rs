//! Orthogonal graph drawing rendered as box-drawing text.
//!
//! A graph is planarized, given an orthogonal shape by a min-cost flow,
//! cut into rectangular faces, compacted onto an integer grid and finally
//! rasterized. [`draw`] runs all stages on every connected component.

pub mod config;
pub mod error;
pub mod flow;
pub mod graph;
pub mod math;
pub mod operations;
pub mod pipeline;
pub mod render;
pub mod topology;

pub use config::DrawParams;
pub use error::{OrthodrawError, Result};
pub use graph::{Component, Graph};
pub use pipeline::{draw, draw_component, draw_components, Drawing};
