//! # Spatial Partitioning
//!
//! Uniform-grid spatial hash used as the collision broad phase. One grid per
//! collision category.

mod grid;

pub use grid::{Cell, CellRange, SpatialHashGrid};
