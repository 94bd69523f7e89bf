//!
//! ring_grid is a nearest-neighbor index over 2D points that is not based on a tree
//! (which is recursive) but on a simple flat structure: a bounded grid of cells.
//!
//! Points are bucketed into cells of user defined width covering the coordinate
//! universe `[0, bound]` on both axes (coordinates outside it are clamped to the
//! boundary cells). A nearest-neighbor query walks square rings of cells outward
//! from the query's home cell, and scans one extra ring past the first hit to
//! catch points just across a cell boundary that are geometrically nearer.
//!

pub mod cell;
pub mod grid;
pub mod point;

pub use grid::{GridIndex, PointHandle};
pub use point::SpatialPoint;
