//! The grid and its occupancy index.
//!
//! See [`Board`] for placement, movement and soft-capture semantics.

pub mod grid;

pub use grid::Board;
