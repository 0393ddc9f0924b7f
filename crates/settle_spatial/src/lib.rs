//! Chip and netlist data model for the settle placement tool.
//!
//! This crate holds the spatial half of the placer: the [`Graph`] of nets
//! and blocks, the [`Chip`] grid with its block-location inverse map and
//! cost accounting, and the problem-file parser. The annealer in
//! `settle_place` mutates a chip in place through [`Chip::set_loc_block`]
//! and queries swap deltas through [`Chip::calc_swap_cost_delta`].
//!
//! The per-net cost is the half-perimeter of the net's bounding box with
//! the vertical span doubled, modeling cell rows that come in pairs with a
//! routing channel between them.

#![warn(missing_docs)]

pub mod chip;
pub mod graph;
pub mod ids;
pub mod problem;

pub use chip::{Chip, Coord};
pub use graph::Graph;
pub use ids::{BlockId, NetId};
pub use problem::ProblemError;
