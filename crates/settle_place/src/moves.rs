//! Swap-move selection with an adaptive range window.
//!
//! Move selection is two-stage: pick a random placed block, then pick a
//! partner slot either uniformly over the whole grid or from an
//! axis-aligned square window centered on the block. The partner slot may
//! be empty (the swap is then a move) but is never the block's own slot.

use rand::Rng;
use settle_spatial::{BlockId, Chip, Coord};

/// Picks a pair of distinct slots to swap.
///
/// The first slot always holds a block; the second is drawn from the range
/// window of side `rw_dim` around it, or from the full grid when the window
/// covers the larger grid dimension (or degenerates to a single cell).
pub fn pick_locs_to_swap(rng: &mut impl Rng, chip: &Chip, rw_dim: u32) -> (Coord, Coord) {
    let nx = chip.dim_x();
    let ny = chip.dim_y();

    let coord_a = loop {
        let b = BlockId::from_raw(rng.gen_range(0..chip.num_blocks() as u32));
        if let Some(loc) = chip.block_loc(b) {
            break loc;
        }
    };

    let rw = rw_dim as usize;
    let full_grid = rw >= nx.max(ny) || rw.min(nx) * rw.min(ny) <= 1;
    loop {
        let coord_b = if full_grid {
            (rng.gen_range(0..nx), rng.gen_range(0..ny))
        } else {
            pick_coord_in_window(rng, coord_a, rw_dim, nx, ny)
        };
        if coord_b != coord_a {
            return (coord_a, coord_b);
        }
    }
}

/// Picks a slot from the square window of side `rw_dim` centered at `center`.
///
/// A window overlapping a grid edge is translated back inside, never
/// cropped, so it always spans `min(rw_dim, nx) × min(rw_dim, ny)` slots.
pub fn pick_coord_in_window(
    rng: &mut impl Rng,
    center: Coord,
    rw_dim: u32,
    nx: usize,
    ny: usize,
) -> Coord {
    let rw = rw_dim as usize;
    let wx = rw.min(nx);
    let wy = rw.min(ny);
    let half = rw / 2;
    let x0 = center.0.saturating_sub(half).min(nx - wx);
    let y0 = center.1.saturating_sub(half).min(ny - wy);
    (x0 + rng.gen_range(0..wx), y0 + rng.gen_range(0..wy))
}
