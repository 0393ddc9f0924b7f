//! Chip spatial representation of blocks and nets.
//!
//! A chip holds a rectangular grid of cell slots for blocks to be placed
//! onto, the inverse block-to-location map, and the cached placement cost.
//! It also performs the two canonical cost operations: full recompute and
//! the cost delta of a candidate swap.

use crate::graph::Graph;
use crate::ids::{BlockId, NetId};
use settle_diagnostics::DiagnosticSink;

/// A slot coordinate on the chip grid, `(x, y)` with `x` the column.
pub type Coord = (usize, usize);

/// The chip: grid, block locations, connectivity, and cost accounting.
///
/// Two invariants are maintained at every quiescent boundary:
/// `grid[x][y] == Some(b)` iff `block_locs[b] == Some((x, y))`, and no two
/// placed blocks share a slot. [`set_loc_block`](Self::set_loc_block)
/// deliberately updates only one direction for the overwritten block, so
/// swap implementations must write both slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chip {
    graph: Graph,
    initialized: bool,
    cost: i64,
    nx: usize,
    ny: usize,
    grid: Vec<Vec<Option<BlockId>>>,
    block_locs: Vec<Option<Coord>>,
}

impl Chip {
    /// Creates a chip of `nx × ny` slots over the given connectivity graph.
    ///
    /// The placement starts empty and the cached cost invalid.
    pub fn new(graph: Graph, nx: usize, ny: usize) -> Self {
        let n_blocks = graph.num_blocks();
        Self {
            graph,
            initialized: true,
            cost: -1,
            nx,
            ny,
            grid: vec![vec![None; ny]; nx],
            block_locs: vec![None; n_blocks],
        }
    }

    /// Returns the grid width (cell count in the x direction).
    pub fn dim_x(&self) -> usize {
        self.nx
    }

    /// Returns the grid height (cell count in the y direction).
    pub fn dim_y(&self) -> usize {
        self.ny
    }

    /// Returns the number of blocks in the problem.
    pub fn num_blocks(&self) -> usize {
        self.block_locs.len()
    }

    /// Returns the number of nets in the problem.
    pub fn num_nets(&self) -> usize {
        self.graph.num_nets()
    }

    /// Returns whether this chip was successfully initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the connectivity graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the block IDs associated with a net.
    pub fn net_block_ids(&self, net: NetId) -> &[BlockId] {
        self.graph.net_blocks(net)
    }

    /// Returns the current slot coordinates of every placed block on a net.
    pub fn net_coords(&self, net: NetId) -> Vec<Coord> {
        self.graph
            .net_blocks(net)
            .iter()
            .filter_map(|&b| self.block_locs[b.index()])
            .collect()
    }

    /// Clears all placements and invalidates the cached cost. Idempotent.
    pub fn init_empty_placements(&mut self) {
        for column in &mut self.grid {
            column.fill(None);
        }
        self.block_locs.fill(None);
        self.cost = -1;
    }

    /// Writes `block` into the slot at `loc`.
    ///
    /// For `Some(b)` the inverse map entry of `b` is updated as well. The
    /// inverse entry of any block previously in the slot is left alone; a
    /// swap must call this for both slots to restore the invariant.
    pub fn set_loc_block(&mut self, loc: Coord, block: Option<BlockId>) {
        self.grid[loc.0][loc.1] = block;
        if let Some(b) = block {
            self.block_locs[b.index()] = Some(loc);
        }
    }

    /// Returns the block occupying the slot at `(x, y)`, if any.
    pub fn block_id_at(&self, x: usize, y: usize) -> Option<BlockId> {
        self.grid[x][y]
    }

    /// Returns the slot coordinates of the given block, if placed.
    pub fn block_loc(&self, block: BlockId) -> Option<Coord> {
        self.block_locs[block.index()]
    }

    /// Exchanges the contents of two slots, keeping both maps consistent.
    pub fn swap_locs(&mut self, a: Coord, b: Coord) {
        let bid_a = self.grid[a.0][a.1];
        let bid_b = self.grid[b.0][b.1];
        self.set_loc_block(a, bid_b);
        self.set_loc_block(b, bid_a);
    }

    /// Calculates the cost of a single net.
    ///
    /// The per-net cost is the half-perimeter of the bounding box of the
    /// net's placed blocks, with the y span doubled to model paired rows
    /// separated by a routing channel. Nets with fewer than two placed
    /// blocks contribute 0.
    pub fn cost_of_net(&self, net: NetId) -> i64 {
        let mut min_x = usize::MAX;
        let mut max_x = 0;
        let mut min_y = usize::MAX;
        let mut max_y = 0;
        let mut placed = 0usize;
        for &b in self.graph.net_blocks(net) {
            if let Some((x, y)) = self.block_locs[b.index()] {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
                placed += 1;
            }
        }
        if placed < 2 {
            return 0;
        }
        (max_x - min_x) as i64 + 2 * (max_y - min_y) as i64
    }

    /// Computes the cost of the current placement from scratch.
    ///
    /// Does not update the cached cost; use [`set_cost`](Self::set_cost)
    /// for that. Returns −1 and emits a warning on an uninitialized chip.
    pub fn calc_cost(&self, sink: &DiagnosticSink) -> i64 {
        if !self.initialized || self.block_locs.is_empty() {
            sink.warn("calc_cost called before block locations were initialized");
            return -1;
        }
        (0..self.graph.num_nets())
            .map(|n| self.cost_of_net(NetId::from_raw(n as u32)))
            .sum()
    }

    /// Sets the cached cost to the specified value.
    pub fn set_cost(&mut self, cost: i64) {
        self.cost = cost;
    }

    /// Returns the cached cost without recalculating it (−1 if invalid).
    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// Adjusts the cached cost by a swap delta.
    ///
    /// Warns when the cache is invalid before the adjustment or becomes
    /// negative after it.
    pub fn add_cost_delta(&mut self, delta: i64, sink: &DiagnosticSink) {
        if self.cost < 0 {
            sink.warn("attempted to add a delta to an invalid cost cache");
        }
        self.cost += delta;
        if self.cost < 0 {
            sink.warn(format!("cost became negative ({}) after delta", self.cost));
        }
    }

    /// Computes the cost change of swapping the contents of two slots.
    ///
    /// Either slot may be empty, making the swap a move. The touched nets
    /// of both endpoints are deduplicated so a shared net is counted once.
    /// The chip is indistinguishable from the call site on return; the
    /// cached cost is not updated.
    pub fn calc_swap_cost_delta(&mut self, a: Coord, b: Coord, sink: &DiagnosticSink) -> i64 {
        if !self.initialized || self.block_locs.is_empty() {
            sink.warn("calc_swap_cost_delta called before block locations were initialized");
            return -1;
        }

        let bid_a = self.grid[a.0][a.1];
        let bid_b = self.grid[b.0][b.1];
        if bid_a.is_none() && bid_b.is_none() {
            return 0;
        }

        let mut touched: Vec<NetId> = Vec::new();
        for bid in [bid_a, bid_b].into_iter().flatten() {
            touched.extend_from_slice(self.graph.block_nets(bid));
        }
        touched.sort_unstable();
        touched.dedup();

        let cost_before: i64 = touched.iter().map(|&n| self.cost_of_net(n)).sum();
        self.swap_locs(a, b);
        let cost_after: i64 = touched.iter().map(|&n| self.cost_of_net(n)).sum();
        self.swap_locs(a, b);

        cost_after - cost_before
    }

    /// Replaces the grid with the provided matrix.
    ///
    /// Unless `skip_validation` is set, the matrix must match the chip
    /// dimensions, every block ID must be in range, and no ID may occur
    /// twice; violations warn and leave the chip untouched. On success the
    /// inverse map is rebuilt and the cost recomputed and cached.
    pub fn set_grid(
        &mut self,
        grid: Vec<Vec<Option<BlockId>>>,
        skip_validation: bool,
        sink: &DiagnosticSink,
    ) {
        if !skip_validation {
            if grid.len() != self.nx {
                sink.warn("provided grid has an x dimension that differs from the chip");
                return;
            }
            let mut seen = vec![false; self.num_blocks()];
            for column in &grid {
                if column.len() != self.ny {
                    sink.warn("provided grid has a y dimension that differs from the chip");
                    return;
                }
                for &cell in column {
                    let Some(b) = cell else { continue };
                    if b.index() >= self.num_blocks() {
                        sink.warn(format!(
                            "provided grid contains block {b} beyond the declared block count"
                        ));
                        return;
                    }
                    if seen[b.index()] {
                        sink.warn(format!("provided grid places block {b} more than once"));
                        return;
                    }
                    seen[b.index()] = true;
                }
            }
        }

        self.grid = grid;
        self.block_locs.fill(None);
        for x in 0..self.nx.min(self.grid.len()) {
            for y in 0..self.ny.min(self.grid[x].len()) {
                if let Some(b) = self.grid[x][y] {
                    self.block_locs[b.index()] = Some((x, y));
                }
            }
        }
        let cost = self.calc_cost(sink);
        self.set_cost(cost);
    }
}

impl Default for Chip {
    /// An uninitialized chip; cost queries on it return −1 with a warning.
    fn default() -> Self {
        Self {
            graph: Graph::new(0, 0),
            initialized: false,
            cost: -1,
            nx: 0,
            ny: 0,
            grid: Vec::new(),
            block_locs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(i: u32) -> BlockId {
        BlockId::from_raw(i)
    }

    fn nid(i: u32) -> NetId {
        NetId::from_raw(i)
    }

    /// The `mini_2` problem: 5 blocks, 2 nets, 4×4 grid.
    /// Net 0 connects {0,1,2,3}; net 1 connects {0,4}.
    fn mini_2() -> Chip {
        let mut g = Graph::new(5, 2);
        g.set_net(nid(0), &[bid(0), bid(1), bid(2), bid(3)]);
        g.set_net(nid(1), &[bid(0), bid(4)]);
        Chip::new(g, 4, 4)
    }

    /// Layout 1 from the hand-checked placement:
    /// 0→(0,1), 1→(1,1), 2→(2,1), 3→(3,1), 4→(0,2).
    fn place_layout_1(chip: &mut Chip) {
        chip.set_loc_block((0, 1), Some(bid(0)));
        chip.set_loc_block((1, 1), Some(bid(1)));
        chip.set_loc_block((2, 1), Some(bid(2)));
        chip.set_loc_block((3, 1), Some(bid(3)));
        chip.set_loc_block((0, 2), Some(bid(4)));
    }

    /// Layout 2: 0→(2,1), 1→(3,1), 2→(2,2), 3→(3,2), 4→(1,1).
    fn place_layout_2(chip: &mut Chip) {
        chip.init_empty_placements();
        chip.set_loc_block((2, 1), Some(bid(0)));
        chip.set_loc_block((3, 1), Some(bid(1)));
        chip.set_loc_block((2, 2), Some(bid(2)));
        chip.set_loc_block((3, 2), Some(bid(3)));
        chip.set_loc_block((1, 1), Some(bid(4)));
    }

    #[test]
    fn fresh_chip_has_invalid_cost() {
        let chip = mini_2();
        assert!(chip.is_initialized());
        assert_eq!(chip.cost(), -1);
        assert_eq!(chip.num_blocks(), 5);
        assert_eq!(chip.num_nets(), 2);
        assert_eq!(chip.dim_x(), 4);
        assert_eq!(chip.dim_y(), 4);
    }

    #[test]
    fn cost_layout_1() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_1(&mut chip);
        assert_eq!(chip.cost_of_net(nid(0)), 3);
        assert_eq!(chip.cost_of_net(nid(1)), 2);
        assert_eq!(chip.calc_cost(&sink), 5);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn cost_layout_2() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_2(&mut chip);
        assert_eq!(chip.cost_of_net(nid(0)), 3);
        assert_eq!(chip.cost_of_net(nid(1)), 1);
        assert_eq!(chip.calc_cost(&sink), 4);
    }

    #[test]
    fn swap_delta_same_net_blocks_is_zero() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_2(&mut chip);
        // Swapping blocks 2 and 3 leaves both net bounding boxes unchanged.
        assert_eq!(chip.calc_swap_cost_delta((2, 2), (3, 2), &sink), 0);
    }

    #[test]
    fn swap_delta_move_to_empty_slot() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_2(&mut chip);
        // Moving block 0 to the empty slot (1, 0) stretches both its nets.
        assert_eq!(chip.calc_swap_cost_delta((1, 0), (2, 1), &sink), 4);
    }

    #[test]
    fn swap_delta_two_occupied_slots() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_2(&mut chip);
        // Swapping blocks 0 and 4 widens net 0 by one column.
        assert_eq!(chip.calc_swap_cost_delta((1, 1), (2, 1), &sink), 1);
    }

    #[test]
    fn swap_delta_two_empty_slots_is_zero() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_2(&mut chip);
        assert_eq!(chip.calc_swap_cost_delta((0, 0), (0, 3), &sink), 0);
    }

    #[test]
    fn swap_delta_is_pure() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_2(&mut chip);
        chip.set_cost(chip.calc_cost(&sink));

        let before = chip.clone();
        chip.calc_swap_cost_delta((1, 1), (2, 1), &sink);
        chip.calc_swap_cost_delta((1, 0), (2, 1), &sink);
        chip.calc_swap_cost_delta((0, 0), (0, 3), &sink);
        assert_eq!(chip, before);
    }

    #[test]
    fn swap_delta_matches_full_recompute() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_2(&mut chip);

        let swaps = [
            ((2, 2), (3, 2)),
            ((1, 0), (2, 1)),
            ((1, 1), (2, 1)),
            ((3, 1), (0, 0)),
            ((2, 1), (3, 3)),
        ];
        for (a, b) in swaps {
            let cost_before = chip.calc_cost(&sink);
            let delta = chip.calc_swap_cost_delta(a, b, &sink);
            chip.swap_locs(a, b);
            let cost_after = chip.calc_cost(&sink);
            assert_eq!(delta, cost_after - cost_before, "swap {a:?} <-> {b:?}");
            chip.swap_locs(a, b);
        }
    }

    #[test]
    fn double_swap_is_identity() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_2(&mut chip);
        chip.set_cost(chip.calc_cost(&sink));

        let before = chip.clone();
        chip.swap_locs((1, 1), (2, 1));
        chip.swap_locs((1, 1), (2, 1));
        assert_eq!(chip, before);

        // Also through an empty slot (a move and its reverse).
        chip.swap_locs((0, 0), (2, 1));
        chip.swap_locs((0, 0), (2, 1));
        assert_eq!(chip, before);
    }

    #[test]
    fn cost_of_net_is_permutation_invariant() {
        let sink = DiagnosticSink::new();
        let mut g = Graph::new(4, 2);
        g.set_net(nid(0), &[bid(0), bid(1), bid(2), bid(3)]);
        g.set_net(nid(1), &[bid(3), bid(2), bid(1), bid(0)]);
        let mut chip = Chip::new(g, 4, 4);
        chip.set_loc_block((0, 1), Some(bid(0)));
        chip.set_loc_block((1, 3), Some(bid(1)));
        chip.set_loc_block((2, 0), Some(bid(2)));
        chip.set_loc_block((3, 2), Some(bid(3)));
        assert_eq!(chip.cost_of_net(nid(0)), chip.cost_of_net(nid(1)));
        assert_eq!(chip.calc_cost(&sink), 2 * chip.cost_of_net(nid(0)));
    }

    #[test]
    fn single_block_net_costs_zero() {
        let mut g = Graph::new(1, 1);
        g.set_net(nid(0), &[bid(0)]);
        let mut chip = Chip::new(g, 2, 2);
        chip.set_loc_block((1, 1), Some(bid(0)));
        assert_eq!(chip.cost_of_net(nid(0)), 0);
    }

    #[test]
    fn init_empty_placements_is_idempotent() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_1(&mut chip);
        chip.set_cost(chip.calc_cost(&sink));

        chip.init_empty_placements();
        let cleared = chip.clone();
        chip.init_empty_placements();
        assert_eq!(chip, cleared);
        assert_eq!(chip.cost(), -1);
        assert_eq!(chip.block_loc(bid(0)), None);
        assert_eq!(chip.block_id_at(0, 1), None);
    }

    #[test]
    fn set_loc_block_keeps_forward_map_only() {
        let mut chip = mini_2();
        chip.set_loc_block((0, 0), Some(bid(0)));
        // Overwrite the slot; block 0's inverse entry goes stale on purpose.
        chip.set_loc_block((0, 0), Some(bid(1)));
        assert_eq!(chip.block_id_at(0, 0), Some(bid(1)));
        assert_eq!(chip.block_loc(bid(0)), Some((0, 0)));
    }

    #[test]
    fn uninitialized_chip_reads_warn_and_return_minus_one() {
        let sink = DiagnosticSink::new();
        let chip = Chip::default();
        assert!(!chip.is_initialized());
        assert_eq!(chip.calc_cost(&sink), -1);
        assert_eq!(sink.diagnostics().len(), 1);

        // Zero blocks: the guard fires before any coordinate is touched.
        let mut g = Graph::new(0, 1);
        g.set_net(nid(0), &[]);
        let mut empty = Chip::new(g, 2, 2);
        assert_eq!(empty.calc_swap_cost_delta((0, 0), (1, 1), &sink), -1);
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn add_cost_delta_guards() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        place_layout_2(&mut chip);

        // Delta on an invalid cache warns.
        chip.add_cost_delta(2, &sink);
        assert_eq!(sink.diagnostics().len(), 1);

        chip.set_cost(4);
        chip.add_cost_delta(-1, &sink);
        assert_eq!(chip.cost(), 3);
        assert_eq!(sink.diagnostics().len(), 1);

        chip.add_cost_delta(-10, &sink);
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn set_grid_validates_dimensions() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        let before = chip.clone();

        chip.set_grid(vec![vec![None; 4]; 3], false, &sink);
        assert_eq!(chip, before);
        assert_eq!(sink.diagnostics().len(), 1);

        chip.set_grid(vec![vec![None; 3]; 4], false, &sink);
        assert_eq!(chip, before);
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn set_grid_validates_block_ids() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();
        let before = chip.clone();

        let mut out_of_range = vec![vec![None; 4]; 4];
        out_of_range[0][0] = Some(bid(5));
        chip.set_grid(out_of_range, false, &sink);
        assert_eq!(chip, before);

        let mut duplicated = vec![vec![None; 4]; 4];
        duplicated[0][0] = Some(bid(2));
        duplicated[3][3] = Some(bid(2));
        chip.set_grid(duplicated, false, &sink);
        assert_eq!(chip, before);
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn set_grid_rebuilds_inverse_and_caches_cost() {
        let sink = DiagnosticSink::new();
        let mut chip = mini_2();

        // Layout 2 expressed as a bulk grid.
        let mut grid = vec![vec![None; 4]; 4];
        grid[2][1] = Some(bid(0));
        grid[3][1] = Some(bid(1));
        grid[2][2] = Some(bid(2));
        grid[3][2] = Some(bid(3));
        grid[1][1] = Some(bid(4));
        chip.set_grid(grid, false, &sink);

        assert_eq!(chip.block_loc(bid(0)), Some((2, 1)));
        assert_eq!(chip.block_loc(bid(4)), Some((1, 1)));
        assert_eq!(chip.cost(), 4);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn net_coords_reports_placed_blocks() {
        let mut chip = mini_2();
        place_layout_2(&mut chip);
        let coords = chip.net_coords(nid(1));
        assert_eq!(coords, vec![(2, 1), (1, 1)]);
        assert_eq!(chip.net_block_ids(nid(1)), &[bid(0), bid(4)]);
    }
}
