//! Net-to-block and block-to-net adjacency.
//!
//! Graph-like structure with nodes denoting blocks. It has no knowledge of
//! the spatial placement of the blocks; the [`Chip`](crate::Chip) layers
//! coordinates on top. Built once by the problem loader and immutable
//! thereafter.

use crate::ids::{BlockId, NetId};

/// Connectivity of blocks and nets.
///
/// Two parallel adjacencies are maintained: for each net, the ordered list
/// of member blocks, and for each block, the ordered list of nets it
/// belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    /// For each net, the list of connected block IDs.
    nets: Vec<Vec<BlockId>>,
    /// For each block, the list of associated net IDs.
    block_nets: Vec<Vec<NetId>>,
}

impl Graph {
    /// Creates a graph sized for the given number of blocks and nets.
    pub fn new(n_blocks: usize, n_nets: usize) -> Self {
        Self {
            nets: vec![Vec::new(); n_nets],
            block_nets: vec![Vec::new(); n_blocks],
        }
    }

    /// Installs the connected blocks for the specified net.
    ///
    /// Appends `net` to the net list of every member block. Called only
    /// during problem loading.
    pub fn set_net(&mut self, net: NetId, blocks: &[BlockId]) {
        self.nets[net.index()] = blocks.to_vec();
        for &b in blocks {
            self.block_nets[b.index()].push(net);
        }
    }

    /// Returns the blocks connected by the given net.
    pub fn net_blocks(&self, net: NetId) -> &[BlockId] {
        &self.nets[net.index()]
    }

    /// Returns the nets the given block belongs to.
    pub fn block_nets(&self, block: BlockId) -> &[NetId] {
        &self.block_nets[block.index()]
    }

    /// Returns all nets as block-ID lists, indexed by net ID.
    pub fn nets(&self) -> &[Vec<BlockId>] {
        &self.nets
    }

    /// Returns the number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.block_nets.len()
    }

    /// Returns the number of nets.
    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    /// Returns `true` iff every block belongs to at least one net.
    pub fn all_blocks_connected(&self) -> bool {
        self.block_nets.iter().all(|nets| !nets.is_empty())
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

    #[test]
    fn empty_graph() {
        let g = Graph::new(0, 0);
        assert_eq!(g.num_blocks(), 0);
        assert_eq!(g.num_nets(), 0);
        assert!(g.all_blocks_connected());
    }

    #[test]
    fn set_net_builds_both_adjacencies() {
        let mut g = Graph::new(5, 2);
        g.set_net(nid(0), &[bid(0), bid(1), bid(2), bid(3)]);
        g.set_net(nid(1), &[bid(0), bid(4)]);

        assert_eq!(g.net_blocks(nid(0)), &[bid(0), bid(1), bid(2), bid(3)]);
        assert_eq!(g.net_blocks(nid(1)), &[bid(0), bid(4)]);
        assert_eq!(g.block_nets(bid(0)), &[nid(0), nid(1)]);
        assert_eq!(g.block_nets(bid(4)), &[nid(1)]);
    }

    #[test]
    fn all_blocks_connected_detects_orphan() {
        let mut g = Graph::new(3, 1);
        g.set_net(nid(0), &[bid(0), bid(1)]);
        assert!(!g.all_blocks_connected());

        let mut g2 = Graph::new(3, 2);
        g2.set_net(nid(0), &[bid(0), bid(1)]);
        g2.set_net(nid(1), &[bid(1), bid(2)]);
        assert!(g2.all_blocks_connected());
    }

    #[test]
    fn nets_accessor_indexed_by_net_id() {
        let mut g = Graph::new(2, 2);
        g.set_net(nid(1), &[bid(0), bid(1)]);
        assert!(g.nets()[0].is_empty());
        assert_eq!(g.nets()[1], vec![bid(0), bid(1)]);
    }

    #[test]
    fn single_block_net_is_legal() {
        let mut g = Graph::new(1, 1);
        g.set_net(nid(0), &[bid(0)]);
        assert_eq!(g.net_blocks(nid(0)).len(), 1);
        assert!(g.all_blocks_connected());
    }
}
