//! Checkpointable geometry of a decomposed 2D simulation domain
//!
//! The simulation domain is covered by axis-aligned cuboids, one per
//! decomposed sub-domain. [`Cuboid2D`] is a constant-size serializable;
//! [`CuboidGeometry2D`] holds a resizable collection of them and shows the
//! dynamic-size capability end to end.

use crate::block::BlockView;
use crate::buffer::StagingBuffer;
use crate::serializable::{BlockWalk, Mode, Serializable, num_blocks_of, serializable_size_of};

/// One axis-aligned sub-domain of the lattice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cuboid2D {
    /// Physical position of the lower-left node
    origin: [f64; 2],
    /// Physical spacing between neighboring nodes
    delta: f64,
    /// Number of nodes along x and y
    node_count: [u64; 2],
    /// Load-balancing weight, by default the number of nodes
    weight: u64,
}

impl Cuboid2D {
    /// Cuboid at `origin` with node spacing `delta` and `node_count` nodes
    /// per direction. The weight defaults to the total node count.
    pub fn new(origin: [f64; 2], delta: f64, node_count: [u64; 2]) -> Self {
        Self {
            origin,
            delta,
            node_count,
            weight: node_count[0] * node_count[1],
        }
    }

    /// Physical position of the lower-left node.
    pub fn origin(&self) -> [f64; 2] {
        self.origin
    }

    /// Physical node spacing.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Nodes along x and y.
    pub fn node_count(&self) -> [u64; 2] {
        self.node_count
    }

    /// Physical extent covered by the cuboid.
    pub fn extent(&self) -> [f64; 2] {
        [
            self.delta * self.node_count[0] as f64,
            self.delta * self.node_count[1] as f64,
        ]
    }

    /// Load-balancing weight.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Override the load-balancing weight.
    pub fn set_weight(&mut self, weight: u64) {
        self.weight = weight;
    }

    /// Whether the physical point `(x, y)` lies inside the cuboid.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let extent = self.extent();
        x >= self.origin[0]
            && x < self.origin[0] + extent[0]
            && y >= self.origin[1]
            && y < self.origin[1] + extent[1]
    }
}

impl Serializable for Cuboid2D {
    fn num_blocks(&self) -> usize {
        4
    }

    fn serializable_size(&self) -> usize {
        size_of::<[f64; 2]>() + size_of::<f64>() + size_of::<[u64; 2]>() + size_of::<u64>()
    }

    fn block(&mut self, index: usize, mode: Mode) -> Option<BlockView> {
        let mut walk = BlockWalk::new(index, mode);
        walk.field(&mut self.origin);
        walk.field(&mut self.delta);
        walk.field(&mut self.node_count);
        walk.field(&mut self.weight);
        walk.finish()
    }
}

/// Decomposed coverage of the simulation domain: the motherhood cuboid
/// spanning the whole domain plus one child cuboid per sub-domain.
///
/// Dynamic-size serializable: the number of children is checkpointed ahead
/// of their data, so a load into a differently-decomposed instance resizes
/// the collection before reading it.
#[derive(Debug, Default)]
pub struct CuboidGeometry2D {
    motherhood: Cuboid2D,
    cuboids: Vec<Cuboid2D>,
    /// Periodicity along x and y, as 0/1 flags
    periodic: [u8; 2],
    staging: StagingBuffer,
}

impl CuboidGeometry2D {
    /// Geometry covering `motherhood`, split into `num_cuboids` column
    /// strips of near-equal width.
    pub fn new(motherhood: Cuboid2D, num_cuboids: usize) -> Self {
        let mut geometry = Self {
            motherhood,
            cuboids: Vec::new(),
            periodic: [0, 0],
            staging: StagingBuffer::new(),
        };
        geometry.split(num_cuboids);
        geometry
    }

    /// Replace the decomposition with `num_cuboids` column strips.
    pub fn split(&mut self, num_cuboids: usize) {
        self.cuboids.clear();
        if num_cuboids == 0 {
            return;
        }
        let [nx, ny] = self.motherhood.node_count();
        let delta = self.motherhood.delta();
        let [x0, y0] = self.motherhood.origin();
        let base = nx / num_cuboids as u64;
        let remainder = (nx % num_cuboids as u64) as usize;
        let mut column = 0u64;
        for strip in 0..num_cuboids {
            let width = base + u64::from(strip < remainder);
            self.cuboids.push(Cuboid2D::new(
                [x0 + column as f64 * delta, y0],
                delta,
                [width, ny],
            ));
            column += width;
        }
    }

    /// Cuboid spanning the whole domain.
    pub fn motherhood(&self) -> &Cuboid2D {
        &self.motherhood
    }

    /// Decomposed sub-domains.
    pub fn cuboids(&self) -> &[Cuboid2D] {
        &self.cuboids
    }

    /// Number of sub-domains.
    pub fn num_cuboids(&self) -> usize {
        self.cuboids.len()
    }

    /// Set periodicity along x and y.
    pub fn set_periodic(&mut self, x: bool, y: bool) {
        self.periodic = [u8::from(x), u8::from(y)];
    }

    /// Periodicity along x and y.
    pub fn periodic(&self) -> [bool; 2] {
        [self.periodic[0] != 0, self.periodic[1] != 0]
    }

    /// Index of the sub-domain containing the physical point, if any.
    pub fn cuboid_at(&self, x: f64, y: f64) -> Option<usize> {
        self.cuboids.iter().position(|cuboid| cuboid.contains(x, y))
    }
}

impl Serializable for CuboidGeometry2D {
    fn num_blocks(&self) -> usize {
        // motherhood + periodicity + cuboid count + delegated cuboid blocks
        self.motherhood.num_blocks() + 1 + 1 + num_blocks_of(self.cuboids.iter())
    }

    fn serializable_size(&self) -> usize {
        self.motherhood.serializable_size()
            + size_of::<[u8; 2]>()
            + size_of::<u64>()
            + serializable_size_of(self.cuboids.iter())
    }

    fn block(&mut self, index: usize, mode: Mode) -> Option<BlockView> {
        let mut walk = BlockWalk::new(index, mode);
        walk.nested(&mut self.motherhood);
        walk.field(&mut self.periodic);
        walk.dyn_serializable_vec(&mut self.cuboids, &mut self.staging);
        walk.finish()
    }
}
