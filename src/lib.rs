//! # lbm-checkpoint
//!
//! Block-based binary checkpoint serialization for domain-decomposed
//! lattice-Boltzmann simulation state.
//!
//! Simulation state of arbitrary shape (scalar fields, fixed cell arrays,
//! resizable geometry collections) is decomposed into a flat, addressable
//! sequence of byte blocks. The transport asks a [`Serializable`] for
//! block 0, 1, 2, ... and copies each returned [`BlockView`] to or from a
//! checkpoint file until the object answers `None`. Nested serializables
//! compose transparently: containers re-expose their children's blocks
//! with re-based indices and zero bookkeeping in the child.
//!
//! ## Features
//!
//! - **Uniform access**: one block contract for fields, arrays and nested
//!   aggregates, shared between save and load
//! - **Composition**: child block sequences are spliced into the parent's
//!   via [`BlockWalk`] delegation
//! - **Dynamic sizes**: resizable containers checkpoint their element
//!   count ahead of their payload and are resized mid-load
//!   ([`StagingBuffer`])
//! - **Multi-root checkpoints**: one file per decomposed sub-domain, in
//!   parallel with the `parallel` feature
//!
//! ## Example
//!
//! ```no_run
//! use lbm_checkpoint::{CuboidGeometry2D, Cuboid2D, Serializer};
//!
//! let motherhood = Cuboid2D::new([0.0, 0.0], 0.01, [200, 100]);
//! let mut geometry = CuboidGeometry2D::new(motherhood, 4);
//!
//! let serializer = Serializer::new();
//! serializer.save(&mut geometry, "/tmp/checkpoint", "geometry.bin").unwrap();
//!
//! let mut restored = CuboidGeometry2D::default();
//! serializer.load(&mut restored, "/tmp/checkpoint", "geometry.bin").unwrap();
//! assert_eq!(restored.num_cuboids(), 4);
//! ```

pub mod block;
pub mod buffer;
pub mod config;
pub mod error;
pub mod geometry;
pub mod paths;
pub mod serializable;
pub mod serializer;

// Re-exports
pub use block::{BlockData, BlockView};
pub use buffer::StagingBuffer;
pub use config::SerializerConfig;
pub use error::{CheckpointError, Result};
pub use geometry::{Cuboid2D, CuboidGeometry2D};
pub use serializable::{BlockWalk, Mode, Serializable, num_blocks_of, serializable_size_of};
pub use serializer::{Serializer, load, save};

#[cfg(test)]
mod tests;
