//! The fixed-size serializable capability and its block-walk cursor
//!
//! Any state that takes part in a checkpoint implements [`Serializable`].
//! The transport calls [`Serializable::block`] with an increasing index and
//! transfers each returned view until the object answers `None`.
//!
//! Every `block()` implementation builds a fresh [`BlockWalk`] for the
//! requested index and issues its registrations in a fixed order. That
//! order is the on-disk schema: it must be identical between the run that
//! saved a file and the run that loads it, or data misaligns silently.
//!
//! ```
//! use lbm_checkpoint::{BlockView, BlockWalk, Mode, Serializable};
//!
//! struct Probe {
//!     step: u64,
//!     samples: [f64; 4],
//! }
//!
//! impl Serializable for Probe {
//!     fn num_blocks(&self) -> usize {
//!         2
//!     }
//!
//!     fn serializable_size(&self) -> usize {
//!         size_of::<u64>() + size_of::<[f64; 4]>()
//!     }
//!
//!     fn block(&mut self, index: usize, mode: Mode) -> Option<BlockView> {
//!         let mut walk = BlockWalk::new(index, mode);
//!         walk.field(&mut self.step);
//!         walk.field(&mut self.samples);
//!         walk.finish()
//!     }
//! }
//! ```

use crate::block::{BlockData, BlockView};

/// Direction of the transfer a block view is produced for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Views will be written out to a stream
    Save,
    /// Views will be filled from a stream
    Load,
}

impl Mode {
    /// True when views are about to be filled from a stream
    pub fn is_load(self) -> bool {
        matches!(self, Mode::Load)
    }
}

/// Capability of state whose serialized footprint is constant over the
/// object's lifetime.
///
/// Dynamic containers (`Vec`, `BTreeMap`, `String`) additionally need a
/// [`StagingBuffer`](crate::StagingBuffer) member and the dynamic
/// registrations from [`BlockWalk`]; see the `buffer` module.
pub trait Serializable {
    /// Total number of blocks this object exposes.
    ///
    /// Constant for fixed-size objects. For dynamic-size objects the count
    /// reflects the current container sizes and may legitimately change
    /// while a load is in flight.
    fn num_blocks(&self) -> usize;

    /// Sum of the byte lengths of all blocks.
    fn serializable_size(&self) -> usize;

    /// View of the block at `index`, or `None` once `index` runs past the
    /// final block. The `None` answer is the transport's normal stop
    /// signal, not an error; out-of-range indices must never fault.
    fn block(&mut self, index: usize, mode: Mode) -> Option<BlockView>;
}

/// Sum of `num_blocks()` over a collection of serializables
pub fn num_blocks_of<'a, S, I>(items: I) -> usize
where
    S: Serializable + 'a,
    I: IntoIterator<Item = &'a S>,
{
    items.into_iter().map(Serializable::num_blocks).sum()
}

/// Sum of `serializable_size()` over a collection of serializables
pub fn serializable_size_of<'a, S, I>(items: I) -> usize
where
    S: Serializable + 'a,
    I: IntoIterator<Item = &'a S>,
{
    items.into_iter().map(Serializable::serializable_size).sum()
}

/// Cursor scoped to one `block()` invocation.
///
/// Registrations are issued in schema order. Each one compares the
/// requested index against the running cursor, captures the matching view
/// if this registration owns that index, and unconditionally advances the
/// cursor by the number of blocks it represents. Cursor ranges are disjoint
/// and contiguous, so at most one registration matches per walk.
pub struct BlockWalk {
    target: usize,
    mode: Mode,
    cursor: usize,
    found: Option<BlockView>,
    pub(crate) staging_slots: usize,
}

impl BlockWalk {
    /// Start a walk for the block at `target`.
    pub fn new(target: usize, mode: Mode) -> Self {
        Self {
            target,
            mode,
            cursor: 0,
            found: None,
            staging_slots: 0,
        }
    }

    /// Mode this walk was started in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn capture(&mut self, view: BlockView) {
        self.found = Some(view);
    }

    pub(crate) fn hits(&self, span: usize) -> bool {
        span > 0 && self.target >= self.cursor && self.target < self.cursor + span
    }

    pub(crate) fn local_index(&self) -> usize {
        self.target - self.cursor
    }

    pub(crate) fn advance(&mut self, span: usize) {
        self.cursor += span;
    }

    /// Register a single primitive value. One block.
    pub fn field<T: BlockData>(&mut self, value: &mut T) -> &mut Self {
        if self.target == self.cursor {
            self.capture(BlockView::of(value));
        }
        self.advance(1);
        self
    }

    /// Register a contiguous run of primitives as exactly one block,
    /// regardless of element count.
    pub fn slice<T: BlockData>(&mut self, values: &mut [T]) -> &mut Self {
        if self.target == self.cursor {
            self.capture(BlockView::of_slice(values));
        }
        self.advance(1);
        self
    }

    /// Register a nested constant-size serializable by delegating the
    /// lookup with a re-based index. Advances by `child.num_blocks()`.
    pub fn nested<S: Serializable>(&mut self, child: &mut S) -> &mut Self {
        let span = child.num_blocks();
        if self.hits(span) {
            let local = self.local_index();
            if let Some(view) = child.block(local, self.mode) {
                self.capture(view);
            }
        }
        self.advance(span);
        self
    }

    /// Register a homogeneous run of constant-size serializables.
    ///
    /// The per-element stride is taken from element 0; all elements must
    /// expose the same block layout. An empty run registers zero blocks and
    /// never touches element 0.
    pub fn nested_slice<S: Serializable>(&mut self, children: &mut [S]) -> &mut Self {
        if children.is_empty() {
            return self;
        }
        let stride = children[0].num_blocks();
        let span = children.len() * stride;
        if self.hits(span) {
            let local = self.local_index();
            let child = &mut children[local / stride];
            debug_assert_eq!(
                child.num_blocks(),
                stride,
                "nested_slice elements must share one block layout"
            );
            if let Some(view) = child.block(local % stride, self.mode) {
                self.capture(view);
            }
        }
        self.advance(span);
        self
    }

    /// Finish the walk, yielding the captured view or the no-block signal.
    pub fn finish(self) -> Option<BlockView> {
        self.found
    }
}
