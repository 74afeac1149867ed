//! In-memory block-walk tests across module boundaries
//!
//! These drive full block sequences by hand, the way the file transport
//! does, but against memory instead of a file.

use std::collections::BTreeMap;

use crate::block::BlockView;
use crate::buffer::StagingBuffer;
use crate::serializable::{BlockWalk, Mode, Serializable};

/// A dynamic-size aggregate mixing every registration kind.
#[derive(Default)]
struct MixedState {
    label: String,
    ticks: u64,
    weights: Vec<f64>,
    tags: BTreeMap<u32, u64>,
    staging: StagingBuffer,
}

impl Serializable for MixedState {
    fn num_blocks(&self) -> usize {
        let label = 1 + usize::from(!self.label.is_empty());
        let weights = 1 + usize::from(!self.weights.is_empty());
        let tags = 1 + usize::from(!self.tags.is_empty());
        label + 1 + weights + tags
    }

    fn serializable_size(&self) -> usize {
        8 + self.label.len()
            + size_of::<u64>()
            + 8
            + self.weights.len() * size_of::<f64>()
            + 8
            + self.tags.len() * (size_of::<u32>() + size_of::<u64>())
    }

    fn block(&mut self, index: usize, mode: Mode) -> Option<BlockView> {
        let mut walk = BlockWalk::new(index, mode);
        walk.dyn_string(&mut self.label, &mut self.staging);
        walk.field(&mut self.ticks);
        walk.dyn_vec(&mut self.weights, &mut self.staging);
        walk.dyn_map(&mut self.tags, &mut self.staging);
        walk.finish()
    }
}

/// Pump every block of `source` into a byte vector, as the transport
/// would write them.
fn drain(source: &mut impl Serializable) -> Vec<u8> {
    let mut out = Vec::new();
    let mut index = 0;
    while let Some(view) = source.block(index, Mode::Save) {
        out.extend_from_slice(unsafe { view.bytes() });
        index += 1;
    }
    out
}

/// Feed bytes back through `target`'s load sequence, including the final
/// sentinel poll that commits staged payloads.
fn fill(target: &mut impl Serializable, bytes: &[u8]) {
    let mut offset = 0;
    let mut index = 0;
    while let Some(view) = target.block(index, Mode::Load) {
        let len = view.len();
        unsafe { view.bytes_mut() }.copy_from_slice(&bytes[offset..offset + len]);
        offset += len;
        index += 1;
    }
    assert_eq!(offset, bytes.len(), "load consumed a different footprint than save produced");
}

#[test]
fn test_mixed_state_roundtrip() {
    let mut state = MixedState {
        label: "poiseuille".to_string(),
        ticks: 480,
        weights: vec![4.0 / 9.0, 1.0 / 9.0, 1.0 / 36.0],
        ..Default::default()
    };
    state.tags.insert(3, 30);
    state.tags.insert(1, 10);

    let bytes = drain(&mut state);
    assert_eq!(bytes.len(), state.serializable_size());

    let mut restored = MixedState::default();
    fill(&mut restored, &bytes);

    assert_eq!(restored.label, "poiseuille");
    assert_eq!(restored.ticks, 480);
    assert_eq!(restored.weights, state.weights);
    assert_eq!(restored.tags, state.tags);
}

#[test]
fn test_mixed_state_empty_containers_roundtrip() {
    let mut state = MixedState {
        ticks: 7,
        ..Default::default()
    };

    let bytes = drain(&mut state);
    // Three zero counts plus the tick counter, nothing else.
    assert_eq!(bytes.len(), 8 + 8 + 8 + 8);

    let mut restored = MixedState {
        label: "stale".to_string(),
        weights: vec![1.0, 2.0],
        ..Default::default()
    };
    restored.tags.insert(9, 9);
    fill(&mut restored, &bytes);

    assert_eq!(restored.ticks, 7);
    assert!(restored.label.is_empty());
    assert!(restored.weights.is_empty());
    assert!(restored.tags.is_empty());
}

#[test]
fn test_num_blocks_settles_after_load() {
    let mut state = MixedState {
        label: "x".to_string(),
        weights: vec![1.0, 2.0, 3.0],
        ..Default::default()
    };
    state.tags.insert(1, 1);
    let saved_blocks = state.num_blocks();
    let bytes = drain(&mut state);

    let mut restored = MixedState::default();
    assert!(restored.num_blocks() < saved_blocks);
    fill(&mut restored, &bytes);
    assert_eq!(restored.num_blocks(), saved_blocks);
}
