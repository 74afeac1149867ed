//! Dynamic-size serialization: staging buffers and resizable-container
//! registrations
//!
//! Containers such as `Vec`, `String` and `BTreeMap` have no stable address
//! for their element count, and their layout is only known once that count
//! has been loaded. Objects holding such members own a [`StagingBuffer`]
//! and use the `dyn_*` registrations below, which serialize the count as an
//! ordinary fixed block *before* the element payload. On load the count
//! block lands in the staging buffer first; the walk that follows resizes
//! the container and only then exposes the element blocks.
//!
//! The count-before-elements ordering is a hard precondition of the wire
//! schema. It is not runtime checked; a misordered schema reads garbage
//! silently (covered by the transport tests instead).

use std::collections::BTreeMap;

use crate::block::{BlockData, BlockView};
use crate::serializable::{BlockWalk, Serializable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    /// Nothing staged yet
    Empty,
    /// The transport was handed a view into this slot during a load
    Handed,
    /// Staged bytes were committed into the real container
    Ready,
}

#[derive(Debug)]
struct Slot {
    bytes: Vec<u8>,
    state: SlotState,
}

impl Slot {
    fn put_count(&mut self, count: u64) {
        self.bytes.resize(8, 0);
        self.bytes.copy_from_slice(&count.to_ne_bytes());
    }

    fn count(&self) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.bytes);
        u64::from_ne_bytes(raw)
    }
}

/// Byte region owned by a dynamic-size serializable, grown lazily on first
/// use. Holds count fields and staged payload between the block walks of
/// one save or load sequence.
///
/// Slots are assigned to `dyn_*` registrations in schema order, so the
/// assignment is identical on every walk over the same object.
#[derive(Debug, Default)]
pub struct StagingBuffer {
    slots: Vec<Slot>,
}

impl StagingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, index: usize) -> &mut Slot {
        while self.slots.len() <= index {
            self.slots.push(Slot {
                bytes: Vec::new(),
                state: SlotState::Empty,
            });
        }
        &mut self.slots[index]
    }

    /// Bytes currently held across all slots.
    pub fn staged_len(&self) -> usize {
        self.slots.iter().map(|slot| slot.bytes.len()).sum()
    }
}

// Packing helpers for containers that cannot expose their storage
// directly. The only byte reinterpretation outside `BlockView`.

fn pack_pod<T: BlockData>(out: &mut Vec<u8>, value: &T) {
    let raw = unsafe {
        core::slice::from_raw_parts((value as *const T).cast::<u8>(), size_of::<T>())
    };
    out.extend_from_slice(raw);
}

fn unpack_pod<T: BlockData>(raw: &[u8]) -> T {
    debug_assert!(raw.len() >= size_of::<T>());
    unsafe { core::ptr::read_unaligned(raw.as_ptr().cast::<T>()) }
}

impl BlockWalk {
    fn take_slot(&mut self) -> usize {
        let index = self.staging_slots;
        self.staging_slots += 1;
        index
    }

    /// Register the count slot shared by all `dyn_*` registrations: refresh
    /// it on save, expose it as one block, and report the authoritative
    /// element count for the rest of the registration. The second value is
    /// false while a load has not yet delivered the count, in which case
    /// the count is only a placeholder taken from the container's current
    /// size.
    fn count_block(
        &mut self,
        staging: &mut StagingBuffer,
        slot_index: usize,
        current: u64,
    ) -> (u64, bool) {
        let is_load = self.mode().is_load();
        let slot = staging.slot(slot_index);
        if slot.bytes.len() != 8 {
            slot.put_count(current);
        }
        let (count, known) = if is_load {
            if slot.state == SlotState::Empty {
                (current, false)
            } else {
                (slot.count(), true)
            }
        } else {
            slot.put_count(current);
            (current, true)
        };
        if self.hits(1) {
            if is_load {
                slot.state = SlotState::Handed;
            }
            let view = BlockView::of_slice(slot.bytes.as_mut_slice());
            self.capture(view);
        }
        self.advance(1);
        (count, known)
    }

    /// Register a resizable vector of primitives: a count block followed by
    /// one contiguous element block. A count of zero registers zero element
    /// blocks. On load the vector is resized to the loaded count before any
    /// element block is exposed.
    pub fn dyn_vec<T: BlockData + Default>(
        &mut self,
        values: &mut Vec<T>,
        staging: &mut StagingBuffer,
    ) -> &mut Self {
        let slot_index = self.take_slot();
        let (count, _) = self.count_block(staging, slot_index, values.len() as u64);
        let count = count as usize;
        if self.mode().is_load() && values.len() != count {
            values.resize(count, T::default());
        }
        if !values.is_empty() {
            if self.hits(1) {
                self.capture(BlockView::of_slice(values.as_mut_slice()));
            }
            self.advance(1);
        }
        self
    }

    /// Register a resizable vector of constant-size serializables: a count
    /// block followed by the delegated blocks of each element. Elements
    /// must share one block layout (stride taken from element 0). On load
    /// the vector is resized with `Default` elements before delegation.
    pub fn dyn_serializable_vec<S: Serializable + Default>(
        &mut self,
        items: &mut Vec<S>,
        staging: &mut StagingBuffer,
    ) -> &mut Self {
        let slot_index = self.take_slot();
        let (count, _) = self.count_block(staging, slot_index, items.len() as u64);
        let count = count as usize;
        if self.mode().is_load() && items.len() != count {
            items.resize_with(count, S::default);
        }
        self.nested_slice(items.as_mut_slice())
    }

    /// Register a string: a count block followed by a staged byte block.
    ///
    /// The payload is staged because `String` storage cannot be handed out
    /// for raw writes. Loaded bytes are committed into the string on the
    /// walk after the payload transfer (the transport's final sentinel poll
    /// guarantees at least one such walk). Checkpoint bytes that are not
    /// valid UTF-8 are committed lossily; data saved from a `String` by
    /// this crate is always valid.
    pub fn dyn_string(&mut self, value: &mut String, staging: &mut StagingBuffer) -> &mut Self {
        let len_index = self.take_slot();
        let payload_index = self.take_slot();
        let (count, count_known) = self.count_block(staging, len_index, value.len() as u64);
        let count = count as usize;

        let is_load = self.mode().is_load();
        let payload = staging.slot(payload_index);
        if is_load {
            if payload.state == SlotState::Handed {
                *value = String::from_utf8_lossy(&payload.bytes).into_owned();
                payload.state = SlotState::Ready;
            } else if count_known && count == 0 {
                // No payload block will ever arrive for an empty string.
                value.clear();
            }
            payload.bytes.resize(count, 0);
        } else {
            payload.bytes.clear();
            payload.bytes.extend_from_slice(value.as_bytes());
        }
        if !payload.bytes.is_empty() {
            if self.hits(1) {
                if is_load {
                    payload.state = SlotState::Handed;
                }
                let view = BlockView::of_slice(payload.bytes.as_mut_slice());
                self.capture(view);
            }
            self.advance(1);
        }
        self
    }

    /// Register an ordered map of primitives: a count block followed by one
    /// staged block of packed `(key, value)` entries.
    ///
    /// Like [`BlockWalk::dyn_string`] the payload is staged and committed
    /// into the map on the walk after the transfer.
    pub fn dyn_map<K, V>(
        &mut self,
        entries: &mut BTreeMap<K, V>,
        staging: &mut StagingBuffer,
    ) -> &mut Self
    where
        K: BlockData + Ord,
        V: BlockData,
    {
        let len_index = self.take_slot();
        let payload_index = self.take_slot();
        let (count, count_known) = self.count_block(staging, len_index, entries.len() as u64);
        let count = count as usize;
        let entry_len = size_of::<K>() + size_of::<V>();

        let is_load = self.mode().is_load();
        let payload = staging.slot(payload_index);
        if is_load {
            if payload.state == SlotState::Handed {
                entries.clear();
                for raw in payload.bytes.chunks_exact(entry_len) {
                    let key = unpack_pod::<K>(&raw[..size_of::<K>()]);
                    let value = unpack_pod::<V>(&raw[size_of::<K>()..]);
                    entries.insert(key, value);
                }
                payload.state = SlotState::Ready;
            } else if count_known && count == 0 {
                // No payload block will ever arrive for an empty map.
                entries.clear();
            }
            payload.bytes.resize(count * entry_len, 0);
        } else {
            payload.bytes.clear();
            for (key, value) in entries.iter() {
                pack_pod(&mut payload.bytes, key);
                pack_pod(&mut payload.bytes, value);
            }
        }
        if !payload.bytes.is_empty() {
            if self.hits(1) {
                if is_load {
                    payload.state = SlotState::Handed;
                }
                let view = BlockView::of_slice(payload.bytes.as_mut_slice());
                self.capture(view);
            }
            self.advance(1);
        }
        self
    }
}
