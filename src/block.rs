//! Byte-block views over serializable memory

/// Marker for plain-old-data types that may be transferred byte for byte.
///
/// # Safety
///
/// Implementors guarantee that every bit pattern of the correct width is a
/// valid value and that the type carries no ownership or padding the
/// transport could corrupt. The block transport reads and writes values of
/// these types as raw bytes in native byte order.
pub unsafe trait BlockData: Copy + 'static {}

unsafe impl BlockData for u8 {}
unsafe impl BlockData for u16 {}
unsafe impl BlockData for u32 {}
unsafe impl BlockData for u64 {}
unsafe impl BlockData for i8 {}
unsafe impl BlockData for i16 {}
unsafe impl BlockData for i32 {}
unsafe impl BlockData for i64 {}
unsafe impl BlockData for f32 {}
unsafe impl BlockData for f64 {}
unsafe impl BlockData for usize {}
unsafe impl<T: BlockData, const N: usize> BlockData for [T; N] {}

/// Non-owning view of one contiguous byte region used for a single
/// save or load transfer.
///
/// A view aliases memory owned by the [`Serializable`](crate::Serializable)
/// that produced it and is only valid until the next call on that object.
/// "No such block" is expressed as `Option::<BlockView>::None`, never as a
/// dangling view.
#[derive(Clone, Copy, Debug)]
pub struct BlockView {
    addr: *mut u8,
    len: usize,
}

impl BlockView {
    /// View over a single value.
    pub fn of<T: BlockData>(value: &mut T) -> Self {
        Self {
            addr: (value as *mut T).cast::<u8>(),
            len: core::mem::size_of::<T>(),
        }
    }

    /// View over a contiguous run of values, exposed as one block.
    pub fn of_slice<T: BlockData>(values: &mut [T]) -> Self {
        Self {
            addr: values.as_mut_ptr().cast::<u8>(),
            len: core::mem::size_of_val(values),
        }
    }

    /// Length of the viewed region in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view covers zero bytes (a zero-length primitive array).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrow the viewed region for writing to a stream.
    ///
    /// # Safety
    ///
    /// The memory the view aliases must still be live and must not be
    /// mutated elsewhere for the duration of the borrow. The transport is
    /// the only caller; views never escape a single save/load step.
    pub(crate) unsafe fn bytes(&self) -> &[u8] {
        unsafe { core::slice::from_raw_parts(self.addr, self.len) }
    }

    /// Borrow the viewed region for filling from a stream.
    ///
    /// # Safety
    ///
    /// Same conditions as [`BlockView::bytes`], plus exclusivity: no other
    /// reference to the region may exist while the transport writes into it.
    pub(crate) unsafe fn bytes_mut(&self) -> &mut [u8] {
        unsafe { core::slice::from_raw_parts_mut(self.addr, self.len) }
    }
}
