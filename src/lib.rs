//! Fixed-arena allocator with sorted chunk bookkeeping
//!
//! This crate provides a single type called [`Allocator`]: a first-fit
//! allocator handing out byte ranges from a fixed-size arena it owns. It
//! never requests memory from the operating system or from a surrounding
//! general-purpose allocator; the arena and all bookkeeping are embedded in
//! the allocator value itself, so the complete memory footprint is known at
//! compile time. The design is simple on purpose, so that errors in the
//! implementation are unlikely, and every access into the arena is
//! bounds-checked.
//!
//! # Usage
//! Pick an arena capacity and create an allocator; all further interaction
//! goes through [`alloc`](Allocator::alloc), [`release`](Allocator::release)
//! and the memory accessors:
//! ```
//! let mut allocator = chunkalloc::Allocator::<4096>::new();
//!
//! let greeting = allocator.alloc(13).expect("fresh 4 KiB arena has room");
//! allocator.memory_mut(greeting).copy_from_slice(b"Hello, arena!");
//!
//! assert_eq!(&allocator.memory(greeting)[..5], b"Hello");
//! allocator.release(greeting);
//! ```
//! Allocations are addressed by [`Ptr`] handles carrying offsets into the
//! arena rather than raw pointers, which keeps the whole crate free of
//! `unsafe` and independent of the host's addressing model. Exhaustion is
//! reported with [`OutOfMemory`]; a request for zero bytes succeeds with
//! [`Ptr::NULL`], which owns no memory and may be released freely.
//!
//! # Implementation
//! The allocator tracks the arena with two sorted lists of `(start, size)`
//! chunks: the free list and the allocated list. Every byte of the arena
//! belongs to exactly one chunk in exactly one of the lists at any time.
//! The basic algorithm is as follows:
//! 1.  We start with a fresh arena of 32 bytes. The free list holds a
//!     single chunk spanning everything:
//!     ```text
//!     free:      {0, 32}
//!     allocated: (empty)
//!     ```
//! 2.  A block of 8 is allocated. The free list is scanned front to back
//!     and the first chunk large enough is selected, here the only one. It
//!     is split: the first 8 bytes are recorded in the allocated list, the
//!     tail goes back to the free list.
//!     ```text
//!     free:      {8, 24}
//!     allocated: {0, 8}
//!     ```
//! 3.  Another block of 8 is allocated, repeating the same procedure:
//!     ```text
//!     free:      {16, 16}
//!     allocated: {0, 8} {8, 8}
//!     ```
//! 4.  The first block is released. Its chunk moves back into the free
//!     list by sorted insertion, and nothing else happens; in particular
//!     free neighbors are *not* merged yet:
//!     ```text
//!     free:      {0, 8} {16, 16}
//!     allocated: {8, 8}
//!     ```
//! 5.  The second block is released as well:
//!     ```text
//!     free:      {0, 8} {8, 8} {16, 16}
//!     allocated: (empty)
//!     ```
//!     The arena is completely unused, but the free list still has three
//!     entries. Merging on every release would make each release as
//!     expensive as a full walk of the list; deferring it keeps a release
//!     at a binary search plus one sorted insert.
//! 6.  A block of 32 is requested. Before the scan, the free list is
//!     coalesced: neighboring chunks whose ranges touch are merged in a
//!     single pass.
//!     ```text
//!     free:      {0, 32}
//!     allocated: (empty)
//!     ```
//!     The scan now sees a chunk of 32 and the request succeeds, although
//!     no single free chunk was large enough before the merge. Coalescing
//!     must therefore run before every scan, not just occasionally.
//! 7.  A block of 40 is requested. Even the fully coalesced free list has
//!     no chunk of 40, so the allocation fails with [`OutOfMemory`] and
//!     the arena is left unchanged.
//!
//! First fit with ascending addresses keeps the scan simple and biases
//! allocations towards the bottom of the arena, at the price of
//! fragmentation under some workloads. That is a known limitation of the
//! strategy, not something this crate tries to fix.
//!
//! # Bookkeeping limits
//! Both lists store their chunks in a fixed number of inline slots, `M`
//! ([`DEFAULT_MAX_CHUNKS`] unless overridden). Every live allocation takes
//! one slot in the allocated list and every free fragment one slot in the
//! free list. Running out of slots means the arena is fragmented beyond
//! what the configuration accounts for; the allocator panics in that case
//! instead of continuing with corrupted bookkeeping. Size `M` for the
//! worst-case number of simultaneously live allocations of your workload.
//!
//! # Alternatives
//! The same role can be filled by per-block boundary tags (metadata stored
//! next to the payload bytes, merged in place) or by a bitmap over
//! fixed-size blocks. Both trade the explicit side tables of this design
//! for bookkeeping inside the arena itself; this crate implements the
//! sorted chunk lists only.
#![no_std]

mod arena;
mod chunk_list;

pub use chunk_list::Chunk;

use arena::Arena;
use chunk_list::ChunkList;

use log::debug;

/// Default number of bookkeeping slots per chunk list.
pub const DEFAULT_MAX_CHUNKS: usize = 1024;

/// Handle to a block handed out by [`Allocator::alloc`].
///
/// A `Ptr` is either the offset of the first byte of an allocation or the
/// distinguished [`NULL`](Self::NULL) value. Offset zero is a perfectly
/// valid address in the arena, so null is represented out-of-band instead
/// of hijacking address zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ptr(Option<usize>);

impl Ptr {
    /// The null handle: owns no memory and is released without effect.
    pub const NULL: Self = Self(None);

    /// A handle at an explicit arena offset.
    ///
    /// This reconstructs a handle whose offset was stored elsewhere. The
    /// offset is not validated here; passing a handle that does not refer
    /// to a live allocation to [`Allocator::release`] is a contract
    /// violation and panics there.
    pub const fn at(offset: usize) -> Self {
        Self(Some(offset))
    }

    /// Whether this is the null handle.
    pub const fn is_null(self) -> bool {
        self.0.is_none()
    }

    /// The arena offset of the allocation, or `None` for null.
    pub const fn offset(self) -> Option<usize> {
        self.0
    }
}

/// Error returned by [`Allocator::alloc`] when no free chunk is large
/// enough, even after coalescing.
///
/// Arena exhaustion is an expected runtime condition: callers must check
/// for it and can recover, for example by releasing other allocations and
/// retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemory;

impl core::fmt::Display for OutOfMemory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("no free chunk large enough to satisfy the allocation")
    }
}

/// Selector for one of the two bookkeeping lists, see [`Allocator::dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Chunks available for allocation.
    Free,
    /// Chunks currently handed out.
    Allocated,
}

/// First-fit arena allocator with sorted chunk bookkeeping.
///
/// `N` is the arena capacity in bytes, `M` the number of bookkeeping slots
/// per chunk list (see the [crate-level](crate) documentation for how to
/// size it). The allocator is a plain value: it owns all of its state, so
/// multiple independent instances can coexist and tests get deterministic
/// setup and teardown.
///
/// All operations take `&mut self` and run to completion; there is no
/// internal locking. An allocator shared across threads has to be wrapped
/// in external mutual exclusion by the caller.
pub struct Allocator<const N: usize, const M: usize = DEFAULT_MAX_CHUNKS> {
    arena: Arena<N>,
    free: ChunkList<M>,
    allocated: ChunkList<M>,
}

impl<const N: usize, const M: usize> Allocator<N, M> {
    /// Create a new allocator with the whole arena free.
    ///
    /// This function is a `const fn`, therefore it can be called directly
    /// when creating the allocator, also in const contexts.
    ///
    /// # Panics
    /// This function will panic if the arena capacity `N` or the chunk
    /// capacity `M` is zero.
    #[must_use]
    pub const fn new() -> Self {
        assert!(N > 0, "arena capacity must not be zero");
        assert!(M > 0, "chunk capacity must not be zero");
        Self {
            arena: Arena::new(),
            free: ChunkList::spanning(N),
            allocated: ChunkList::new(),
        }
    }

    /// Allocate `size` contiguous bytes from the arena.
    ///
    /// The free list is coalesced and then scanned front to back; the first
    /// chunk large enough is used (first fit, so ties go to the lowest
    /// address). A larger chunk is split and its tail returned to the free
    /// list. A request for zero bytes succeeds with [`Ptr::NULL`].
    ///
    /// # Errors
    /// [`OutOfMemory`] if no free chunk can hold `size` bytes. The arena is
    /// unchanged in that case, apart from the coalescing pass.
    ///
    /// # Panics
    /// Panics if a bookkeeping list runs out of slots, i.e. if more than
    /// `M` allocations or free fragments are live at once.
    pub fn alloc(&mut self, size: usize) -> Result<Ptr, OutOfMemory> {
        if size == 0 {
            return Ok(Ptr::NULL);
        }

        // Merging happens here and only here: releases leave fragments
        // behind, and an exact fit spanning two touching fragments must be
        // visible to the scan below.
        self.free = self.free.coalesced();

        let position = self
            .free
            .as_slice()
            .iter()
            .position(|chunk| chunk.size >= size);
        let index = match position {
            Some(index) => index,
            None => {
                debug!("alloc({}) failed: out of memory", size);
                return Err(OutOfMemory);
            }
        };

        let chunk = self.free.remove_at(index);
        let remainder = chunk.size - size;
        if remainder > 0 {
            self.free.insert(chunk.start + size, remainder);
        }
        self.allocated.insert(chunk.start, size);

        debug!("alloc({}) -> offset {}", size, chunk.start);
        Ok(Ptr::at(chunk.start))
    }

    /// Return an allocation to the free list.
    ///
    /// The chunk is moved back by sorted insertion only; merging it with
    /// its neighbors is deferred until the next [`alloc`](Self::alloc)
    /// call. Releasing [`Ptr::NULL`] does nothing.
    ///
    /// # Panics
    /// Panics if `ptr` does not refer to a live allocation, i.e. on a
    /// double release or on a handle that was never handed out. Carrying on
    /// would corrupt the bookkeeping, so this is fatal.
    pub fn release(&mut self, ptr: Ptr) {
        let offset = match ptr.offset() {
            Some(offset) => offset,
            None => return,
        };

        let index = match self.allocated.find(offset) {
            Some(index) => index,
            None => panic!("released offset {} is not an allocation", offset),
        };
        let chunk = self.allocated.remove_at(index);
        self.free.insert(chunk.start, chunk.size);

        debug!("release(offset {}) -> {} bytes freed", chunk.start, chunk.size);
    }

    /// Ordered diagnostic listing of one bookkeeping list.
    ///
    /// The returned chunks are sorted ascending by start offset. This is an
    /// inspection aid (used heavily by the tests), not part of the
    /// allocation contract. Note that the free list only reflects merges up
    /// to the most recent allocation, since coalescing is lazy.
    pub fn dump(&self, state: State) -> &[Chunk] {
        match state {
            State::Free => self.free.as_slice(),
            State::Allocated => self.allocated.as_slice(),
        }
    }

    /// The arena capacity in bytes.
    pub const fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Bytes currently available, summed over all free chunks.
    ///
    /// Fragmentation may keep a single allocation of this size from
    /// succeeding.
    pub fn free_bytes(&self) -> usize {
        self.free.total_size()
    }

    /// Bytes currently handed out.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated.total_size()
    }

    /// The bytes of a live allocation.
    ///
    /// [`Ptr::NULL`] yields an empty slice.
    ///
    /// # Panics
    /// Panics if `ptr` does not refer to a live allocation, with the same
    /// contract as [`release`](Self::release).
    pub fn memory(&self, ptr: Ptr) -> &[u8] {
        match self.live_chunk(ptr) {
            Some(chunk) => self.arena.bytes(chunk),
            None => &[],
        }
    }

    /// The bytes of a live allocation, mutably.
    ///
    /// [`Ptr::NULL`] yields an empty slice.
    ///
    /// # Panics
    /// Panics if `ptr` does not refer to a live allocation, with the same
    /// contract as [`release`](Self::release).
    pub fn memory_mut(&mut self, ptr: Ptr) -> &mut [u8] {
        match self.live_chunk(ptr) {
            Some(chunk) => self.arena.bytes_mut(chunk),
            None => &mut [],
        }
    }

    fn live_chunk(&self, ptr: Ptr) -> Option<Chunk> {
        let offset = ptr.offset()?;
        match self.allocated.find(offset) {
            Some(index) => Some(self.allocated.as_slice()[index]),
            None => panic!("offset {} is not an allocation", offset),
        }
    }
}
