//! # fitalloc - A Fixed-Region Free-List Allocator
//!
//! This crate provides a **free-list allocator** that serves variable-size
//! requests out of one fixed region mapped once from the operating system,
//! with a selectable placement policy: best-fit, worst-fit or first-fit.
//!
//! ## Overview
//!
//! The region never grows. Free space is tracked by a singly-linked list whose
//! nodes live inside the free memory they describe:
//!
//! ```text
//!   Region (page-rounded, mapped once):
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │ ┌────┬──────┬────┬────────────┬────┬──────┬────┬───────────────────┐ │
//!   │ │ H  │ A1   │ N  │  free      │ H  │ A2   │ N  │   free            │ │
//!   │ └────┴──────┴─┬──┴────────────┴────┴──────┴─▲──┴───────────────────┘ │
//!   │               └─────────── next ────────────┘                        │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   H = block header (size, MAGIC)      N = free node (size, next)
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   fitalloc
//!   ├── align      - Alignment macro (align!) and checked_align
//!   ├── region     - RegionProvider trait, Mmap and Heap providers, Region
//!   ├── block      - Block header codec
//!   ├── free_list  - Address-ordered intrusive free list
//!   ├── placement  - Policy and candidate selection
//!   ├── split      - Carving blocks off free nodes
//!   ├── coalesce   - Ordered insert and neighbour merging on free
//!   ├── dump       - Free list snapshots
//!   ├── config     - AllocatorConfig, NullFree
//!   ├── allocator  - FreeListAllocator
//!   └── manager    - MemoryManager, the init-once facade
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fitalloc::{AllocatorConfig, FreeListAllocator, Heap, Policy};
//!
//! let mut allocator =
//!   FreeListAllocator::with_provider(4096, AllocatorConfig::new(Policy::BestFit), Heap::default())
//!     .unwrap();
//!
//! let ptr = allocator.allocate(100).unwrap();
//!
//! unsafe {
//!   ptr.as_ptr().write_bytes(0xAB, 100);
//!   assert_eq!(*ptr.as_ptr().add(99), 0xAB);
//! }
//!
//! allocator.free(ptr.as_ptr()).unwrap();
//! println!("{}", allocator.dump());
//! ```
//!
//! ## How It Works
//!
//! An allocation of `n` bytes (rounded up to 4) needs a free node of at least
//! `n + HEADER_SIZE`. The chosen node is split: a header and the payload take
//! its front, and the remainder stays in the list in the node's place.
//!
//! ```text
//!   Single Allocation:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         User Data              │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: n         │  │  ┌──────────────────────────┐  │
//!   │  │ tag: MAGIC      │  │  │     n bytes usable       │  │
//!   │  └─────────────────┘  │  └──────────────────────────┘  │
//!   │   HEADER_SIZE bytes   │                                │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! Freeing checks the tag, turns the header back into a free node, inserts it
//! in address order and merges it with any touching free neighbour.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: the allocator is neither `Send` nor `Sync`
//! - **Fixed size**: the region never grows and is only returned on drop
//! - **4-byte alignment**: nothing stronger is guaranteed
//!
//! ## Safety
//!
//! Allocation and release are safe calls: every metadata access is bounds
//! checked against the region. Reading or writing through a returned pointer is
//! `unsafe` for the caller, and the pointer is only valid until it is freed or
//! the allocator is dropped.

pub mod align;
mod allocator;
mod block;
mod coalesce;
mod config;
mod dump;
mod error;
mod free_list;
mod manager;
mod placement;
mod region;
mod split;

pub use allocator::FreeListAllocator;
pub use block::{HEADER_SIZE, MAGIC};
pub use config::{AllocatorConfig, NullFree};
pub use dump::{Dump, DumpEntry};
pub use error::{ArgumentError, Error, ErrorKind, PointerFault, Result};
pub use manager::MemoryManager;
pub use placement::Policy;
#[cfg(unix)]
pub use region::Mmap;
pub use region::{DEFAULT_PAGE_SIZE, Heap, RegionProvider};
