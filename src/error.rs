//! Error types for region setup and block release.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Unified allocator error type.
///
/// Running out of space is not an error: [`allocate`](crate::FreeListAllocator::allocate)
/// reports it as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// Bad region size or policy, or a second initialization.
  #[error("invalid argument: {0}")]
  InvalidArgument(#[from] ArgumentError),

  /// The region provider could not supply the memory.
  #[error("region provider could not supply {requested} bytes")]
  ResourceExhausted { requested: usize },

  /// A release request for memory this allocator did not hand out.
  #[error("cannot free {address:#x}: {fault}")]
  InvalidPointer { address: usize, fault: PointerFault },

  /// An operation was attempted before initialization.
  #[error("allocator is not initialized")]
  Uninitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArgumentError {
  #[error("region size must be greater than zero")]
  ZeroRegion,

  #[error("region size {0} overflows when rounded up to the page size")]
  RegionTooLarge(usize),

  #[error("unknown placement policy selector {0}")]
  UnknownPolicy(i32),

  #[error("allocator is already initialized")]
  AlreadyInitialized,
}

/// Why a pointer was refused by `free`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PointerFault {
  #[error("null pointer")]
  Null,

  #[error("address lies outside the managed region")]
  OutOfRegion,

  #[error("address is not 4-byte aligned")]
  Misaligned,

  #[error("no valid block header precedes the address")]
  BadTag,

  #[error("block is already free")]
  AlreadyFree,

  #[error("recorded block size runs into free memory")]
  OverlapsFree,
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  InvalidArgument,
  ResourceExhausted,
  InvalidPointer,
  Uninitialized,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
      Error::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
      Error::InvalidPointer { .. } => ErrorKind::InvalidPointer,
      Error::Uninitialized => ErrorKind::Uninitialized,
    }
  }

  pub(crate) fn pointer(
    address: usize,
    fault: PointerFault,
  ) -> Self {
    Error::InvalidPointer { address, fault }
  }
}
