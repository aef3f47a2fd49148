use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::{
  align::{ALIGNMENT, checked_align},
  block::{BlockHeader, HEADER_SIZE},
  coalesce,
  config::{AllocatorConfig, NullFree},
  dump::Dump,
  error::{Error, PointerFault, Result},
  free_list::FreeList,
  placement::Policy,
  region::{Region, RegionProvider},
  split::split,
};

#[cfg(unix)]
use crate::region::Mmap;

/// Free-list allocator over one fixed region.
///
/// The region is returned to its provider when the allocator is dropped, so
/// every pointer it handed out dies with it.
#[derive(Debug)]
pub struct FreeListAllocator {
  region: Region,
  free: FreeList,
  config: AllocatorConfig,
}

impl FreeListAllocator {
  /// Maps `region_size` bytes (rounded up to the page size) with `mmap(2)`.
  #[cfg(unix)]
  pub fn new(
    region_size: usize,
    config: AllocatorConfig,
  ) -> Result<Self> {
    Self::with_provider(region_size, config, Mmap)
  }

  pub fn with_provider(
    region_size: usize,
    config: AllocatorConfig,
    provider: impl RegionProvider + 'static,
  ) -> Result<Self> {
    let mut region = Region::acquire(region_size, Box::new(provider))?;
    let free = FreeList::seed(&mut region);

    debug!(
      base = ?region.base(),
      len = region.len(),
      policy = %config.policy,
      "allocator initialized"
    );

    Ok(Self { region, free, config })
  }

  /// Returns a 4-byte aligned block of at least `size` bytes, or `None` when
  /// `size` is zero or no free block is large enough.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    if size == 0 {
      trace!("zero-size request rejected");
      return None;
    }

    let size = checked_align(size, ALIGNMENT)?;
    let needed = size.checked_add(HEADER_SIZE)?;

    let policy = if self.free.is_single(&self.region) {
      Policy::FirstFit
    } else {
      self.config.policy
    };

    let Some(candidate) = policy.select(&self.free, &self.region, needed) else {
      trace!(size, %policy, "no free block large enough");
      return None;
    };

    let payload = split(
      &mut self.region,
      &mut self.free,
      candidate,
      size,
      self.config.split_threshold,
    );

    trace!(size, offset = payload, %policy, "allocated");

    Some(self.region.ptr_at(payload))
  }

  /// Returns a block to the free list.
  ///
  /// Fails with [`Error::InvalidPointer`] and changes nothing when `ptr` was
  /// not handed out by this allocator or is already free. A null `ptr` is
  /// handled per [`NullFree`].
  pub fn free(
    &mut self,
    ptr: *mut u8,
  ) -> Result<()> {
    let Some((offset, header)) = self.validate(ptr)? else {
      return Ok(());
    };

    let at = coalesce::release(&mut self.region, &mut self.free, offset, header.size);
    trace!(offset, size = header.size, merged_at = at, "freed");

    Ok(())
  }

  /// Locates the header for `ptr`, touching nothing.
  fn validate(
    &self,
    ptr: *mut u8,
  ) -> Result<Option<(usize, BlockHeader)>> {
    let address = ptr as usize;
    let reject = |fault: PointerFault| {
      debug!(address, %fault, "free rejected");
      Error::pointer(address, fault)
    };

    if ptr.is_null() {
      return match self.config.null_free {
        NullFree::Ignore => Ok(None),
        NullFree::Reject => Err(reject(PointerFault::Null)),
      };
    }

    let payload = self
      .region
      .offset_of(address)
      .filter(|offset| *offset >= HEADER_SIZE)
      .ok_or_else(|| reject(PointerFault::OutOfRegion))?;

    if payload % ALIGNMENT != 0 {
      return Err(reject(PointerFault::Misaligned));
    }

    let offset = payload - HEADER_SIZE;

    if self.free.containing(&self.region, offset).is_some() {
      return Err(reject(PointerFault::AlreadyFree));
    }

    let header = BlockHeader::read(&self.region, offset);
    let in_bounds = payload
      .checked_add(header.size)
      .is_some_and(|end| end <= self.region.len());

    if !header.is_valid() || !in_bounds || header.size % ALIGNMENT != 0 {
      return Err(reject(PointerFault::BadTag));
    }

    if self
      .free
      .overlapping(&self.region, offset, payload + header.size)
      .is_some()
    {
      return Err(reject(PointerFault::OverlapsFree));
    }

    Ok(Some((offset, header)))
  }

  /// Snapshot of the free list.
  pub fn dump(&self) -> Dump {
    Dump::capture(&self.free, &self.region)
  }

  pub fn policy(&self) -> Policy {
    self.config.policy
  }

  pub fn config(&self) -> &AllocatorConfig {
    &self.config
  }

  pub fn base(&self) -> NonNull<u8> {
    self.region.base()
  }

  pub fn region_len(&self) -> usize {
    self.region.len()
  }

  pub fn contains(
    &self,
    ptr: *const u8,
  ) -> bool {
    self.region.offset_of(ptr as usize).is_some()
  }

  /// Free bytes across all nodes, excluding node footprints.
  pub fn free_bytes(&self) -> usize {
    self.free.iter(&self.region).map(|entry| entry.size).sum()
  }

  pub fn free_blocks(&self) -> usize {
    self.free.iter(&self.region).count()
  }
}
