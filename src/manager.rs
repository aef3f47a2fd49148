//! Init-once facade with integer policy selectors.
//!
//! ```text
//!   MemoryManager::init(size, policy)   ─▶  FreeListAllocator (held inside)
//!   MemoryManager::alloc(size)          ─▶  allocate
//!   MemoryManager::free(ptr)            ─▶  free
//!   MemoryManager::dump()               ─▶  dump, or empty before init
//! ```

use std::ptr::NonNull;

use crate::{
  allocator::FreeListAllocator,
  config::AllocatorConfig,
  dump::Dump,
  error::{ArgumentError, Error, Result},
  placement::Policy,
  region::RegionProvider,
};

#[cfg(unix)]
use crate::region::Mmap;

/// Holds at most one allocator for its whole life.
#[derive(Debug)]
pub struct MemoryManager<P> {
  provider: P,
  config: AllocatorConfig,
  allocator: Option<FreeListAllocator>,
}

#[cfg(unix)]
impl MemoryManager<Mmap> {
  pub fn new() -> Self {
    Self::with_provider(Mmap)
  }
}

#[cfg(unix)]
impl Default for MemoryManager<Mmap> {
  fn default() -> Self {
    Self::new()
  }
}

impl<P: RegionProvider + Clone + 'static> MemoryManager<P> {
  pub fn with_provider(provider: P) -> Self {
    Self {
      provider,
      config: AllocatorConfig::default(),
      allocator: None,
    }
  }

  /// Settings applied at [`init`](Self::init). The policy comes from `init`.
  pub fn with_config(
    mut self,
    config: AllocatorConfig,
  ) -> Self {
    self.config = config;
    self
  }

  /// Acquires the region. `policy` is 1 (best-fit), 2 (worst-fit) or
  /// 3 (first-fit). Succeeds at most once.
  pub fn init(
    &mut self,
    region_size: usize,
    policy: i32,
  ) -> Result<()> {
    if region_size == 0 {
      return Err(ArgumentError::ZeroRegion.into());
    }

    let policy = Policy::try_from(policy)?;

    if self.allocator.is_some() {
      return Err(ArgumentError::AlreadyInitialized.into());
    }

    let config = self.config.with_policy(policy);
    self.allocator = Some(FreeListAllocator::with_provider(
      region_size,
      config,
      self.provider.clone(),
    )?);

    Ok(())
  }

  pub fn alloc(
    &mut self,
    size: usize,
  ) -> Result<Option<NonNull<u8>>> {
    Ok(self.allocator_mut()?.allocate(size))
  }

  pub fn free(
    &mut self,
    ptr: *mut u8,
  ) -> Result<()> {
    self.allocator_mut()?.free(ptr)
  }
}

impl<P> MemoryManager<P> {
  pub fn is_initialized(&self) -> bool {
    self.allocator.is_some()
  }

  pub fn allocator(&self) -> Option<&FreeListAllocator> {
    self.allocator.as_ref()
  }

  /// Free list snapshot; empty before initialization.
  pub fn dump(&self) -> Dump {
    self.allocator.as_ref().map(FreeListAllocator::dump).unwrap_or_default()
  }

  fn allocator_mut(&mut self) -> Result<&mut FreeListAllocator> {
    self.allocator.as_mut().ok_or(Error::Uninitialized)
  }
}
