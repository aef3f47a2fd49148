//! The single byte range an allocator manages, and where it comes from.
//!
//! ```text
//!   Region (page-rounded, page-aligned, zero-filled)
//!
//!   base                                                          base + len
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │ offset 0 ...                                                      │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything else in the crate addresses the region by offset and reads or
//! writes metadata one bounds-checked word at a time.

use std::{alloc, fmt, ptr::NonNull};

use tracing::debug;

use crate::{
  align::checked_align,
  block::{HEADER_SIZE, WORD},
  error::{ArgumentError, Error, Result},
};

/// Page size used when the OS will not tell us.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Supplier of the backing memory.
///
/// # Safety
///
/// A pointer returned by [`map`](RegionProvider::map) must be page-aligned,
/// point to at least `len` zero-filled writable bytes, and stay valid until the
/// matching [`unmap`](RegionProvider::unmap). [`page_size`](RegionProvider::page_size)
/// must be a power of two no smaller than [`HEADER_SIZE`].
pub unsafe trait RegionProvider {
  fn page_size(&self) -> usize;

  fn map(
    &mut self,
    len: usize,
  ) -> Option<NonNull<u8>>;

  /// # Safety
  ///
  /// `base` and `len` must come from a previous successful `map` on this
  /// provider, and nothing may touch the bytes afterwards.
  unsafe fn unmap(
    &mut self,
    base: NonNull<u8>,
    len: usize,
  );
}

/// Anonymous private `mmap(2)`.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct Mmap;

#[cfg(unix)]
unsafe impl RegionProvider for Mmap {
  fn page_size(&self) -> usize {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

    if size > 0 { size as usize } else { DEFAULT_PAGE_SIZE }
  }

  fn map(
    &mut self,
    len: usize,
  ) -> Option<NonNull<u8>> {
    let address = unsafe {
      libc::mmap(
        std::ptr::null_mut(),
        len,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if address == libc::MAP_FAILED {
      debug!(len, error = %std::io::Error::last_os_error(), "mmap failed");
      return None;
    }

    NonNull::new(address.cast::<u8>())
  }

  unsafe fn unmap(
    &mut self,
    base: NonNull<u8>,
    len: usize,
  ) {
    unsafe {
      libc::munmap(base.as_ptr().cast(), len);
    }
  }
}

/// Zeroed memory from the global allocator, aligned to a chosen page size.
///
/// Portable, and gives tests a fixed page size.
#[derive(Debug, Clone, Copy)]
pub struct Heap {
  page_size: usize,
}

impl Heap {
  /// # Panics
  ///
  /// If `page_size` is not a power of two or is smaller than [`HEADER_SIZE`].
  pub fn new(page_size: usize) -> Self {
    assert!(
      page_size.is_power_of_two() && page_size >= HEADER_SIZE,
      "page size {page_size} must be a power of two of at least {HEADER_SIZE}"
    );
    Self { page_size }
  }
}

impl Default for Heap {
  fn default() -> Self {
    Self::new(DEFAULT_PAGE_SIZE)
  }
}

unsafe impl RegionProvider for Heap {
  fn page_size(&self) -> usize {
    self.page_size
  }

  fn map(
    &mut self,
    len: usize,
  ) -> Option<NonNull<u8>> {
    let layout = alloc::Layout::from_size_align(len, self.page_size).ok()?;

    NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
  }

  unsafe fn unmap(
    &mut self,
    base: NonNull<u8>,
    len: usize,
  ) {
    if let Ok(layout) = alloc::Layout::from_size_align(len, self.page_size) {
      unsafe { alloc::dealloc(base.as_ptr(), layout) };
    }
  }
}

/// Owned, page-rounded byte range. Returned to its provider on drop.
pub struct Region {
  base: NonNull<u8>,
  len: usize,
  provider: Box<dyn RegionProvider>,
}

impl Region {
  /// Rounds `requested` up to the provider's page size and maps that many bytes.
  pub fn acquire(
    requested: usize,
    mut provider: Box<dyn RegionProvider>,
  ) -> Result<Self> {
    if requested == 0 {
      return Err(ArgumentError::ZeroRegion.into());
    }

    let page_size = provider.page_size();
    let len = checked_align(requested, page_size).ok_or(ArgumentError::RegionTooLarge(requested))?;

    let base = provider.map(len).ok_or(Error::ResourceExhausted { requested: len })?;

    debug!(requested, len, page_size, base = ?base, "region acquired");

    Ok(Self { base, len, provider })
  }

  pub fn base(&self) -> NonNull<u8> {
    self.base
  }

  pub fn address(&self) -> usize {
    self.base.as_ptr() as usize
  }

  pub fn len(&self) -> usize {
    self.len
  }

  /// Offset of `address` within the region, if it falls inside it.
  pub fn offset_of(
    &self,
    address: usize,
  ) -> Option<usize> {
    address.checked_sub(self.address()).filter(|offset| *offset < self.len)
  }

  pub(crate) fn ptr_at(
    &self,
    offset: usize,
  ) -> NonNull<u8> {
    assert!(offset < self.len, "offset {offset} outside region of {} bytes", self.len);
    unsafe { self.base.add(offset) }
  }

  pub(crate) fn read_word(
    &self,
    offset: usize,
  ) -> usize {
    self.check_word(offset);
    unsafe { self.base.as_ptr().add(offset).cast::<usize>().read_unaligned() }
  }

  pub(crate) fn write_word(
    &mut self,
    offset: usize,
    value: usize,
  ) {
    self.check_word(offset);
    unsafe { self.base.as_ptr().add(offset).cast::<usize>().write_unaligned(value) }
  }

  pub(crate) fn zero(
    &mut self,
    offset: usize,
    len: usize,
  ) {
    assert!(offset.checked_add(len).is_some_and(|end| end <= self.len));
    unsafe { self.base.as_ptr().add(offset).write_bytes(0, len) }
  }

  fn check_word(
    &self,
    offset: usize,
  ) {
    assert!(
      offset.checked_add(WORD).is_some_and(|end| end <= self.len),
      "word at offset {offset} outside region of {} bytes",
      self.len
    );
  }
}

impl Drop for Region {
  fn drop(&mut self) {
    unsafe { self.provider.unmap(self.base, self.len) };
  }
}

impl fmt::Debug for Region {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Region").field("base", &self.base).field("len", &self.len).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Exhausted;

  unsafe impl RegionProvider for Exhausted {
    fn page_size(&self) -> usize {
      DEFAULT_PAGE_SIZE
    }

    fn map(
      &mut self,
      _len: usize,
    ) -> Option<NonNull<u8>> {
      None
    }

    unsafe fn unmap(
      &mut self,
      _base: NonNull<u8>,
      _len: usize,
    ) {
    }
  }

  #[test]
  fn test_rounds_to_page() {
    let region = Region::acquire(1, Box::new(Heap::default())).unwrap();
    assert_eq!(region.len(), 4096);

    let region = Region::acquire(4097, Box::new(Heap::default())).unwrap();
    assert_eq!(region.len(), 8192);
    assert_eq!(region.address() % 4096, 0);
  }

  #[test]
  fn test_zero_filled_and_word_access() {
    let mut region = Region::acquire(4096, Box::new(Heap::new(1024))).unwrap();
    assert_eq!(region.len(), 4096);
    assert_eq!(region.read_word(100), 0);

    region.write_word(6, 0xDEAD_BEEF);
    assert_eq!(region.read_word(6), 0xDEAD_BEEF);

    region.zero(6, WORD);
    assert_eq!(region.read_word(6), 0);
  }

  #[test]
  fn test_offset_of() {
    let region = Region::acquire(4096, Box::new(Heap::default())).unwrap();
    let base = region.address();

    assert_eq!(region.offset_of(base), Some(0));
    assert_eq!(region.offset_of(base + 4095), Some(4095));
    assert_eq!(region.offset_of(base + 4096), None);
    assert_eq!(region.offset_of(base.wrapping_sub(1)), None);
  }

  #[test]
  fn test_zero_size_rejected() {
    let err = Region::acquire(0, Box::new(Heap::default())).unwrap_err();
    assert_eq!(err, Error::InvalidArgument(ArgumentError::ZeroRegion));
  }

  #[test]
  fn test_rounding_overflow_rejected() {
    let err = Region::acquire(usize::MAX, Box::new(Heap::default())).unwrap_err();
    assert_eq!(err, Error::InvalidArgument(ArgumentError::RegionTooLarge(usize::MAX)));
  }

  #[test]
  fn test_provider_failure() {
    let err = Region::acquire(4096, Box::new(Exhausted)).unwrap_err();
    assert_eq!(err, Error::ResourceExhausted { requested: 4096 });
  }

  #[cfg(unix)]
  #[test]
  fn test_mmap_region() {
    let mut region = Region::acquire(10_000, Box::new(Mmap)).unwrap();
    let page_size = Mmap.page_size();

    assert_eq!(region.len() % page_size, 0);
    assert!(region.len() >= 10_000);
    assert_eq!(region.address() % page_size, 0);

    region.write_word(region.len() - WORD, 7);
    assert_eq!(region.read_word(region.len() - WORD), 7);
  }

  #[cfg(all(unix, target_pointer_width = "64"))]
  #[test]
  fn test_mmap_exhausted() {
    let err = Region::acquire(1 << 62, Box::new(Mmap)).unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::ResourceExhausted);
  }
}
