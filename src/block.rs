use std::mem;

use crate::region::Region;

/// Width of every metadata field.
pub const WORD: usize = mem::size_of::<usize>();

/// Bytes taken by a block header. A free node has the same footprint.
pub const HEADER_SIZE: usize = 2 * WORD;

/// Validity tag written into every live header. Odd, so it never equals a
/// free node's `next` offset, which is always a multiple of 4.
pub const MAGIC: usize = 1234567;

/// Metadata immediately before an allocated payload.
///
/// ```text
///   offset        offset + WORD    offset + HEADER_SIZE
///   ┌─────────────┬───────────────┬──────────────────────────┐
///   │ size        │ tag (MAGIC)   │ payload (size bytes)     │
///   └─────────────┴───────────────┴──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
  pub size: usize,
  pub tag: usize,
}

impl BlockHeader {
  pub fn new(size: usize) -> Self {
    Self { size, tag: MAGIC }
  }

  pub fn read(
    region: &Region,
    offset: usize,
  ) -> Self {
    Self {
      size: region.read_word(offset),
      tag: region.read_word(offset + WORD),
    }
  }

  pub fn write(
    self,
    region: &mut Region,
    offset: usize,
  ) {
    region.write_word(offset, self.size);
    region.write_word(offset + WORD, self.tag);
  }

  pub fn is_valid(&self) -> bool {
    self.tag == MAGIC
  }
}
