//! Carving an allocated block off the front of a free node.
//!
//! ```text
//!   before:  ┌────────┬──────────────────────────────────────────────┐
//!            │ node   │ free (S)                                     │
//!            └────────┴──────────────────────────────────────────────┘
//!            o
//!   after:   ┌────────┬───────────────┬────────┬─────────────────────┐
//!            │ header │ payload (n)   │ node   │ free (S - n - H)    │
//!            └────────┴───────────────┴────────┴─────────────────────┘
//!            o        o + H           o + H + n
//! ```

use tracing::trace;

use crate::{
  block::{BlockHeader, HEADER_SIZE},
  free_list::{Entry, FreeList, FreeNode},
  region::Region,
};

/// Allocates `size` payload bytes out of `candidate` and returns the payload
/// offset.
///
/// The caller guarantees `candidate.size >= size + HEADER_SIZE`. A remainder
/// smaller than `threshold` is not kept as a node; the block absorbs it.
pub fn split(
  region: &mut Region,
  list: &mut FreeList,
  candidate: Entry,
  size: usize,
  threshold: usize,
) -> usize {
  debug_assert!(candidate.size >= size + HEADER_SIZE);

  let remainder = candidate.size - size - HEADER_SIZE;

  let payload_size = if remainder >= threshold {
    let offset = candidate.offset + HEADER_SIZE + size;

    FreeNode {
      size: remainder,
      next: candidate.next,
    }
    .write(region, offset);
    list.relink(region, candidate.prev, Some(offset));

    trace!(at = candidate.offset, size, remainder, "split");
    size
  } else {
    list.relink(region, candidate.prev, candidate.next);

    trace!(at = candidate.offset, size = candidate.size, "whole node taken");
    candidate.size
  };

  BlockHeader::new(payload_size).write(region, candidate.offset);

  candidate.offset + HEADER_SIZE
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::region::Heap;

  fn setup() -> (Region, FreeList) {
    let mut region = Region::acquire(4096, Box::new(Heap::default())).unwrap();
    let list = FreeList::seed(&mut region);
    (region, list)
  }

  fn head_entry(
    list: &FreeList,
    region: &Region,
  ) -> Entry {
    list.iter(region).next().unwrap()
  }

  #[test]
  fn test_split_leaves_remainder_in_place() {
    let (mut region, mut list) = setup();
    let candidate = head_entry(&list, &region);

    let payload = split(&mut region, &mut list, candidate, 100, 0);
    assert_eq!(payload, HEADER_SIZE);

    let header = BlockHeader::read(&region, 0);
    assert!(header.is_valid());
    assert_eq!(header.size, 100);

    let rest: Vec<_> = list.iter(&region).collect();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].offset, HEADER_SIZE + 100);
    assert_eq!(rest[0].size, 4096 - 2 * HEADER_SIZE - 100);
    assert_eq!(rest[0].end(), 4096);
  }

  #[test]
  fn test_split_preserves_links() {
    let mut region = Region::acquire(4096, Box::new(Heap::default())).unwrap();
    let mut list = FreeList::default();
    list.insert(&mut region, 0, 200);
    list.insert(&mut region, 1024, 200);
    list.insert(&mut region, 2048, 200);

    let middle = list.iter(&region).nth(1).unwrap();
    let payload = split(&mut region, &mut list, middle, 40, 0);
    assert_eq!(payload, 1024 + HEADER_SIZE);

    let offsets: Vec<_> = list.iter(&region).map(|e| e.offset).collect();
    assert_eq!(offsets, vec![0, 1024 + HEADER_SIZE + 40, 2048]);
  }

  #[test]
  fn test_exact_fit_keeps_empty_node() {
    let (mut region, mut list) = setup();
    let candidate = head_entry(&list, &region);
    let size = candidate.size - HEADER_SIZE;

    split(&mut region, &mut list, candidate, size, 0);

    let rest: Vec<_> = list.iter(&region).collect();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].size, 0);
    assert_eq!(rest[0].offset, 4096 - HEADER_SIZE);
  }

  #[test]
  fn test_small_remainder_absorbed_above_threshold() {
    let (mut region, mut list) = setup();
    let candidate = head_entry(&list, &region);
    let size = candidate.size - HEADER_SIZE - 32;

    split(&mut region, &mut list, candidate, size, 64);

    assert_eq!(list.head(), None);
    assert_eq!(BlockHeader::read(&region, 0).size, candidate.size);
  }
}
