//! Returning a block to the free list and merging it with its neighbours.
//!
//! ```text
//!   free list:  [A] ─────────────▶ [C]
//!   memory:     │ A free │ B (freed) │ C free │
//!
//!   pass 1: B absorbs C       →  │ A free │ B+C free        │
//!   pass 2: A absorbs B+C     →  │ A+B+C free               │
//!   pass 3: no neighbour      →  done
//! ```

use tracing::trace;

use crate::{
  block::HEADER_SIZE,
  free_list::{FreeList, FreeNode, span_end},
  region::Region,
};

/// Inserts the span `[offset, offset + HEADER_SIZE + size)` as a free node and
/// coalesces until no free neighbour touches it. Returns the offset of the
/// node that finally holds the span.
pub fn release(
  region: &mut Region,
  list: &mut FreeList,
  offset: usize,
  size: usize,
) -> usize {
  let mut prev = list.insert(region, offset, size);
  trace!(at = offset, size, "inserted");

  let mut node = offset;
  while merge_once(region, list, &mut node, &mut prev) {}

  node
}

/// One merge step. Tries the memory successor first, then the list
/// predecessor; `node` and `prev` follow the merged span.
fn merge_once(
  region: &mut Region,
  list: &FreeList,
  node: &mut usize,
  prev: &mut Option<usize>,
) -> bool {
  let current = FreeNode::read(region, *node);

  if let Some(next) = current.next {
    if span_end(*node, current.size) == next {
      let absorbed = FreeNode::read(region, next);

      FreeNode {
        size: current.size + HEADER_SIZE + absorbed.size,
        next: absorbed.next,
      }
      .write(region, *node);
      region.zero(next, HEADER_SIZE);

      trace!(at = *node, absorbed = next, "merged with successor");
      return true;
    }
  }

  if let Some(before_at) = *prev {
    let before = FreeNode::read(region, before_at);

    if span_end(before_at, before.size) == *node {
      FreeNode {
        size: before.size + HEADER_SIZE + current.size,
        next: current.next,
      }
      .write(region, before_at);
      region.zero(*node, HEADER_SIZE);

      trace!(at = before_at, absorbed = *node, "merged into predecessor");
      *node = before_at;
      *prev = list.predecessor(region, before_at);
      return true;
    }
  }

  false
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::region::Heap;

  const H: usize = HEADER_SIZE;

  fn region() -> Region {
    Region::acquire(4096, Box::new(Heap::default())).unwrap()
  }

  fn nodes(
    list: &FreeList,
    region: &Region,
  ) -> Vec<(usize, usize)> {
    list.iter(region).map(|entry| (entry.offset, entry.size)).collect()
  }

  #[test]
  fn test_isolated_block_not_merged() {
    let mut region = region();
    let mut list = FreeList::default();
    list.insert(&mut region, 0, 64);
    list.insert(&mut region, 1024, 64);

    let at = release(&mut region, &mut list, 512, 32);

    assert_eq!(at, 512);
    assert_eq!(nodes(&list, &region), vec![(0, 64), (512, 32), (1024, 64)]);
  }

  #[test]
  fn test_merge_with_successor() {
    let mut region = region();
    let mut list = FreeList::default();
    list.insert(&mut region, 512 + H + 32, 100);

    let at = release(&mut region, &mut list, 512, 32);

    assert_eq!(at, 512);
    assert_eq!(nodes(&list, &region), vec![(512, 32 + H + 100)]);
  }

  #[test]
  fn test_merge_into_predecessor() {
    let mut region = region();
    let mut list = FreeList::default();
    list.insert(&mut region, 0, 64);
    list.insert(&mut region, 2048, 8);

    let at = release(&mut region, &mut list, H + 64, 40);

    assert_eq!(at, 0);
    assert_eq!(nodes(&list, &region), vec![(0, 64 + H + 40), (2048, 8)]);
    assert_eq!(region.read_word(H + 64), 0);
  }

  #[test]
  fn test_merge_both_sides() {
    let mut region = region();
    let mut list = FreeList::default();
    list.insert(&mut region, 0, 64);
    list.insert(&mut region, 2 * H + 64 + 40, 200);

    let at = release(&mut region, &mut list, H + 64, 40);

    assert_eq!(at, 0);
    assert_eq!(nodes(&list, &region), vec![(0, 64 + H + 40 + H + 200)]);
  }

  #[test]
  fn test_merge_deep_in_list() {
    let mut region = region();
    let mut list = FreeList::default();
    list.insert(&mut region, 0, 16);
    list.insert(&mut region, 512, 64);
    list.insert(&mut region, 512 + 2 * H + 64 + 40, 100);
    list.insert(&mut region, 3072, 8);

    let at = release(&mut region, &mut list, 512 + H + 64, 40);

    assert_eq!(at, 512);
    assert_eq!(
      nodes(&list, &region),
      vec![(0, 16), (512, 64 + H + 40 + H + 100), (3072, 8)]
    );
    assert_eq!(region.read_word(512 + H + 64), 0);
    assert_eq!(region.read_word(512 + 2 * H + 64 + 40), 0);
  }

  #[test]
  fn test_new_head() {
    let mut region = region();
    let mut list = FreeList::default();
    list.insert(&mut region, 1024, 16);

    release(&mut region, &mut list, 0, 16);

    assert_eq!(list.head(), Some(0));
    assert_eq!(nodes(&list, &region), vec![(0, 16), (1024, 16)]);
  }

  #[test]
  fn test_into_empty_list() {
    let mut region = region();
    let mut list = FreeList::default();

    release(&mut region, &mut list, 4096 - H - 16, 16);

    assert_eq!(nodes(&list, &region), vec![(4096 - H - 16, 16)]);
  }
}
