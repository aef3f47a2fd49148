//! Address-ordered free list stored inside the free memory itself.
//!
//! ```text
//!   head
//!    │
//!    ▼
//!   ┌──────┬──────┬─────────┐   ┌─────────┐   ┌──────┬──────┬──────────────┐
//!   │ size │ next │  free   │   │  block  │   │ size │ next │    free      │
//!   └──────┴──┬───┴─────────┘   └─────────┘   └──────┴──┬───┴──────────────┘
//!             └───────────────────────────────▲          └──▶ none
//! ```
//!
//! A node at offset `o` with free size `s` spans `[o, o + HEADER_SIZE + s)`.

use crate::{
  block::{HEADER_SIZE, WORD},
  region::Region,
};

/// Stored in the `next` word of the last node.
const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeNode {
  pub size: usize,
  pub next: Option<usize>,
}

impl FreeNode {
  pub fn read(
    region: &Region,
    offset: usize,
  ) -> Self {
    let next = region.read_word(offset + WORD);

    Self {
      size: region.read_word(offset),
      next: (next != NIL).then_some(next),
    }
  }

  pub fn write(
    self,
    region: &mut Region,
    offset: usize,
  ) {
    region.write_word(offset, self.size);
    region.write_word(offset + WORD, self.next.unwrap_or(NIL));
  }
}

/// First byte past a node.
pub fn span_end(
  offset: usize,
  size: usize,
) -> usize {
  offset + HEADER_SIZE + size
}

/// A node as seen during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
  pub prev: Option<usize>,
  pub offset: usize,
  pub size: usize,
  pub next: Option<usize>,
}

impl Entry {
  pub fn end(&self) -> usize {
    span_end(self.offset, self.size)
  }

  pub fn contains(
    &self,
    offset: usize,
  ) -> bool {
    self.offset <= offset && offset < self.end()
  }
}

#[derive(Debug, Default)]
pub struct FreeList {
  head: Option<usize>,
}

impl FreeList {
  /// One node covering the whole region.
  pub fn seed(region: &mut Region) -> Self {
    FreeNode {
      size: region.len() - HEADER_SIZE,
      next: None,
    }
    .write(region, 0);

    Self { head: Some(0) }
  }

  #[cfg(test)]
  pub fn head(&self) -> Option<usize> {
    self.head
  }

  pub fn iter<'a>(
    &self,
    region: &'a Region,
  ) -> Iter<'a> {
    Iter {
      region,
      prev: None,
      cursor: self.head,
    }
  }

  /// Whether the list holds exactly one node.
  pub fn is_single(
    &self,
    region: &Region,
  ) -> bool {
    self.head.is_some_and(|head| FreeNode::read(region, head).next.is_none())
  }

  /// Points `prev` (or the head, when `prev` is `None`) at `next`.
  pub fn relink(
    &mut self,
    region: &mut Region,
    prev: Option<usize>,
    next: Option<usize>,
  ) {
    match prev {
      None => self.head = next,
      Some(prev) => {
        let mut node = FreeNode::read(region, prev);
        node.next = next;
        node.write(region, prev);
      }
    }
  }

  /// Writes a node at `offset` and splices it in address order.
  /// Returns its predecessor.
  pub fn insert(
    &mut self,
    region: &mut Region,
    offset: usize,
    size: usize,
  ) -> Option<usize> {
    let mut prev = None;
    let mut cursor = self.head;

    while let Some(current) = cursor {
      if current > offset {
        break;
      }
      prev = Some(current);
      cursor = FreeNode::read(region, current).next;
    }

    FreeNode { size, next: cursor }.write(region, offset);
    self.relink(region, prev, Some(offset));

    prev
  }

  pub fn predecessor(
    &self,
    region: &Region,
    offset: usize,
  ) -> Option<usize> {
    self.iter(region).find(|entry| entry.offset == offset).and_then(|entry| entry.prev)
  }

  /// The node whose span covers `offset`, if any.
  pub fn containing(
    &self,
    region: &Region,
    offset: usize,
  ) -> Option<Entry> {
    self
      .iter(region)
      .take_while(|entry| entry.offset <= offset)
      .find(|entry| entry.contains(offset))
  }

  /// The first node whose span intersects `[start, end)`, if any.
  pub fn overlapping(
    &self,
    region: &Region,
    start: usize,
    end: usize,
  ) -> Option<Entry> {
    self
      .iter(region)
      .take_while(|entry| entry.offset < end)
      .find(|entry| entry.end() > start)
  }
}

pub struct Iter<'a> {
  region: &'a Region,
  prev: Option<usize>,
  cursor: Option<usize>,
}

impl Iterator for Iter<'_> {
  type Item = Entry;

  fn next(&mut self) -> Option<Self::Item> {
    let offset = self.cursor?;
    let node = FreeNode::read(self.region, offset);

    let entry = Entry {
      prev: self.prev,
      offset,
      size: node.size,
      next: node.next,
    };

    self.prev = Some(offset);
    self.cursor = node.next;

    Some(entry)
  }
}
