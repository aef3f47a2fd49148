use std::fmt;

use crate::{free_list::FreeList, region::Region};

/// One free node, as reported by [`Dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpEntry {
  /// Offset of the node from the region base.
  pub offset: usize,
  pub address: usize,
  /// Free bytes after the node's own footprint.
  pub size: usize,
  /// Address of the next free node.
  pub next: Option<usize>,
}

/// Snapshot of the free list in address order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dump {
  pub entries: Vec<DumpEntry>,
}

impl Dump {
  pub(crate) fn capture(
    list: &FreeList,
    region: &Region,
  ) -> Self {
    let base = region.address();

    let entries = list
      .iter(region)
      .map(|entry| DumpEntry {
        offset: entry.offset,
        address: base + entry.offset,
        size: entry.size,
        next: entry.next.map(|next| base + next),
      })
      .collect();

    Self { entries }
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn free_bytes(&self) -> usize {
    self.entries.iter().map(|entry| entry.size).sum()
  }
}

impl fmt::Display for Dump {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    if self.entries.is_empty() {
      return writeln!(f, "free list empty");
    }

    for entry in &self.entries {
      write!(f, "node {:#x} (+{}): {} bytes free, next ", entry.address, entry.offset, entry.size)?;
      match entry.next {
        Some(next) => writeln!(f, "{next:#x}")?,
        None => writeln!(f, "none")?,
      }
    }

    Ok(())
  }
}
