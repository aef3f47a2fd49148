//! Placement policies: which free node serves a request.
//!
//! ```text
//!   free list:   [100] ──▶ [52] ──▶ [200]      request fits all three
//!
//!   FirstFit  →  [100]   first in address order
//!   BestFit   →  [52]    smallest that fits
//!   WorstFit  →  [200]   largest that fits
//! ```
//!
//! Ties go to the node met first, i.e. the lowest address.

use std::{cmp::Reverse, fmt};

use crate::{
  error::ArgumentError,
  free_list::{Entry, FreeList},
  region::Region,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Policy {
  BestFit = 1,
  WorstFit = 2,
  #[default]
  FirstFit = 3,
}

impl Policy {
  /// The integer selector accepted by [`TryFrom<i32>`].
  pub fn selector(self) -> i32 {
    self as i32
  }

  /// Picks the node to carve `needed` bytes (payload plus header) from.
  pub(crate) fn select(
    self,
    list: &FreeList,
    region: &Region,
    needed: usize,
  ) -> Option<Entry> {
    let mut fits = list.iter(region).filter(|entry| entry.size >= needed);

    match self {
      Policy::FirstFit => fits.next(),
      Policy::BestFit => fits.min_by_key(|entry| entry.size),
      Policy::WorstFit => fits.max_by_key(|entry| (entry.size, Reverse(entry.offset))),
    }
  }
}

impl TryFrom<i32> for Policy {
  type Error = ArgumentError;

  fn try_from(selector: i32) -> Result<Self, Self::Error> {
    match selector {
      1 => Ok(Policy::BestFit),
      2 => Ok(Policy::WorstFit),
      3 => Ok(Policy::FirstFit),
      other => Err(ArgumentError::UnknownPolicy(other)),
    }
  }
}

impl fmt::Display for Policy {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let name = match self {
      Policy::BestFit => "best-fit",
      Policy::WorstFit => "worst-fit",
      Policy::FirstFit => "first-fit",
    };
    f.write_str(name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::region::Heap;

  /// Nodes at 0, 512, 1024, 1536 with the given sizes.
  fn list_of(sizes: &[usize]) -> (Region, FreeList) {
    let mut region = Region::acquire(4096, Box::new(Heap::default())).unwrap();
    let mut list = FreeList::default();

    for (i, size) in sizes.iter().enumerate() {
      list.insert(&mut region, i * 512, *size);
    }

    (region, list)
  }

  fn pick(
    policy: Policy,
    sizes: &[usize],
    needed: usize,
  ) -> Option<usize> {
    let (region, list) = list_of(sizes);
    policy.select(&list, &region, needed).map(|entry| entry.offset)
  }

  #[test]
  fn test_policies_pick_expected_block() {
    let sizes = [100, 52, 200];

    assert_eq!(pick(Policy::FirstFit, &sizes, 40), Some(0));
    assert_eq!(pick(Policy::BestFit, &sizes, 40), Some(512));
    assert_eq!(pick(Policy::WorstFit, &sizes, 40), Some(1024));
  }

  #[test]
  fn test_only_fitting_nodes_considered() {
    let sizes = [32, 300, 64, 80];

    assert_eq!(pick(Policy::FirstFit, &sizes, 60), Some(512));
    assert_eq!(pick(Policy::BestFit, &sizes, 60), Some(1024));
    assert_eq!(pick(Policy::WorstFit, &sizes, 60), Some(512));
  }

  #[test]
  fn test_ties_go_to_lowest_address() {
    let sizes = [64, 128, 64, 128];

    assert_eq!(pick(Policy::BestFit, &sizes, 16), Some(0));
    assert_eq!(pick(Policy::WorstFit, &sizes, 16), Some(512));
  }

  #[test]
  fn test_no_fit() {
    for policy in [Policy::FirstFit, Policy::BestFit, Policy::WorstFit] {
      assert_eq!(pick(policy, &[16, 32], 33), None);
      assert_eq!(pick(policy, &[], 1), None);
    }
  }

  #[test]
  fn test_selectors() {
    for policy in [Policy::BestFit, Policy::WorstFit, Policy::FirstFit] {
      assert_eq!(Policy::try_from(policy.selector()), Ok(policy));
    }
    assert_eq!(Policy::try_from(0), Err(ArgumentError::UnknownPolicy(0)));
    assert_eq!(Policy::try_from(4), Err(ArgumentError::UnknownPolicy(4)));
    assert_eq!(Policy::BestFit.to_string(), "best-fit");
  }
}
