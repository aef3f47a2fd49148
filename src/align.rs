/// Granule every payload size and payload address is rounded to.
pub const ALIGNMENT: usize = 4;

/// Rounds a value up to the allocation granule, or to the given power of two.
///
/// # Examples
///
/// ```rust
/// use fitalloc::align;
///
/// assert_eq!(align!(13), 16);
/// assert_eq!(align!(16), 16);
/// assert_eq!(align!(13, 8), 16);
/// assert_eq!(align!(4097, 4096), 8192);
/// ```
///
/// The addition can overflow; use [`checked_align`] for untrusted input.
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align!($value, $crate::align::ALIGNMENT)
  };
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

/// Overflow-checked [`align!`]. `align` must be a power of two.
pub fn checked_align(
  value: usize,
  align: usize,
) -> Option<usize> {
  debug_assert!(align.is_power_of_two());
  value.checked_add(align - 1).map(|v| v & !(align - 1))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align() {
    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (ALIGNMENT * i + 1)..=(ALIGNMENT * (i + 1));

      let expected_alignment = ALIGNMENT * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align!(size));
      }
    }
  }

  #[test]
  fn test_align_to_page() {
    assert_eq!(align!(1usize, 4096), 4096);
    assert_eq!(align!(4096usize, 4096), 4096);
    assert_eq!(align!(4097usize, 4096), 8192);
  }

  #[test]
  fn test_checked_align_overflow() {
    assert_eq!(checked_align(usize::MAX, 4), None);
    assert_eq!(checked_align(usize::MAX - 3, 4), Some(usize::MAX - 3));
    assert_eq!(checked_align(5, 4), Some(8));
  }
}
