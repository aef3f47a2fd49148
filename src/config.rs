use crate::placement::Policy;

/// What `free(null)` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullFree {
  /// Succeeds without touching anything.
  #[default]
  Ignore,
  /// Fails with [`PointerFault::Null`](crate::PointerFault::Null).
  Reject,
}

/// Allocator settings, fixed at initialization.
///
/// ```rust
/// use fitalloc::{AllocatorConfig, NullFree, Policy};
///
/// let config = AllocatorConfig::default()
///   .with_policy(Policy::BestFit)
///   .with_null_free(NullFree::Reject)
///   .with_split_threshold(32);
///
/// assert_eq!(config.policy, Policy::BestFit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocatorConfig {
  pub policy: Policy,
  pub null_free: NullFree,
  /// Smallest remainder kept as its own free node when a block is split.
  /// Zero keeps every remainder, including empty ones.
  pub split_threshold: usize,
}

impl AllocatorConfig {
  pub fn new(policy: Policy) -> Self {
    Self {
      policy,
      ..Self::default()
    }
  }

  pub fn with_policy(
    mut self,
    policy: Policy,
  ) -> Self {
    self.policy = policy;
    self
  }

  pub fn with_null_free(
    mut self,
    null_free: NullFree,
  ) -> Self {
    self.null_free = null_free;
    self
  }

  pub fn with_split_threshold(
    mut self,
    split_threshold: usize,
  ) -> Self {
    self.split_threshold = split_threshold;
    self
  }
}
