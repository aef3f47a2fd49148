use std::{io::Read, ptr::NonNull};

use fitalloc::{AllocatorConfig, FreeListAllocator, Policy};
use tracing_subscriber::{EnvFilter, fmt};

/// Waits for ENTER when `FITALLOC_STEP` is set, so the region can be
/// inspected with `pmap` or `gdb` between steps.
fn step() {
  if std::env::var_os("FITALLOC_STEP").is_some() {
    println!("\n>>> Press ENTER to continue...");
    let _ = std::io::stdin().bytes().next();
  }
}

fn print_alloc(
  label: &str,
  size: usize,
  block: Option<NonNull<u8>>,
) {
  match block {
    Some(ptr) => println!("{label}: allocated {size} bytes at {ptr:?}"),
    None => println!("{label}: no free block can hold {size} bytes"),
  }
}

fn main() {
  fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let policy = match std::env::args().nth(1).as_deref() {
    Some("best") => Policy::BestFit,
    Some("worst") => Policy::WorstFit,
    _ => Policy::FirstFit,
  };

  let mut allocator = match FreeListAllocator::new(4096, AllocatorConfig::new(policy)) {
    Ok(allocator) => allocator,
    Err(err) => {
      eprintln!("cannot set up allocator: {err}");
      std::process::exit(1);
    }
  };

  println!(
    "[0] {policy} allocator over {} bytes at {:?}",
    allocator.region_len(),
    allocator.base()
  );
  print!("{}", allocator.dump());
  step();

  // ----------------------------------------------------------------------
  // 1) Carve three blocks off the single free node.
  // ----------------------------------------------------------------------
  let first = allocator.allocate(100);
  print_alloc("[1] first", 100, first);
  let second = allocator.allocate(52);
  print_alloc("[1] second", 52, second);
  let third = allocator.allocate(200);
  print_alloc("[1] third", 200, third);

  if let Some(ptr) = second {
    unsafe { ptr.as_ptr().write_bytes(0xAB, 52) };
    println!("[1] filled second block with 0xAB");
  }

  print!("{}", allocator.dump());
  step();

  // ----------------------------------------------------------------------
  // 2) Free the first block. It is not adjacent to any free node, so the
  //    list now holds two nodes.
  // ----------------------------------------------------------------------
  if let Some(ptr) = first {
    if let Err(err) = allocator.free(ptr.as_ptr()) {
      println!("[2] free failed: {err}");
    }
  }
  println!("\n[2] freed first block");
  print!("{}", allocator.dump());
  step();

  // ----------------------------------------------------------------------
  // 3) A small request. The policy decides whether the hole left by the
  //    first block or the tail is used.
  // ----------------------------------------------------------------------
  let small = allocator.allocate(20);
  print_alloc("\n[3] small", 20, small);
  println!("[3] reused first block? {}", small.is_some() && small == first);
  print!("{}", allocator.dump());
  step();

  // ----------------------------------------------------------------------
  // 4) Freeing an address the allocator never returned is refused.
  // ----------------------------------------------------------------------
  let mut local = 0u32;
  match allocator.free(&mut local as *mut u32 as *mut u8) {
    Ok(()) => println!("\n[4] unexpected success"),
    Err(err) => println!("\n[4] {err}"),
  }
  step();

  // ----------------------------------------------------------------------
  // 5) Free everything; the free list collapses back into one node.
  // ----------------------------------------------------------------------
  for ptr in [second, third, small].into_iter().flatten() {
    if let Err(err) = allocator.free(ptr.as_ptr()) {
      println!("[5] free failed: {err}");
    }
  }
  println!("\n[5] freed all blocks");
  print!("{}", allocator.dump());

  println!("\n[6] End of example. The region is unmapped when the allocator is dropped.");
}
