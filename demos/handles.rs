//! Example showing handle lifetimes and narrow handle types.
//!
//! Run with: cargo run --example handles

use flatbst::error::HandleError;
use flatbst::{FlatBst, Less};

fn main() {
    println!("=== Handle Lifetimes ===\n");

    // Example 1: Handles survive unrelated mutations
    println!("1. Stable handles");
    let mut tree: FlatBst<&str> = FlatBst::new();
    let (kiwi, _) = tree.insert("kiwi");
    tree.insert("apple");
    tree.insert("plum");
    tree.erase(&"apple");
    println!("   kiwi handle: {kiwi:?} -> {:?}", tree.get(kiwi));
    println!();

    // Example 2: Erase stales a handle, even after slot reuse
    println!("2. Stale after erase");
    tree.erase(&"kiwi");
    let (fig, _) = tree.insert("fig");
    println!("   fig reused position {}? {}", kiwi.position(), fig.position() == kiwi.position());
    println!("   kiwi handle: {kiwi:?} -> {:?}", tree.get(kiwi));
    match tree.try_get(kiwi) {
        Err(HandleError::Stale { .. }) => println!("   try_get reports: stale"),
        other => println!("   try_get reports: {other:?}"),
    }
    println!();

    // Example 3: Rebuilds retire every handle
    println!("3. Rebalance");
    let before = tree.find_handle(&"fig");
    tree.rebalance();
    let after = tree.find_handle(&"fig");
    println!("   old handle live? {}", tree.contains_handle(before));
    println!("   new handle: {after:?}");
    println!();

    // Example 4: 8-bit handles address 63 slots
    println!("4. u8 handles");
    let mut small: FlatBst<u32, Less, u8> = FlatBst::default();
    println!("   max_slots: {}", FlatBst::<u32, Less, u8>::max_slots());
    for v in 0..63 {
        small.insert(v);
    }
    match small.try_insert(63) {
        Ok(_) => println!("   insert 64th: ok"),
        Err(err) => println!("   insert 64th: {err}"),
    }
    small.erase(&10);
    println!("   after erase, insert 64th ok? {}", small.try_insert(63).is_ok());
}

// Expected output:
// === Handle Lifetimes ===
//
// 1. Stable handles
//    kiwi handle: Handle(0#0) -> Some("kiwi")
//
// 2. Stale after erase
//    fig reused position 0? true
//    kiwi handle: Handle(0#0) -> None
//    try_get reports: stale
//
// 3. Rebalance
//    old handle live? false
//    new handle: Handle(1#2)
//
// 4. u8 handles
//    max_slots: 63
//    insert 64th: slot arena index overflow: at most 63 slots are addressable
//    after erase, insert 64th ok? true
