//! Example walking through the core FlatBst operations.
//!
//! Run with: cargo run --example basic_usage

use flatbst::builder::FlatBstBuilder;
use flatbst::{FlatBst, Greater};

fn main() {
    println!("=== FlatBst Examples ===\n");

    // Example 1: Incremental inserts
    println!("1. Insert and find");
    let mut tree: FlatBst<i32> = FlatBst::new();
    for v in [5, 2, 8, 1, 3, 7, 9] {
        tree.insert(v);
    }
    let (_, inserted) = tree.insert(3);
    println!("   inserted duplicate 3? {inserted}");
    println!("   contains 7? {}", tree.contains(&7));
    println!("   sorted: {:?}", tree.to_sorted_vec());
    println!();

    // Example 2: Ordered queries
    println!("2. Bounds");
    let lb = tree.get(tree.lower_bound(&4)).copied();
    let ub = tree.get(tree.upper_bound(&8)).copied();
    let past = tree.lower_bound(&10);
    println!("   lower_bound(4): {lb:?}");
    println!("   upper_bound(8): {ub:?}");
    println!("   lower_bound(10) is none? {}", past.is_none());
    println!();

    // Example 3: Erase a node with two children
    println!("3. Erase");
    tree.erase(&2);
    println!("   after erase(2): {:?}", tree.to_sorted_vec());
    println!("   len={} holes={}", tree.len(), tree.holes());
    println!();

    // Example 4: Traversals
    println!("4. Traversals of a balanced build");
    let balanced: FlatBst<i32> = (1..=7).collect();
    let mut pre = Vec::new();
    let mut post = Vec::new();
    balanced.for_each_preorder(|v| pre.push(*v));
    balanced.for_each_postorder(|v| post.push(*v));
    println!("   preorder:  {pre:?}");
    println!("   postorder: {post:?}");
    println!("   height: {}", balanced.height());
    println!();

    // Example 5: Custom ordering via the builder
    println!("5. Descending tree");
    let desc = match FlatBstBuilder::new()
        .capacity(16)
        .comparator(Greater)
        .try_build_from::<i32, u32, _>([3, 1, 4, 1, 5, 9, 2, 6])
    {
        Ok(tree) => tree,
        Err(err) => panic!("{err}"),
    };
    println!("   sorted: {:?}", desc.to_sorted_vec());
}

// Expected output:
// === FlatBst Examples ===
//
// 1. Insert and find
//    inserted duplicate 3? false
//    contains 7? true
//    sorted: [1, 2, 3, 5, 7, 8, 9]
//
// 2. Bounds
//    lower_bound(4): Some(5)
//    upper_bound(8): Some(9)
//    lower_bound(10) is none? true
//
// 3. Erase
//    after erase(2): [1, 3, 5, 7, 8, 9]
//    len=6 holes=1
//
// 4. Traversals of a balanced build
//    preorder:  [4, 2, 1, 3, 6, 5, 7]
//    postorder: [1, 3, 2, 5, 7, 6, 4]
//    height: 3
//
// 5. Descending tree
//    sorted: [9, 6, 5, 4, 3, 2, 1]
