//! DHAT heap profiler for flatbst.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use flatbst::{FlatBst, HandleRepr, Less};

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Random inserts and erases over `universe` keys, roughly half resident.
fn churn_workload<I: HandleRepr>(
    tree: &mut FlatBst<u64, Less, I>,
    operations: usize,
    universe: u64,
    seed: u64,
) {
    let mut rng = XorShift64::new(seed);
    for _ in 0..operations {
        let key = rng.next_u64() % universe;
        if rng.next_u64() % 2 == 0 {
            let _ = tree.try_insert(key);
        } else {
            tree.erase(&key);
        }
    }
}

/// Point lookups; should not allocate at all.
fn lookup_workload<I: HandleRepr>(tree: &FlatBst<u64, Less, I>, operations: usize, universe: u64) {
    let mut rng = XorShift64::new(7);
    let mut hits = 0usize;
    for _ in 0..operations {
        let key = rng.next_u64() % universe;
        if tree.find(&key).is_some() {
            hits += 1;
        }
        let _ = tree.lower_bound(&key);
    }
    println!("  Lookup hits: {hits}/{operations}");
}

fn report<I: HandleRepr>(tree: &FlatBst<u64, Less, I>) {
    println!(
        "  len={} holes={} slots={} height={} approx_bytes={}",
        tree.len(),
        tree.holes(),
        tree.slot_count(),
        tree.height(),
        tree.approx_bytes()
    );
}

fn profile_incremental() {
    println!("=== Profiling incremental inserts (u32 handles) ===");
    let operations = 100_000;
    let universe = 16_384;

    let mut tree: FlatBst<u64> = FlatBst::new();
    churn_workload(&mut tree, operations, universe, 42);
    report(&tree);
    lookup_workload(&tree, operations, universe);
}

fn profile_bulk_build() {
    println!("=== Profiling bulk build and rebalance ===");
    let size = 65_536u64;

    let mut rng = XorShift64::new(99);
    let unsorted: Vec<u64> = (0..size).map(|_| rng.next_u64() % (size * 4)).collect();
    let mut tree: FlatBst<u64> = unsorted.into_iter().collect();
    report(&tree);

    churn_workload(&mut tree, 50_000, size * 4, 3);
    report(&tree);

    tree.rebalance();
    report(&tree);
}

fn profile_narrow_handles() {
    println!("=== Profiling u16 handles ===");
    let mut tree: FlatBst<u64, Less, u16> = FlatBst::default();
    tree.reserve(FlatBst::<u64, Less, u16>::max_slots());

    churn_workload(&mut tree, 100_000, 2_048, 11);
    report(&tree);
    tree.rebuild_compact();
    report(&tree);
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("flatbst DHAT Heap Profiling");
    println!("===========================\n");

    profile_incremental();
    profile_bulk_build();
    profile_narrow_handles();

    println!("\n===========================");
    println!("Profiling complete!");
    println!(
        "View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>"
    );
}
