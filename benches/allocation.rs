#![feature(test)]
extern crate test;
use test::Bencher;

mod repeated_allocation_release {
    use super::*;

    /// Run a benchmark, which repeatedly allocates and releases a block of
    /// the same size. The benchmark will perform the given amount of
    /// allocations beforehand (before running the actual benchmark), so
    /// both the coalescing pass and the first-fit scan run against a
    /// populated allocator.
    ///
    /// # Panics
    /// This will panic, if the requested pre-allocations fill up the whole
    /// arena (so the actual benchmark cannot allocate blocks anymore).
    fn benchmark_with_preallocation(b: &mut Bencher, pre_allocations: usize) {
        let mut allocator = chunkalloc::Allocator::<8192>::new();
        // pre-allocate many blocks to see the real impact of the list walks
        for _ in 0..pre_allocations {
            allocator.alloc(1).unwrap();
        }

        // make sure, that there is enough room for the next allocation
        let ptr = allocator.alloc(1).unwrap();
        allocator.release(ptr);

        // run actual benchmark: allocate & release the same block repeatedly
        b.iter(|| {
            let ptr = allocator.alloc(1).unwrap();
            let ptr = test::black_box(ptr);
            allocator.release(ptr);
        });
    }

    #[bench]
    fn no_memory_usage(b: &mut Bencher) {
        benchmark_with_preallocation(b, 0);
    }

    #[bench]
    fn low_memory_usage(b: &mut Bencher) {
        benchmark_with_preallocation(b, 8);
    }

    #[bench]
    fn medium_memory_usage(b: &mut Bencher) {
        benchmark_with_preallocation(b, 510);
    }

    #[bench]
    fn high_memory_usage(b: &mut Bencher) {
        benchmark_with_preallocation(b, 1020);
    }
}
