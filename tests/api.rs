#[test]
fn is_usable_in_const_contexts() {
    const _ALLOCATOR1: chunkalloc::Allocator<32> = chunkalloc::Allocator::new();
    static _ALLOCATOR2: chunkalloc::Allocator<32, 4> = chunkalloc::Allocator::new();
}

#[test]
fn fresh_allocator_is_fully_free() {
    let allocator = chunkalloc::Allocator::<64>::new();
    assert_eq!(allocator.capacity(), 64);
    assert_eq!(allocator.free_bytes(), 64);
    assert_eq!(allocator.allocated_bytes(), 0);
}

#[test]
#[should_panic(expected = "arena capacity must not be zero")]
fn arena_capacity_of_zero_is_rejected() {
    let _allocator = chunkalloc::Allocator::<0>::new(); // panic here
}

#[test]
#[should_panic(expected = "chunk capacity must not be zero")]
fn chunk_capacity_of_zero_is_rejected() {
    let _allocator = chunkalloc::Allocator::<32, 0>::new(); // panic here
}

#[test]
#[should_panic(expected = "chunk list capacity exceeded")]
fn exhausting_the_bookkeeping_slots_is_fatal() {
    let mut allocator = chunkalloc::Allocator::<64, 2>::new();
    allocator.alloc(1).unwrap();
    allocator.alloc(1).unwrap();
    allocator.alloc(1).unwrap(); // panic here
}
