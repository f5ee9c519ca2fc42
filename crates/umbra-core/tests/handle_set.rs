//! HandleSet generational handle tests.
//!
//! These tests verify correct behavior of the generational HandleSet,
//! including generation counter increments, stale handle rejection,
//! and slot reuse.

use umbra_core::alloc::{Handle, HandleSet};

#[test]
fn test_push_and_get() {
    let mut set = HandleSet::new();

    let idx = set.push(42);
    assert_eq!(set.get(idx), Some(&42));

    let idx2 = set.push(100);
    assert_eq!(set.get(idx2), Some(&100));

    // Original value should still be accessible
    assert_eq!(set.get(idx), Some(&42));
}

#[test]
fn test_get_mut() {
    let mut set = HandleSet::new();

    let idx = set.push(42);
    if let Some(value) = set.get_mut(idx) {
        *value = 100;
    }

    assert_eq!(set.get(idx), Some(&100));
}

#[test]
fn test_remove_reuses_slot_with_new_generation() {
    let mut set = HandleSet::new();
    let idx = set.push(15);
    assert_eq!(set.remove(idx), Some(15));

    let new_idx = set.push(45);
    assert_eq!(idx.index(), new_idx.index());
    assert_ne!(idx.generation(), new_idx.generation());

    // The old handle must not see the new occupant.
    assert_eq!(set.get(idx), None);
    assert_eq!(set.get(new_idx), Some(&45));
}

#[test]
fn test_double_remove_is_none() {
    let mut set = HandleSet::new();
    let idx = set.push("light");
    assert!(set.remove(idx).is_some());
    assert!(set.remove(idx).is_none());
    assert!(set.is_empty());
}

#[test]
fn test_iter_with_handles_round_trips() {
    let mut set = HandleSet::new();
    let handles: Vec<Handle> = (0..5).map(|i| set.push(i * 10)).collect();
    set.remove(handles[2]);

    let seen: Vec<(Handle, i32)> = set.iter_with_handles().map(|(h, v)| (h, *v)).collect();
    assert_eq!(seen.len(), 4);
    for (handle, value) in seen {
        assert_eq!(set.get(handle), Some(&value));
    }
}

#[test]
fn test_clear() {
    let mut set = HandleSet::new();
    let a = set.push(1);
    set.push(2);
    set.clear();

    assert!(set.is_empty());
    assert_eq!(set.get(a), None);
    assert_eq!(set.iter().count(), 0);
}
