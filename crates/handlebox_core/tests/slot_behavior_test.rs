//! # Slot Allocator Behaviour Tests
//!
//! Allocation, removal, generation wraparound, capacity limits and fixed
//! insertion in every order a replay can produce.
//!
//! Run with: `cargo test --package handlebox_core --test slot_behavior_test`

use handlebox_core::{
    ComponentStore, DenseComponentArray, Handle, HandleLayout, SlotAllocator, StandardLayout,
    WideTypeLayout,
};

type Basic = SlotAllocator<StandardLayout, i32>;
type Small = SlotAllocator<WideTypeLayout, i32>;

fn handle(index: usize) -> Handle {
    StandardLayout::make(index, 1, 2)
}

/// Replays `order` through fixed insertion, storing each index as the item.
fn add_fixed_in_order(m: &mut Basic, order: &[usize]) {
    for &index in order {
        let h = handle(index);
        assert_eq!(m.add_at_fixed_index(h, index as i32, 5), h);
        m.check_invariants().unwrap();
    }
    for &index in order {
        assert_eq!(m.get(handle(index)), Some(&(index as i32)));
    }
}

// ============================================================================
// BASIC LIFECYCLE
// ============================================================================

#[test]
fn test_reuse_scenario() {
    let mut m = Basic::new();

    let h1 = m.add(1, 5);
    assert_eq!(m.get(h1), Some(&1));

    m.remove(h1);
    assert_eq!(m.get(h1), None);

    let h2 = m.add(2, 5);
    assert_eq!(StandardLayout::index_of(h2), StandardLayout::index_of(h1));
    assert_ne!(StandardLayout::generation_of(h2), StandardLayout::generation_of(h1));
}

#[test]
fn test_add_remove_several() {
    let mut m = Basic::new();
    let h1 = m.add(2, 5);
    let h2 = m.add(3, 5);
    let h3 = m.add(4, 5);

    assert_eq!(m.get(h1), Some(&2));
    assert_eq!(m.get(h2), Some(&3));
    assert_eq!(m.get(h3), Some(&4));

    m.remove(h3);
    m.remove(h1);
    m.remove(h2);
    assert!(m.is_empty());
    m.check_invariants().unwrap();
}

#[test]
fn test_generation_overflow() {
    let cycles = 1usize << 16;
    let mut m = Basic::new();

    let mut previous = None;
    for _ in 0..cycles * 2 {
        let h = m.add(1, 5);
        assert_eq!(m.get(h), Some(&1));
        assert_eq!(StandardLayout::type_of(h), 5);
        assert_ne!(StandardLayout::generation_of(h), 0);
        assert_ne!(Some(StandardLayout::generation_of(h)), previous);
        previous = Some(StandardLayout::generation_of(h));
        m.remove(h);
    }
}

#[test]
fn test_element_limit() {
    let limit = 1usize << 16;
    let mut m = Small::new();

    for _ in 0..limit {
        assert!(m.add(1, 5).is_valid());
    }
    assert_eq!(m.add(1, 5), Handle::INVALID);
    assert_eq!(m.len(), limit);
    assert_eq!(m.slot_count(), limit);
}

#[test]
fn test_iteration_counts() {
    let mut m = Basic::new();
    m.add(1, 5);
    m.add(2, 5);
    m.add(3, 5);
    let to_remove = m.add(3, 5);
    m.remove(to_remove);

    let mut live = 0;
    m.for_each_live_entry(|is_live, _, _| {
        assert!(is_live);
        live += 1;
    });
    assert_eq!(live, 3);

    let mut all = 0;
    let mut flagged = 0;
    m.for_each_entry(|is_live, _, _| {
        all += 1;
        if is_live {
            flagged += 1;
        }
    });
    assert_eq!(all, m.slot_count());
    assert_eq!(flagged, 3);
}

// ============================================================================
// FIXED INSERTION
// ============================================================================

#[test]
fn test_add_fixed_single() {
    for index in [0, 1, 10] {
        let mut m = Basic::new();
        let h = StandardLayout::make(index, 3, 2);
        assert_eq!(m.add_at_fixed_index(h, 1, 5), h);
        assert_eq!(m.get(h), Some(&1));
        m.check_invariants().unwrap();
    }
}

#[test]
fn test_add_fixed_forward() {
    add_fixed_in_order(&mut Basic::new(), &[1, 2, 3]);
}

#[test]
fn test_add_fixed_forward_start_on_zero() {
    add_fixed_in_order(&mut Basic::new(), &[0, 1, 2]);
}

#[test]
fn test_add_fixed_reverse() {
    add_fixed_in_order(&mut Basic::new(), &[3, 2, 1]);
}

#[test]
fn test_add_fixed_turn() {
    add_fixed_in_order(&mut Basic::new(), &[3, 1, 2]);
}

#[test]
fn test_add_fixed_turn_on_zero() {
    add_fixed_in_order(&mut Basic::new(), &[3, 0, 1]);
}

#[test]
fn test_add_fixed_start_on_zero() {
    add_fixed_in_order(&mut Basic::new(), &[0, 3, 1]);
}

#[test]
fn test_add_fixed_mixed_with_normal() {
    let mut m = Basic::new();
    add_fixed_in_order(&mut m, &[1, 0, 2]);

    let normal0 = m.add(10, 5);
    let normal1 = m.add(11, 5);
    m.check_invariants().unwrap();

    assert_eq!(m.get(normal0), Some(&10));
    assert_eq!(m.get(normal1), Some(&11));
    assert_eq!(m.get(handle(0)), Some(&0));
    assert_eq!(m.get(handle(1)), Some(&1));
    assert_eq!(m.get(handle(2)), Some(&2));
    assert_eq!(m.len(), 5);
}

#[test]
fn test_add_fixed_remove_and_put_back() {
    let mut m = Basic::new();
    add_fixed_in_order(&mut m, &[1, 2, 3]);

    m.remove(handle(2));
    assert_eq!(m.get(handle(2)), None);
    assert_eq!(m.get(handle(1)), Some(&1));
    assert_eq!(m.get(handle(3)), Some(&3));

    assert_eq!(m.add_at_fixed_index(handle(2), 2, 5), handle(2));
    assert_eq!(m.get(handle(2)), Some(&2));
    m.check_invariants().unwrap();
}

#[test]
fn test_add_fixed_remove_all_and_put_back() {
    let mut m = Basic::new();
    add_fixed_in_order(&mut m, &[1, 2, 3]);

    for index in [2, 1, 3] {
        m.remove(handle(index));
    }
    for index in [1, 2, 3] {
        assert_eq!(m.get(handle(index)), None);
    }

    add_fixed_in_order(&mut m, &[1, 2, 3]);
    assert_eq!(m.len(), 3);
}

// ============================================================================
// COMPONENT STORES
// ============================================================================

#[test]
fn test_component_reverse_mapping() {
    let e1 = StandardLayout::make(0, 1, 2);
    let e2 = StandardLayout::make(1, 1, 2);

    let mut m: ComponentStore<StandardLayout, i32> = ComponentStore::new();
    let c1 = m.add(e1, 3, 1, true);
    let c2 = m.add(e2, 4, 1, true);
    let c3 = m.add(e2, 5, 1, false);

    assert_eq!(m.get_entity_handle(c1), e1);
    assert_eq!(m.get_entity_handle(c2), e2);
    assert_eq!(m.get_component_handle(e1), c1);
    assert_eq!(m.get_component_handle(e2), c2);
    assert_ne!(m.get_component_handle(e2), c3);

    assert_eq!(m.get_by_entity(e1), Some(&3));
    m.remove_by_entity(e1);
    assert_eq!(m.get_by_entity(e1), None);
    assert_eq!(m.get_by_entity(e2), Some(&4));
}

#[test]
fn test_component_clear() {
    let mut m: ComponentStore<StandardLayout, i32> = ComponentStore::new();
    let c1 = m.add(StandardLayout::make(0, 1, 2), 3, 1, false);
    let c2 = m.add(StandardLayout::make(1, 1, 2), 4, 1, false);
    m.clear();

    assert_eq!(m.get_by_component(c1), None);
    assert_eq!(m.get_by_component(c2), None);

    let mut live = 0;
    m.for_each_component(|is_live, _, _, _| {
        if is_live {
            live += 1;
        }
    });
    assert_eq!(live, 0);
}

#[test]
fn test_dense_basic_and_clear() {
    let e1 = StandardLayout::make(0, 1, 2);
    let e2 = StandardLayout::make(1, 1, 2);

    let mut m: DenseComponentArray<StandardLayout, i32> = DenseComponentArray::new();
    assert_eq!(m.add(e1, 3), e1);
    assert_eq!(m.add(e2, 4), e2);

    m.remove(e1);
    assert_eq!(m.get(e1), None);
    assert_eq!(m.get(e2), Some(&4));

    m.clear();
    assert_eq!(m.get(e2), None);
    let mut live = 0;
    m.for_each_component(|is_live, _, _, _| {
        if is_live {
            live += 1;
        }
    });
    assert_eq!(live, 0);
}
