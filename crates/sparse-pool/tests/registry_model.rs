//! Integration test: handle registry against a reference model.
//!
//! Random insert/remove/get sequences run against both a
//! [`HandleRegistry`] and [`ModelRegistry`]. After every step the two must
//! agree on contents, slot assignment and pool bookkeeping, and the handle
//! map must pass its own consistency check.

use proptest::prelude::*;
use sparse_pool::{Handle, HandleRegistry, Insertion, MapConfig, PoolConfig, RegistryConfig};
use sparse_pool_test_utils::{ops, ModelRegistry, Op};

const RECORD_SIZE: usize = 16;

fn record(handle: u64, fill: u8) -> [u8; RECORD_SIZE] {
    let mut bytes = [fill; RECORD_SIZE];
    bytes[..8].copy_from_slice(&handle.to_le_bytes());
    bytes
}

fn small_registry() -> HandleRegistry {
    HandleRegistry::new(RegistryConfig {
        pool: PoolConfig::new(RECORD_SIZE as u32).with_initial_capacity(1),
        map: MapConfig::new(1),
    })
    .unwrap()
}

fn check_agreement(reg: &HandleRegistry, model: &ModelRegistry) {
    assert_eq!(reg.len(), model.len());
    assert_eq!(reg.pool().len(), model.len());
    assert_eq!(reg.pool().high_water_mark(), model.high_water_mark());
    assert!(reg.map().is_consistent());
    for handle in model.handles() {
        assert_eq!(reg.get(Handle(handle)), model.get(handle));
        assert_eq!(
            reg.slot_of(Handle(handle)).map(|s| s.0),
            model.slot_of(handle)
        );
    }
}

// ── Model-based property tests ──────────────────────────────────────

#[cfg(not(miri))]
proptest! {
    #[test]
    fn registry_matches_model(steps in ops(48, 400)) {
        let mut reg = small_registry();
        let mut model = ModelRegistry::new(RECORD_SIZE);

        for op in steps {
            match op {
                Op::Insert { handle, fill } => {
                    let bytes = record(handle, fill);
                    let got = reg.insert(Handle(handle), &bytes).unwrap();
                    let (slot, replaced) = model.insert(handle, &bytes);
                    let expected = if replaced {
                        Insertion::Replaced(slot.into())
                    } else {
                        Insertion::Inserted(slot.into())
                    };
                    prop_assert_eq!(got, expected);
                }
                Op::Remove { handle } => {
                    let got = reg.remove(Handle(handle)).unwrap().map(|s| s.0);
                    prop_assert_eq!(got, model.remove(handle));
                }
                Op::Get { handle } => {
                    prop_assert_eq!(reg.get(Handle(handle)), model.get(handle));
                    prop_assert_eq!(reg.contains(Handle(handle)), model.get(handle).is_some());
                }
            }
            check_agreement(&reg, &model);
        }

        let expected = model.records_by_slot();
        let mut finalized = Vec::new();
        reg.destroy_with(|bytes| finalized.push(bytes.to_vec()));
        prop_assert_eq!(finalized, expected);
    }

    #[test]
    fn iter_visits_every_registered_handle_once(steps in ops(32, 200)) {
        let mut reg = small_registry();
        let mut model = ModelRegistry::new(RECORD_SIZE);
        for op in steps {
            match op {
                Op::Insert { handle, fill } => {
                    let bytes = record(handle, fill);
                    reg.insert(Handle(handle), &bytes).unwrap();
                    model.insert(handle, &bytes);
                }
                Op::Remove { handle } => {
                    reg.remove(Handle(handle)).unwrap();
                    model.remove(handle);
                }
                Op::Get { .. } => {}
            }
        }

        let mut seen: Vec<u64> = reg.iter().map(|(h, _)| h.0).collect();
        seen.sort_unstable();
        let mut expected: Vec<u64> = model.handles().collect();
        expected.sort_unstable();
        prop_assert_eq!(seen, expected);
    }
}

// ── Deterministic edge cases ────────────────────────────────────────

#[test]
fn reinsert_after_remove_takes_fresh_lifo_slot() {
    let mut reg = small_registry();
    let mut model = ModelRegistry::new(RECORD_SIZE);
    let handles = [0x1000u64, 0x2000, 0x3000, 0x4000];
    for &h in &handles {
        reg.insert(Handle(h), &record(h, 1)).unwrap();
        model.insert(h, &record(h, 1));
    }
    for &h in &handles[1..3] {
        reg.remove(Handle(h)).unwrap();
        model.remove(h);
    }
    // 0x3000's slot was freed last, so it is handed out first.
    let got = reg.insert(Handle(0x2000), &record(0x2000, 2)).unwrap();
    let (slot, _) = model.insert(0x2000, &record(0x2000, 2));
    assert_eq!(got, Insertion::Inserted(slot.into()));
    assert_eq!(slot, 2);
    check_agreement(&reg, &model);
}

#[test]
fn handle_zero_is_an_ordinary_key() {
    let mut reg = small_registry();
    reg.insert(Handle(0), &record(0, 7)).unwrap();
    reg.insert(Handle(8), &record(8, 8)).unwrap();
    assert_eq!(reg.get(Handle(0)), Some(&record(0, 7)[..]));
    assert_eq!(reg.remove(Handle(0)).unwrap().map(|s| s.0), Some(0));
    assert!(!reg.contains(Handle(0)));
    assert!(reg.contains(Handle(8)));
}
