//! Integration test: pool growth and slot stability.
//!
//! A pool must keep every slot index and record intact across any number
//! of capacity doublings, keep records at their declared alignment after
//! the storage moves, and hand freed slots back most-recent-first.

use sparse_pool::{Pool, PoolError, Record, RecordPool, SlotIndex};

// ── Growth ──────────────────────────────────────────────────────────

#[test]
fn two_record_pool_grows_on_third_push() {
    let mut pool = Pool::with_layout(2, 4, 1).unwrap();
    let a = pool.push(&0xAAAA_AAAAu32.to_le_bytes()).unwrap();
    let b = pool.push(&0xBBBB_BBBBu32.to_le_bytes()).unwrap();
    assert_eq!(pool.capacity(), 2);

    let c = pool.push(&0xCCCC_CCCCu32.to_le_bytes()).unwrap();
    assert_eq!((a, b, c), (SlotIndex(0), SlotIndex(1), SlotIndex(2)));
    assert_eq!(pool.capacity(), 4);
    assert_eq!(pool.record(a), &0xAAAA_AAAAu32.to_le_bytes()[..]);
    assert_eq!(pool.record(b), &0xBBBB_BBBBu32.to_le_bytes()[..]);
    assert_eq!(pool.record(c), &0xCCCC_CCCCu32.to_le_bytes()[..]);
}

#[test]
fn records_survive_many_doublings() {
    let mut pool = Pool::with_layout(1, 8, 8).unwrap();
    let slots: Vec<SlotIndex> = (0..10_000u64)
        .map(|i| pool.push(&(i * 31).to_le_bytes()).unwrap())
        .collect();
    assert_eq!(pool.capacity(), 16_384);
    for (i, slot) in slots.into_iter().enumerate() {
        assert_eq!(slot, SlotIndex(i as u32));
        let mut out = [0u8; 8];
        pool.read(slot, &mut out);
        assert_eq!(u64::from_le_bytes(out), i as u64 * 31);
    }
}

#[test]
fn alignment_holds_after_growth() {
    let mut pool = Pool::with_layout(1, 3, 64).unwrap();
    assert_eq!(pool.stride(), 64);
    for i in 0..100u8 {
        pool.push(&[i; 3]).unwrap();
    }
    for i in 0..100u32 {
        let ptr = pool.record(SlotIndex(i)).as_ptr() as usize;
        assert_eq!(ptr % 64, 0, "slot {i} misaligned");
    }
}

#[test]
fn freed_slots_reused_before_growth() {
    let mut pool = Pool::with_layout(4, 2, 1).unwrap();
    for i in 0..4u16 {
        pool.push(&i.to_le_bytes()).unwrap();
    }
    pool.free(SlotIndex(0)).unwrap();
    pool.free(SlotIndex(3)).unwrap();

    assert_eq!(pool.push(&[9, 9]).unwrap(), SlotIndex(3));
    assert_eq!(pool.push(&[8, 8]).unwrap(), SlotIndex(0));
    assert_eq!(pool.capacity(), 4);
    assert_eq!(pool.push(&[7, 7]).unwrap(), SlotIndex(4));
    assert_eq!(pool.capacity(), 8);
}

// ── Checked access ──────────────────────────────────────────────────

#[test]
fn checked_access_reports_dead_and_out_of_range_slots() {
    let mut pool = Pool::with_layout(2, 4, 4).unwrap();
    let slot = pool.push(&[1, 2, 3, 4]).unwrap();
    pool.free(slot).unwrap();

    assert_eq!(pool.try_record(slot), Err(PoolError::SlotNotLive { slot }));
    assert_eq!(pool.try_free(slot), Err(PoolError::SlotNotLive { slot }));
    assert_eq!(
        pool.try_record(SlotIndex(5)),
        Err(PoolError::SlotOutOfRange {
            slot: SlotIndex(5),
            high_water_mark: 1,
        })
    );
}

// ── Typed records ───────────────────────────────────────────────────

/// Vertex-like record: position plus a packed colour.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Vertex {
    pos: [f32; 3],
    rgba: u32,
}

impl Record for Vertex {
    const SIZE: u32 = 16;
    const ALIGN: u32 = 16;

    fn encode(&self, out: &mut [u8]) {
        for (chunk, v) in out[..12].chunks_exact_mut(4).zip(self.pos) {
            v.encode(chunk);
        }
        self.rgba.encode(&mut out[12..]);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut pos = [0f32; 3];
        for (v, chunk) in pos.iter_mut().zip(bytes[..12].chunks_exact(4)) {
            *v = f32::decode(chunk);
        }
        Self {
            pos,
            rgba: u32::decode(&bytes[12..]),
        }
    }
}

#[test]
fn typed_pool_growth_keeps_values() {
    let mut pool = RecordPool::<Vertex>::new(2).unwrap();
    let verts: Vec<Vertex> = (0..50u32)
        .map(|i| Vertex {
            pos: [i as f32, -(i as f32), 0.5],
            rgba: 0xFF00_0000 | i,
        })
        .collect();
    let slots: Vec<_> = verts.iter().map(|v| pool.push(v).unwrap()).collect();
    assert_eq!(pool.as_pool().capacity(), 64);
    for (slot, v) in slots.into_iter().zip(&verts) {
        assert_eq!(pool.get(slot), *v);
    }
}
