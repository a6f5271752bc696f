//! Robin Hood hash map from opaque 64-bit handles to `u32` values.
//!
//! [`SparseMap`] is an open-addressing table with linear probing. Each
//! occupied bucket records its distance from the key's ideal bucket; inserts
//! displace residents that sit closer to home than the incoming entry, and
//! removals shift the following run back by one instead of leaving
//! tombstones. Together these keep every probe sequence short and let
//! lookups stop early on a miss.

use std::fmt;
use std::mem;

use crate::bits::ideal_bucket;
use crate::config::MapConfig;
use crate::error::MapError;

/// One table bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Bucket {
    key: u64,
    value: u32,
    /// Distance from the key's ideal bucket.
    probe: u8,
    occupied: bool,
}

impl Bucket {
    const EMPTY: Self = Self {
        key: 0,
        value: 0,
        probe: 0,
        occupied: false,
    };
}

/// Outcome of a read-only insertion probe.
enum Plan {
    /// The key is present at this bucket.
    Update(usize),
    /// The key is absent and fits without overflowing a probe distance.
    Insert,
    /// Inserting would push some entry past `u8::MAX` buckets from home.
    Overflow,
}

/// Largest entry count allowed in a table of `capacity` buckets
/// (`floor(capacity * 0.8)`).
fn max_load(capacity: usize) -> usize {
    capacity / 5 * 4 + capacity % 5 * 4 / 5
}

fn allocate_buckets(capacity: usize) -> Result<Vec<Bucket>, MapError> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(capacity)
        .map_err(|_| MapError::OutOfMemory {
            requested_buckets: capacity,
        })?;
    buckets.resize(capacity, Bucket::EMPTY);
    Ok(buckets)
}

/// Robin Hood placement of a key known to be absent.
///
/// Returns `false` if some carried entry would exceed the maximum probe
/// distance; the table is then partially rearranged and must be discarded.
fn place(buckets: &mut [Bucket], mask: usize, mut key: u64, mut value: u32) -> bool {
    let mut i = ideal_bucket(key, mask);
    let mut dist = 0u8;
    loop {
        let bucket = &mut buckets[i];
        if !bucket.occupied {
            *bucket = Bucket {
                key,
                value,
                probe: dist,
                occupied: true,
            };
            return true;
        }
        if bucket.probe < dist {
            mem::swap(&mut bucket.key, &mut key);
            mem::swap(&mut bucket.value, &mut value);
            mem::swap(&mut bucket.probe, &mut dist);
        }
        dist = match dist.checked_add(1) {
            Some(d) => d,
            None => return false,
        };
        i = (i + 1) & mask;
    }
}

/// Open-addressing map from 64-bit handles to `u32` values.
///
/// Capacity is always a power of two and the load factor never exceeds 0.8
/// after an insert. Growth rehashes into a fresh table of twice the size;
/// if allocation fails the map is left untouched.
pub struct SparseMap {
    buckets: Vec<Bucket>,
    mask: usize,
    count: usize,
}

impl SparseMap {
    /// Create a map from a validated configuration.
    pub fn new(config: MapConfig) -> Result<Self, MapError> {
        config.validate()?;
        Ok(Self {
            buckets: allocate_buckets(config.initial_capacity)?,
            mask: config.initial_capacity - 1,
            count: 0,
        })
    }

    /// Create a map with `capacity` buckets, which must be a power of two.
    pub fn with_capacity(capacity: usize) -> Result<Self, MapError> {
        Self::new(MapConfig::new(capacity))
    }

    /// Associate `value` with `key`.
    ///
    /// Returns the previous value if the key was already present; the entry
    /// count is unchanged in that case. A new key that would push the load
    /// factor past 0.8 first doubles the table.
    pub fn insert(&mut self, key: u64, value: u32) -> Result<Option<u32>, MapError> {
        loop {
            match self.plan_insert(key) {
                Plan::Update(i) => {
                    return Ok(Some(mem::replace(&mut self.buckets[i].value, value)));
                }
                Plan::Insert if self.count < max_load(self.capacity()) => {
                    let placed = place(&mut self.buckets, self.mask, key, value);
                    debug_assert!(placed, "insert plan and placement disagree");
                    self.count += 1;
                    return Ok(None);
                }
                Plan::Insert => self.grow()?,
                Plan::Overflow => {
                    tracing::trace!(key, capacity = self.capacity(), "probe distance overflow");
                    self.grow()?;
                }
            }
        }
    }

    /// Look up the value for `key`.
    #[inline]
    pub fn get(&self, key: u64) -> Option<u32> {
        self.find(key).map(|i| self.buckets[i].value)
    }

    /// Whether `key` is present.
    #[inline]
    pub fn contains_key(&self, key: u64) -> bool {
        self.find(key).is_some()
    }

    /// Remove `key`, returning its value.
    ///
    /// The following run of displaced entries is shifted back one bucket, so
    /// no tombstone is left behind.
    pub fn remove(&mut self, key: u64) -> Option<u32> {
        let mut hole = self.find(key)?;
        let value = self.buckets[hole].value;
        self.buckets[hole] = Bucket::EMPTY;

        let mut next = (hole + 1) & self.mask;
        while self.buckets[next].occupied && self.buckets[next].probe > 0 {
            let mut moved = self.buckets[next];
            moved.probe -= 1;
            self.buckets[hole] = moved;
            self.buckets[next] = Bucket::EMPTY;
            hole = next;
            next = (next + 1) & self.mask;
        }

        self.count -= 1;
        Some(value)
    }

    /// Remove every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.buckets.fill(Bucket::EMPTY);
        self.count = 0;
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Entries per bucket.
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u32)> + '_ {
        self.buckets
            .iter()
            .filter(|b| b.occupied)
            .map(|b| (b.key, b.value))
    }

    /// Distance of `key` from its ideal bucket, if present.
    pub fn probe_distance(&self, key: u64) -> Option<u8> {
        self.find(key).map(|i| self.buckets[i].probe)
    }

    /// Longest probe distance currently in the table.
    pub fn max_probe_distance(&self) -> u8 {
        self.buckets
            .iter()
            .filter(|b| b.occupied)
            .map(|b| b.probe)
            .max()
            .unwrap_or(0)
    }

    /// Number of entries at each probe distance.
    ///
    /// Index `d` holds the count of entries sitting `d` buckets past their
    /// ideal bucket. Empty for an empty map.
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for bucket in self.buckets.iter().filter(|b| b.occupied) {
            let d = bucket.probe as usize;
            if hist.len() <= d {
                hist.resize(d + 1, 0);
            }
            hist[d] += 1;
        }
        hist
    }

    /// Rebuild every bucket's probe distance from its key and compare.
    ///
    /// Also checks that each entry's probe path is unbroken and that the
    /// entry count matches the occupied buckets. Linear in capacity; meant
    /// for tests and debugging.
    pub fn is_consistent(&self) -> bool {
        let mut occupied = 0;
        for (i, bucket) in self.buckets.iter().enumerate() {
            if !bucket.occupied {
                continue;
            }
            occupied += 1;
            let home = ideal_bucket(bucket.key, self.mask);
            if (i.wrapping_sub(home) & self.mask) != bucket.probe as usize {
                return false;
            }
            let path_unbroken = (0..bucket.probe as usize)
                .all(|step| self.buckets[(home + step) & self.mask].occupied);
            if !path_unbroken {
                return false;
            }
        }
        occupied == self.count && self.count <= max_load(self.capacity())
    }

    fn find(&self, key: u64) -> Option<usize> {
        let mut i = ideal_bucket(key, self.mask);
        let mut dist = 0u8;
        loop {
            let bucket = &self.buckets[i];
            if !bucket.occupied || bucket.probe < dist {
                return None;
            }
            if bucket.key == key {
                return Some(i);
            }
            dist = dist.checked_add(1)?;
            i = (i + 1) & self.mask;
        }
    }

    /// Walk the insertion path for `key` without mutating anything.
    fn plan_insert(&self, key: u64) -> Plan {
        let mut i = ideal_bucket(key, self.mask);
        let mut dist = 0u8;
        let mut displaced = false;
        loop {
            let bucket = &self.buckets[i];
            if !bucket.occupied {
                return Plan::Insert;
            }
            if !displaced && bucket.key == key {
                return Plan::Update(i);
            }
            if bucket.probe < dist {
                // The resident would be carried on from here.
                displaced = true;
                dist = bucket.probe;
            }
            dist = match dist.checked_add(1) {
                Some(d) => d,
                None => return Plan::Overflow,
            };
            i = (i + 1) & self.mask;
        }
    }

    fn grow(&mut self) -> Result<(), MapError> {
        let old_capacity = self.capacity();
        let mut new_capacity = old_capacity;
        loop {
            new_capacity = new_capacity
                .checked_mul(2)
                .ok_or(MapError::CapacityExceeded {
                    capacity: new_capacity,
                })?;
            if let Some(buckets) = self.rebuild(new_capacity)? {
                self.buckets = buckets;
                self.mask = new_capacity - 1;
                tracing::debug!(
                    old_capacity,
                    new_capacity,
                    len = self.count,
                    "sparse map rehashed"
                );
                return Ok(());
            }
        }
    }

    /// Reinsert every entry, in table order, into a fresh table.
    ///
    /// `Ok(None)` means some entry overflowed the probe distance even at
    /// this capacity.
    fn rebuild(&self, capacity: usize) -> Result<Option<Vec<Bucket>>, MapError> {
        let mut buckets = allocate_buckets(capacity)?;
        let mask = capacity - 1;
        for bucket in self.buckets.iter().filter(|b| b.occupied) {
            if !place(&mut buckets, mask, bucket.key, bucket.value) {
                return Ok(None);
            }
        }
        Ok(Some(buckets))
    }
}

impl Default for SparseMap {
    /// An empty map with [`MapConfig::DEFAULT_INITIAL_CAPACITY`] buckets.
    ///
    /// # Panics
    ///
    /// Panics if the initial bucket array cannot be allocated.
    fn default() -> Self {
        let capacity = MapConfig::DEFAULT_INITIAL_CAPACITY;
        Self {
            buckets: vec![Bucket::EMPTY; capacity],
            mask: capacity - 1,
            count: 0,
        }
    }
}

impl fmt::Debug for SparseMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseMap")
            .field("len", &self.count)
            .field("capacity", &self.capacity())
            .field("max_probe", &self.max_probe_distance())
            .finish()
    }
}
