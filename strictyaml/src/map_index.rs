//! Cache-line-associative index for O(1) map child lookup.
//!
//! The table maps a hash derived from `(parent element, key string)` to the position of the
//! matching `Key` child within the parent's child list. Slots are grouped into buckets of 8 so
//! that one bucket spans one 64-byte cache line; probing is linear within a bucket, then
//! quadratic between buckets. One table serves the whole document.
//!
//! The table stores no parent field: the parent index is XORed into the hash, so a positive
//! match (equal hash plus equal key bytes, checked by the caller-supplied predicate) uniquely
//! identifies the `(parent, position)` pair.

/// Hash value of a free slot.
const EMPTY: u32 = 0;
/// Hash value of a removed slot. Probes traverse tombstones as occupied-but-non-matching.
const TOMBSTONE: u32 = 1;
/// Smallest hash value a live entry may carry.
pub(crate) const FIRST_VALID: u32 = 2;

/// Slots per bucket. 8 slots of 8 bytes fill one cache line and keep the table efficient up to
/// a 90% load factor.
const ASSOC: usize = 8;
/// Initial slot count.
const INITIAL_SLOTS: usize = 16;
/// Resize threshold, in 128ths of the capacity (90%).
const MAX_LOAD_128TH: u64 = 115;

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    hash: u32,
    child_pos: u32,
}

/// One cache line worth of slots.
#[derive(Debug, Clone, Copy, Default)]
#[repr(align(64))]
struct Bucket {
    slots: [Slot; ASSOC],
}

#[derive(Debug)]
pub(crate) struct MapIndex {
    buckets: Vec<Bucket>,
    /// Live entries plus tombstones since the last rehash.
    occupied: u32,
}

impl MapIndex {
    pub fn new() -> Self {
        Self {
            buckets: vec![Bucket::default(); INITIAL_SLOTS / ASSOC],
            occupied: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.buckets.len() * ASSOC
    }

    /// Mask selecting a bucket-aligned slot index.
    fn mask(&self) -> usize {
        (self.capacity() - 1) & !(ASSOC - 1)
    }

    fn slot(&self, idx: usize) -> Slot {
        self.buckets[idx / ASSOC].slots[idx % ASSOC]
    }

    fn slot_mut(&mut self, idx: usize) -> &mut Slot {
        &mut self.buckets[idx / ASSOC].slots[idx % ASSOC]
    }

    /// Look up the entry for `key_hash` and return its child position.
    ///
    /// Hash collisions make the hash alone insufficient: `key_matches` must confirm that the
    /// candidate position holds a live `Key` child with the queried name.
    pub fn find(&self, key_hash: u32, mut key_matches: impl FnMut(u32) -> bool) -> Option<u32> {
        debug_assert!(key_hash >= FIRST_VALID);
        let mask = self.mask();
        let mut idx = key_hash as usize & mask;
        let mut probe = 1;
        loop {
            let mut cell = 0;
            while cell < ASSOC && self.slot(idx + cell).hash >= TOMBSTONE {
                let slot = self.slot(idx + cell);
                if slot.hash == key_hash && key_matches(slot.child_pos) {
                    return Some(slot.child_pos);
                }
                cell += 1;
            }
            if cell < ASSOC {
                // An empty slot terminates the search.
                return None;
            }
            idx = (idx + probe * ASSOC) & mask;
            probe += 1;
        }
    }

    /// Insert `(key_hash, child_pos)`, or overwrite the position of the matching entry.
    ///
    /// Returns `true` when a new entry was added and `false` on replacement. The new entry goes
    /// to the first empty slot of the bucket line where the search terminated.
    pub fn insert_or_replace(
        &mut self,
        key_hash: u32,
        child_pos: u32,
        mut key_matches: impl FnMut(u32) -> bool,
    ) -> bool {
        debug_assert!(key_hash >= FIRST_VALID);
        let mask = self.mask();
        let mut idx = key_hash as usize & mask;
        let mut probe = 1;
        loop {
            let mut empty_cell = None;
            for cell in 0..ASSOC {
                let slot = self.slot(idx + cell);
                if slot.hash == EMPTY {
                    empty_cell = Some(cell);
                    break;
                }
                if slot.hash == key_hash && key_matches(slot.child_pos) {
                    self.slot_mut(idx + cell).child_pos = child_pos;
                    return false;
                }
            }
            if let Some(cell) = empty_cell {
                *self.slot_mut(idx + cell) = Slot {
                    hash: key_hash,
                    child_pos,
                };
                self.occupied += 1;
                if u64::from(self.occupied) * 128 > MAX_LOAD_128TH * self.capacity() as u64 {
                    self.rehash(self.capacity() * 2);
                }
                return true;
            }
            idx = (idx + probe * ASSOC) & mask;
            probe += 1;
        }
    }

    /// Remove the entry matching `key_hash` and return its child position.
    ///
    /// The slot becomes a tombstone so that longer probe chains stay intact.
    pub fn remove(&mut self, key_hash: u32, mut key_matches: impl FnMut(u32) -> bool) -> Option<u32> {
        debug_assert!(key_hash >= FIRST_VALID);
        let mask = self.mask();
        let mut idx = key_hash as usize & mask;
        let mut probe = 1;
        loop {
            let mut cell = 0;
            while cell < ASSOC && self.slot(idx + cell).hash >= TOMBSTONE {
                let slot = self.slot(idx + cell);
                if slot.hash == key_hash && key_matches(slot.child_pos) {
                    *self.slot_mut(idx + cell) = Slot {
                        hash: TOMBSTONE,
                        child_pos: u32::MAX,
                    };
                    return Some(slot.child_pos);
                }
                cell += 1;
            }
            if cell < ASSOC {
                return None;
            }
            idx = (idx + probe * ASSOC) & mask;
            probe += 1;
        }
    }

    /// Redistribute live entries over `new_slots` slots, dropping tombstones.
    fn rehash(&mut self, new_slots: usize) {
        let old = std::mem::replace(
            &mut self.buckets,
            vec![Bucket::default(); new_slots / ASSOC],
        );
        self.occupied = 0;
        let mask = self.mask();
        for bucket in &old {
            for slot in &bucket.slots {
                if slot.hash < FIRST_VALID {
                    continue;
                }
                let mut idx = slot.hash as usize & mask;
                let mut probe = 1;
                'place: loop {
                    for cell in 0..ASSOC {
                        if self.slot(idx + cell).hash == EMPTY {
                            *self.slot_mut(idx + cell) = *slot;
                            break 'place;
                        }
                    }
                    idx = (idx + probe * ASSOC) & mask;
                    probe += 1;
                }
                self.occupied += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An entry position matcher over a plain list of names, standing in for the element store.
    fn matcher<'a>(names: &'a [&'a str], wanted: &'a str) -> impl FnMut(u32) -> bool + 'a {
        move |pos| names.get(pos as usize) == Some(&wanted)
    }

    #[test]
    fn insert_then_find() {
        let names = ["alpha", "beta", "gamma"];
        let mut index = MapIndex::new();
        for (pos, name) in names.iter().enumerate() {
            let hash = FIRST_VALID + 7 * pos as u32;
            assert!(index.insert_or_replace(hash, pos as u32, matcher(&names, name)));
        }
        for (pos, name) in names.iter().enumerate() {
            let hash = FIRST_VALID + 7 * pos as u32;
            assert_eq!(index.find(hash, matcher(&names, name)), Some(pos as u32));
        }
        assert_eq!(index.find(FIRST_VALID, matcher(&names, "delta")), None);
    }

    #[test]
    fn replace_keeps_single_entry() {
        let names = ["alpha"];
        let mut index = MapIndex::new();
        assert!(index.insert_or_replace(FIRST_VALID, 0, matcher(&names, "alpha")));
        assert!(!index.insert_or_replace(FIRST_VALID, 0, matcher(&names, "alpha")));
        assert_eq!(index.find(FIRST_VALID, matcher(&names, "alpha")), Some(0));
    }

    #[test]
    fn colliding_hashes_resolved_by_key_bytes() {
        // Same hash, two different keys: the predicate must disambiguate.
        let names = ["alpha", "beta"];
        let mut index = MapIndex::new();
        assert!(index.insert_or_replace(FIRST_VALID, 0, matcher(&names, "alpha")));
        assert!(index.insert_or_replace(FIRST_VALID, 1, matcher(&names, "beta")));
        assert_eq!(index.find(FIRST_VALID, matcher(&names, "alpha")), Some(0));
        assert_eq!(index.find(FIRST_VALID, matcher(&names, "beta")), Some(1));
    }

    #[test]
    fn tombstones_do_not_break_probe_chains() {
        let names = ["alpha", "beta"];
        let mut index = MapIndex::new();
        index.insert_or_replace(FIRST_VALID, 0, matcher(&names, "alpha"));
        index.insert_or_replace(FIRST_VALID, 1, matcher(&names, "beta"));
        // "beta" sits after "alpha" in the same bucket; removing "alpha" must not hide it.
        assert_eq!(index.remove(FIRST_VALID, matcher(&names, "alpha")), Some(0));
        assert_eq!(index.find(FIRST_VALID, matcher(&names, "alpha")), None);
        assert_eq!(index.find(FIRST_VALID, matcher(&names, "beta")), Some(1));
    }

    #[test]
    fn remove_missing_returns_none() {
        let names = ["alpha"];
        let mut index = MapIndex::new();
        assert_eq!(index.remove(FIRST_VALID, matcher(&names, "alpha")), None);
    }

    #[test]
    fn grows_past_initial_capacity() {
        let names: Vec<String> = (0..200).map(|i| format!("key{i:03}")).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut index = MapIndex::new();
        for (pos, name) in name_refs.iter().enumerate() {
            let hash = FIRST_VALID + crate::wyhash::hash(name.as_bytes()) as u32 % 100_000;
            index.insert_or_replace(hash, pos as u32, matcher(&name_refs, name));
        }
        for (pos, name) in name_refs.iter().enumerate() {
            let hash = FIRST_VALID + crate::wyhash::hash(name.as_bytes()) as u32 % 100_000;
            assert_eq!(
                index.find(hash, matcher(&name_refs, name)),
                Some(pos as u32),
                "{name} lost after growth"
            );
        }
    }
}
