use std::collections::HashMap;
use std::time::Duration;

/// One scheduled entry. `cycles` counts the full revolutions the cursor
/// must still make past this entry's slot before it fires.
pub(crate) struct SlotEntry<T> {
    pub key: String,
    pub cycles: u64,
    pub payload: T,
}

/// Fixed ring of slots plus a key index.
///
/// Invariant: `index` maps every stored key to the slot that holds its
/// entry, and nothing else — no orphaned index entries, no unindexed
/// entries. All mutation goes through [`insert`](Self::insert),
/// [`remove`](Self::remove) and [`tick`](Self::tick), which maintain it.
pub(crate) struct BucketStore<T> {
    slots: Vec<Vec<SlotEntry<T>>>,
    index: HashMap<String, usize>,
    cursor: usize,
}

/// Map a delay to (slot, cycles) relative to `cursor`.
///
/// A delay shorter than one tick (including zero) rounds down to the
/// current slot, which the next tick drains — "due now" fires one tick out.
pub(crate) fn position_for(
    delay: Duration,
    cursor: usize,
    slot_count: usize,
    interval: Duration,
) -> (usize, u64) {
    let ticks = (delay.as_millis() / interval.as_millis().max(1)) as u64;
    let cycles = ticks / slot_count as u64;
    let slot = (cursor + ticks as usize % slot_count) % slot_count;
    (slot, cycles)
}

impl<T> BucketStore<T> {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: (0..slot_count).map(|_| Vec::new()).collect(),
            index: HashMap::new(),
            cursor: 0,
        }
    }

    /// Place `payload` under `key`, `delay` from now. Re-inserting an
    /// existing key replaces the old entry (last write wins).
    pub fn insert(&mut self, key: String, payload: T, delay: Duration, interval: Duration) {
        self.remove(&key);
        let (slot, cycles) = position_for(delay, self.cursor, self.slots.len(), interval);
        self.slots[slot].push(SlotEntry {
            key: key.clone(),
            cycles,
            payload,
        });
        self.index.insert(key, slot);
    }

    /// Detach `key` if present. Unknown keys are a no-op.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(slot) = self.index.remove(key) else {
            return false;
        };
        self.slots[slot].retain(|e| e.key != key);
        true
    }

    /// Drain the current slot and advance the cursor.
    ///
    /// Entries still owing revolutions are decremented and retained;
    /// the rest are detached (slot and index both) and returned for
    /// execution. Detached entries are never re-inserted.
    pub fn tick(&mut self) -> Vec<SlotEntry<T>> {
        let slot = self.cursor;
        self.cursor = (self.cursor + 1) % self.slots.len();

        let drained = std::mem::take(&mut self.slots[slot]);
        let mut due = Vec::new();
        for mut entry in drained {
            if entry.cycles > 0 {
                entry.cycles -= 1;
                self.slots[slot].push(entry);
            } else {
                self.index.remove(&entry.key);
                due.push(entry);
            }
        }
        due
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_secs(1);

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn position_within_first_revolution() {
        assert_eq!(position_for(secs(3), 0, 10, TICK), (3, 0));
        assert_eq!(position_for(secs(3), 8, 10, TICK), (1, 0));
    }

    #[test]
    fn position_far_future_gains_cycles() {
        // 25 ticks out on a 10-slot wheel: 2 full revolutions, 5 ahead.
        assert_eq!(position_for(secs(25), 0, 10, TICK), (5, 2));
        assert_eq!(position_for(secs(25), 7, 10, TICK), (2, 2));
    }

    #[test]
    fn position_zero_delay_stays_on_cursor() {
        assert_eq!(position_for(Duration::ZERO, 4, 10, TICK), (4, 0));
    }

    #[test]
    fn position_sub_tick_delay_rounds_down() {
        assert_eq!(position_for(Duration::from_millis(999), 4, 10, TICK), (4, 0));
    }

    #[test]
    fn tick_fires_due_entry_and_clears_index() {
        let mut store = BucketStore::new(10);
        store.insert("a".into(), 1u32, secs(2), TICK);
        assert_eq!(store.len(), 1);

        assert!(store.tick().is_empty()); // slot 0
        assert!(store.tick().is_empty()); // slot 1
        let due = store.tick(); // slot 2
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].key, "a");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn tick_decrements_cycles_before_firing() {
        let mut store = BucketStore::new(2);
        // 5 ticks out on a 2-slot wheel: slot 1, 2 cycles.
        store.insert("a".into(), (), secs(5), TICK);

        let mut fired_at = None;
        for n in 1..=8 {
            if !store.tick().is_empty() {
                fired_at = Some(n);
                break;
            }
        }
        // Slot 1 is drained on ticks 2, 4, 6: two cycle decrements, then fire.
        assert_eq!(fired_at, Some(6));
    }

    #[test]
    fn insert_same_key_replaces() {
        let mut store = BucketStore::new(10);
        store.insert("a".into(), 1u32, secs(8), TICK);
        store.insert("a".into(), 2u32, secs(1), TICK);
        assert_eq!(store.len(), 1);

        assert!(store.tick().is_empty()); // slot 0
        let due = store.tick(); // slot 1
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].payload, 2);

        // The 8s registration must be gone entirely.
        for _ in 0..20 {
            assert!(store.tick().is_empty());
        }
    }

    #[test]
    fn remove_unknown_key_is_noop() {
        let mut store: BucketStore<()> = BucketStore::new(10);
        assert!(!store.remove("ghost"));
    }

    #[test]
    fn removed_entry_never_fires() {
        let mut store = BucketStore::new(10);
        store.insert("a".into(), (), secs(3), TICK);
        assert!(store.remove("a"));
        assert_eq!(store.len(), 0);
        for _ in 0..20 {
            assert!(store.tick().is_empty());
        }
    }
}
