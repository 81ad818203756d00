use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// First-writer-wins key index that collects collisions as it goes.
///
/// Values are compared by identity (`Eq` on the value, typically an
/// `ObjectId`), never by content. A key shows up in [`collisions`] only
/// once a second distinct value arrives; the representative is moved into
/// the duplicate set at that moment. Objects arrive once in arbitrary order
/// and are never replayed, so the result cannot depend on a second pass.
///
/// [`collisions`]: DuplicateIndex::collisions
#[derive(Debug, Clone)]
pub struct DuplicateIndex<K, V> {
    representatives: HashMap<K, V>,
    duplicates: HashMap<K, BTreeSet<V>>,
}

impl<K, V> Default for DuplicateIndex<K, V> {
    fn default() -> Self {
        Self {
            representatives: HashMap::new(),
            duplicates: HashMap::new(),
        }
    }
}

impl<K, V> DuplicateIndex<K, V>
where
    K: Eq + Hash + Clone,
    V: Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key`. Returns true when this created or grew a
    /// collision.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match self.representatives.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                false
            }
            Entry::Occupied(slot) => {
                if *slot.get() == value {
                    return false;
                }
                let set = self
                    .duplicates
                    .entry(slot.key().clone())
                    .or_insert_with(|| BTreeSet::from([slot.get().clone()]));
                set.insert(value)
            }
        }
    }

    pub fn collisions(&self) -> &HashMap<K, BTreeSet<V>> {
        &self.duplicates
    }

    pub fn is_empty(&self) -> bool {
        self.representatives.is_empty()
    }

    pub fn reset(&mut self) {
        self.representatives.clear();
        self.duplicates.clear();
    }
}
