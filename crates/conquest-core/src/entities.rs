use std::collections::BTreeMap;

use conquest_protocol::RawId;

/// Id-keyed storage for game entities.
///
/// - Stable iteration order: ascending id.
/// - Ids are allocated monotonically and never reused, so a stale id simply misses.
#[derive(Clone, Debug)]
pub struct EntityStore<K, T> {
    items: BTreeMap<K, T>,
    next_raw: u32,
}

impl<K, T> Default for EntityStore<K, T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            next_raw: 1,
        }
    }
}

impl<K: RawId, T> EntityStore<K, T> {
    /// Allocate the next id and store the value built for it.
    pub fn insert_with(&mut self, build: impl FnOnce(K) -> T) -> K {
        let id = K::from_raw(self.next_raw);
        self.next_raw = self.next_raw.saturating_add(1);
        self.items.insert(id, build(id));
        id
    }

    /// Store a value under a known id (used when restoring a snapshot).
    ///
    /// Returns the previous value if the id was already taken.
    pub fn insert_at(&mut self, id: K, value: T) -> Option<T> {
        self.next_raw = self.next_raw.max(id.raw().saturating_add(1));
        self.items.insert(id, value)
    }

    pub fn get(&self, id: K) -> Option<&T> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: K) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: K) -> bool {
        self.items.contains_key(&id)
    }

    pub fn remove(&mut self, id: K) -> Option<T> {
        self.items.remove(&id)
    }

    /// Mutable access to two distinct entries at once.
    pub fn get2_mut(&mut self, a: K, b: K) -> Option<(&mut T, &mut T)> {
        if a == b {
            return None;
        }

        let mut first = None;
        let mut second = None;
        for (id, value) in self.items.iter_mut() {
            if *id == a {
                first = Some(value);
            } else if *id == b {
                second = Some(value);
            }
        }
        Some((first?, second?))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<K> {
        self.items.keys().copied().collect()
    }

    pub fn iter_ordered(&self) -> impl Iterator<Item = (K, &T)> {
        self.items.iter().map(|(id, value)| (*id, value))
    }

    pub fn iter_ordered_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> {
        self.items.iter_mut().map(|(id, value)| (*id, value))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }
}
