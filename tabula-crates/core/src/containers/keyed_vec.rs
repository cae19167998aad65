use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

/// An id which is a dense index into a [`KeyedVec`].
pub trait StorageKey: Copy {
    fn index(&self) -> usize;

    fn create_from_index(index: usize) -> Self;
}

/// A vector indexed by a typed id, so that a variable id cannot be used to look up a propagator.
#[derive(Debug, PartialEq, Eq)]
pub struct KeyedVec<Key, Value> {
    key: PhantomData<Key>,
    elements: Vec<Value>,
}

impl<Key, Value: Clone> Clone for KeyedVec<Key, Value> {
    fn clone(&self) -> Self {
        KeyedVec {
            key: PhantomData,
            elements: self.elements.clone(),
        }
    }
}

impl<Key, Value> Default for KeyedVec<Key, Value> {
    fn default() -> Self {
        KeyedVec {
            key: PhantomData,
            elements: Vec::new(),
        }
    }
}

impl<Key: StorageKey, Value> KeyedVec<Key, Value> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Appends `value` and returns its id.
    pub fn push(&mut self, value: Value) -> Key {
        self.elements.push(value);
        Key::create_from_index(self.elements.len() - 1)
    }

    /// Reserves the next id; the value is stored with [`Slot::populate`].
    ///
    /// Propagators are created through a slot so that they know their own id before they are
    /// stored.
    pub fn new_slot(&mut self) -> Slot<'_, Key, Value> {
        Slot { vec: self }
    }

    pub fn get(&self, key: Key) -> Option<&Value> {
        self.elements.get(key.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &'_ Value> {
        self.elements.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &'_ mut Value> {
        self.elements.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> {
        (0..self.elements.len()).map(Key::create_from_index)
    }
}

impl<Key: StorageKey, Value: Clone> KeyedVec<Key, Value> {
    /// Grows the vector with `default_value` until `key` is a valid id.
    pub(crate) fn ensure_key(&mut self, key: Key, default_value: Value) {
        if key.index() >= self.elements.len() {
            self.elements.resize(key.index() + 1, default_value);
        }
    }
}

impl<Key: StorageKey, Value> Index<Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, key: Key) -> &Value {
        &self.elements[key.index()]
    }
}

impl<Key: StorageKey, Value> IndexMut<Key> for KeyedVec<Key, Value> {
    fn index_mut(&mut self, key: Key) -> &mut Value {
        &mut self.elements[key.index()]
    }
}

/// The next free position of a [`KeyedVec`].
#[derive(Debug)]
pub struct Slot<'a, Key, Value> {
    vec: &'a mut KeyedVec<Key, Value>,
}

impl<Key: StorageKey, Value> Slot<'_, Key, Value> {
    pub fn key(&self) -> Key {
        Key::create_from_index(self.vec.len())
    }

    pub fn populate(self, value: Value) -> Key {
        self.vec.push(value)
    }
}

#[cfg(test)]
mod tests {
    use super::KeyedVec;
    use crate::engine::VariableId;

    #[test]
    fn a_slot_is_populated_under_its_reserved_key() {
        let mut values: KeyedVec<VariableId, &str> = KeyedVec::default();
        let _ = values.push("x");

        let slot = values.new_slot();
        let reserved = slot.key();
        let populated = slot.populate("y");

        assert_eq!(reserved, VariableId(1));
        assert_eq!(reserved, populated);
        assert_eq!(values[populated], "y");
    }

    #[test]
    fn ensuring_a_key_never_shrinks() {
        let mut flags: KeyedVec<VariableId, bool> = KeyedVec::default();
        flags.ensure_key(VariableId(4), false);
        flags[VariableId(4)] = true;
        flags.ensure_key(VariableId(2), false);

        assert_eq!(flags.len(), 5);
        assert!(flags[VariableId(4)]);
        assert_eq!(flags.keys().last(), Some(VariableId(4)));
    }
}
