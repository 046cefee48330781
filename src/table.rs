//! Table: open-addressing, linear-probing map from byte-string keys to
//! opaque value handles.

use crate::cursor::Cursor;
use crate::fnv::fnv1a;
use crate::key::Key;
use crate::value::ValueRef;
use std::collections::TryReserveError;
use std::fmt;
use thiserror::Error;
use tracing::trace;

const INITIAL_CAPACITY: usize = 1;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
    #[error("table capacity overflow")]
    CapacityOverflow,
    #[error("refusing to store the empty value")]
    EmptyValue,
}

#[derive(Debug)]
pub(crate) struct Entry<V> {
    pub(crate) key: Key,
    pub(crate) value: V,
}

pub(crate) type Slot<V> = Option<Entry<V>>;

/// Outcome of probing for a key.
enum Probe {
    Found(usize),
    Vacant(usize),
}

pub struct Table<V> {
    slots: Box<[Slot<V>]>,
    len: usize,
}

fn alloc_slots<V>(capacity: usize) -> Result<Box<[Slot<V>]>, TableError> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity)?;
    slots.resize_with(capacity, || None);
    Ok(slots.into_boxed_slice())
}

// `slots.len()` is a power of two and at least one slot is empty, so the
// scan always terminates.
fn probe<V>(slots: &[Slot<V>], key: &[u8]) -> Probe {
    let mask = slots.len() - 1;
    let mut index = (fnv1a(key) & mask as u64) as usize;
    loop {
        match &slots[index] {
            None => return Probe::Vacant(index),
            Some(entry) if entry.key == *key => return Probe::Found(index),
            Some(_) => index = (index + 1) & mask,
        }
    }
}

impl<V: ValueRef> Table<V> {
    /// Create an empty table, aborting on allocation failure like std
    /// collections do. See [`Table::try_new`] for the fallible version.
    pub fn new() -> Self {
        Self {
            slots: vec![None].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn try_new() -> Result<Self, TableError> {
        Ok(Self {
            slots: alloc_slots(INITIAL_CAPACITY)?,
            len: 0,
        })
    }

    /// Number of stored keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots. Always a power of two.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Look up the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        match probe(&self.slots, key.as_ref()) {
            Probe::Found(index) => self.slots[index].as_ref().map(|e| e.value),
            Probe::Vacant(_) => None,
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        matches!(probe(&self.slots, key.as_ref()), Probe::Found(_))
    }

    /// Insert `key` with `value`, or overwrite the value if `key` is
    /// already present. Returns the table's own copy of the key.
    ///
    /// Fails without changing any entry if `value` is the empty sentinel
    /// or if growing the table or copying the key cannot allocate.
    pub fn set<Q>(&mut self, key: &Q, value: V) -> Result<&Key, TableError>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        if value.is_empty() {
            return Err(TableError::EmptyValue);
        }
        let key = key.as_ref();

        if self.len >= self.slots.len() / 2 {
            self.grow()?;
        }

        let index = match probe(&self.slots, key) {
            Probe::Found(index) | Probe::Vacant(index) => index,
        };
        match self.slots[index] {
            Some(ref mut entry) => {
                entry.value = value;
                Ok(&entry.key)
            }
            ref mut vacant @ None => {
                let key = Key::try_copy(key)?;
                self.len += 1;
                Ok(&vacant.insert(Entry { key, value }).key)
            }
        }
    }

    /// Double the slot array and move every entry into it. Keys change
    /// owner but are not copied.
    fn grow(&mut self) -> Result<(), TableError> {
        let old_capacity = self.slots.len();
        let new_capacity = old_capacity
            .checked_mul(2)
            .ok_or(TableError::CapacityOverflow)?;
        let mut slots = alloc_slots::<V>(new_capacity)?;

        for entry in self.slots.iter_mut().filter_map(Option::take) {
            match probe(&slots, &entry.key) {
                Probe::Vacant(index) => slots[index] = Some(entry),
                Probe::Found(_) => unreachable!("duplicate key in table"),
            }
        }

        trace!(
            from = old_capacity,
            to = new_capacity,
            len = self.len,
            "grew table"
        );
        self.slots = slots;
        Ok(())
    }

    /// Start a cursor at the first slot.
    pub fn cursor(&self) -> Cursor<'_, V> {
        Cursor::new(self)
    }

    pub fn iter(&self) -> Cursor<'_, V> {
        self.cursor()
    }

    pub(crate) fn slots(&self) -> &[Slot<V>] {
        &self.slots
    }
}

impl<V: ValueRef> Default for Table<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V: ValueRef> IntoIterator for &'a Table<V> {
    type Item = (&'a Key, V);
    type IntoIter = Cursor<'a, V>;

    fn into_iter(self) -> Cursor<'a, V> {
        self.cursor()
    }
}

impl<V: ValueRef + fmt::Debug> fmt::Debug for Table<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
