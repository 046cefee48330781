//! Cursor over the occupied slots of a `Table`.

use crate::key::Key;
use crate::table::{Entry, Table};
use crate::value::ValueRef;

/// Scan position over a [`Table`].
///
/// The cursor borrows the table, so the table cannot be modified while the
/// cursor is alive. Entries come out in physical slot order, which is
/// unrelated to insertion order and changes when the table grows.
///
/// Use it either C-style, through [`advance`](Cursor::advance) and the
/// [`key`](Cursor::key)/[`value`](Cursor::value) accessors, or as an
/// [`Iterator`] of `(&Key, V)`.
pub struct Cursor<'a, V> {
    table: &'a Table<V>,
    index: usize,
    current: Option<&'a Entry<V>>,
}

impl<'a, V: ValueRef> Cursor<'a, V> {
    pub(crate) fn new(table: &'a Table<V>) -> Self {
        Self {
            table,
            index: 0,
            current: None,
        }
    }

    /// Move to the next occupied slot. Returns `false`, and stays
    /// exhausted, once the end of the table is reached.
    pub fn advance(&mut self) -> bool {
        let slots = self.table.slots();
        while self.index < slots.len() {
            let i = self.index;
            self.index += 1;
            if let Some(entry) = &slots[i] {
                self.current = Some(entry);
                return true;
            }
        }
        self.current = None;
        false
    }

    /// Key at the current position, `None` before the first `advance` and
    /// after exhaustion.
    pub fn key(&self) -> Option<&'a Key> {
        self.current.map(|e| &e.key)
    }

    pub fn value(&self) -> Option<V> {
        self.current.map(|e| e.value)
    }
}

impl<'a, V: ValueRef> Iterator for Cursor<'a, V> {
    type Item = (&'a Key, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.advance() {
            self.current.map(|e| (&e.key, e.value))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table.capacity().saturating_sub(self.index);
        (0, Some(remaining.min(self.table.len())))
    }
}

impl<'a, V: ValueRef> core::iter::FusedIterator for Cursor<'a, V> {}
