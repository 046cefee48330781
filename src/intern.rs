//! FieldTags: assigns dense numeric tags to field names.

use crate::key::Key;
use crate::table::{Table, TableError};
use core::fmt;
use core::num::NonZeroU32;
use thiserror::Error;
use tracing::debug;

/// Tag assigned to a field name. Tags start at 1; 0 is never assigned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(NonZeroU32);

impl Tag {
    pub const FIRST: Tag = Tag(NonZeroU32::MIN);

    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Tag)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn next(self) -> Option<Tag> {
        self.0.checked_add(1).map(Tag)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl crate::ValueRef for Tag {
    #[inline]
    fn is_empty(&self) -> bool {
        false
    }
}

#[derive(Debug, Error)]
pub enum InternError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("field tags exhausted")]
    Exhausted,
}

/// Name to tag interning table.
///
/// The first time a name is seen it receives the next unused tag; later
/// lookups of the same name return that tag.
#[derive(Debug)]
pub struct FieldTags {
    table: Table<Tag>,
    next: Option<Tag>,
}

impl FieldTags {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
            next: Some(Tag::FIRST),
        }
    }

    pub fn try_new() -> Result<Self, InternError> {
        Ok(Self {
            table: Table::try_new()?,
            next: Some(Tag::FIRST),
        })
    }

    /// Return the tag for `name`, assigning a new one if needed.
    pub fn tag(&mut self, name: &str) -> Result<Tag, InternError> {
        if let Some(tag) = self.table.get(name) {
            return Ok(tag);
        }
        let tag = self.next.ok_or(InternError::Exhausted)?;
        self.table.set(name, tag)?;
        self.next = tag.next();
        debug!(field = name, tag = tag.get(), "assigned tag");
        Ok(tag)
    }

    pub fn get(&self, name: &str) -> Option<Tag> {
        self.table.get(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// All names with their tags, ordered by tag.
    pub fn dictionary(&self) -> Vec<(Tag, &Key)> {
        let mut out = Vec::with_capacity(self.table.len());
        let mut cursor = self.table.cursor();
        while cursor.advance() {
            if let (Some(key), Some(tag)) = (cursor.key(), cursor.value()) {
                out.push((tag, key));
            }
        }
        out.sort_unstable_by_key(|(tag, _)| *tag);
        out
    }
}

impl Default for FieldTags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: tags are dense from 1 in first-seen order and stable on
    /// repeat lookups.
    #[test]
    fn first_seen_order() {
        let mut tags = FieldTags::new();
        assert_eq!(tags.tag("id").unwrap().get(), 1);
        assert_eq!(tags.tag("name").unwrap().get(), 2);
        assert_eq!(tags.tag("id").unwrap().get(), 1);
        assert_eq!(tags.tag("active").unwrap().get(), 3);
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.get("name"), Tag::new(2));
        assert_eq!(tags.get("missing"), None);
    }

    /// Invariant: the dictionary lists every name once, sorted by tag.
    #[test]
    fn dictionary_sorted_by_tag() {
        let mut tags = FieldTags::try_new().unwrap();
        let names: Vec<String> = (0..40).map(|i| format!("field_{i}")).collect();
        for n in &names {
            tags.tag(n).unwrap();
        }
        tags.tag("field_3").unwrap();

        let dict = tags.dictionary();
        assert_eq!(dict.len(), names.len());
        for (i, (tag, key)) in dict.iter().enumerate() {
            assert_eq!(tag.get() as usize, i + 1);
            assert_eq!(**key, *names[i].as_str());
        }
    }

    /// Invariant: once the tag space runs out, new names are refused but
    /// known names still resolve.
    #[test]
    fn exhaustion() {
        let mut tags = FieldTags::new();
        tags.tag("a").unwrap();
        tags.next = None;
        assert_eq!(tags.tag("a").unwrap(), Tag::FIRST);
        assert!(matches!(tags.tag("b"), Err(InternError::Exhausted)));
        assert_eq!(tags.len(), 1);
    }
}
