//! keytab: a single-threaded, open-addressing table from byte-string keys
//! to opaque value handles, and a JSON lines to TLV encoder built on it.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small string-keyed table whose behavior is easy to reason
//!   about, plus the glue that uses it to give JSON field names stable
//!   numeric tags.
//! - Layers:
//!   - Table<V>: linear-probing slot array with FNV-1a hashing and a
//!     power-of-two capacity; owns its keys, copies its values.
//!   - Cursor<'a, V>: borrowing scan over occupied slots.
//!   - FieldTags: name -> tag interning on top of Table.
//!   - TlvBox / Converter: records encoded as tag-length-value items.
//!
//! Constraints
//! - Single-threaded; no internal synchronization. `set` needs `&mut`,
//!   lookups and cursors need `&`, so a cursor cannot outlive a mutation.
//! - Capacity is a power of two (minimum 1) and the table doubles before
//!   the load factor would exceed 1/2, so probing always finds an empty
//!   slot.
//! - No deletion and no shrinking. Slots go from empty to occupied only.
//! - Failed operations leave the entry set exactly as it was.
//!
//! Ownership
//! - Keys are copied into owned storage on first insert and released when
//!   the table is dropped. Growth moves that storage into the new slot
//!   array; the bytes are never copied again.
//! - Values are `Copy` handles (`ValueRef`): raw pointers, arena indices,
//!   tags. The table never dereferences or drops what they refer to. Each
//!   handle type has an empty sentinel (null, 0, None) that `set` rejects.
//!
//! Notes and non-goals
//! - Iteration order is physical slot order and changes on growth.
//! - Keys are arbitrary bytes; no NUL terminator is required or stored.

mod cursor;
pub mod convert;
pub mod fnv;
pub mod intern;
mod key;
mod table;
#[cfg(test)]
mod table_proptest;
pub mod tlv;
mod value;

// Public surface
pub use cursor::Cursor;
pub use key::Key;
pub use table::{Table, TableError};
pub use value::ValueRef;
