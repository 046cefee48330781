//! Opaque value handles stored by `Table`.
//!
//! The table stores values by copy and never dereferences or drops what
//! they point at. Each handle type designates one "empty" value that the
//! table refuses to store; it plays the role of the null reference.

use core::num::{NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU8, NonZeroUsize};
use core::ptr::NonNull;

/// A non-owning handle that can be stored in a [`Table`](crate::Table).
pub trait ValueRef: Copy {
    /// Whether this is the empty sentinel. `Table::set` rejects it.
    fn is_empty(&self) -> bool;
}

impl<T: ?Sized> ValueRef for *const T {
    #[inline]
    fn is_empty(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> ValueRef for *mut T {
    #[inline]
    fn is_empty(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> ValueRef for Option<NonNull<T>> {
    #[inline]
    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

impl<'a, T: ?Sized> ValueRef for Option<&'a T> {
    #[inline]
    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

macro_rules! zero_is_empty {
    ($($t:ty),*) => {
        $(
            impl ValueRef for $t {
                #[inline]
                fn is_empty(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

// Indices into a caller-owned arena; 0 is reserved.
zero_is_empty!(u8, u16, u32, u64, usize);

macro_rules! never_empty {
    ($($t:ty),*) => {
        $(
            impl ValueRef for $t {
                #[inline]
                fn is_empty(&self) -> bool {
                    false
                }
            }
        )*
    };
}

never_empty!(NonZeroU8, NonZeroU16, NonZeroU32, NonZeroU64, NonZeroUsize);
