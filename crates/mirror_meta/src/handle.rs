//! Native handles into a [`Universe`](crate::Universe).
//!
//! Handles are 32-bit indices into the universe's definition tables, the
//! same shape as a metadata token without the table tag. Equality is index
//! equality; a handle carries no reference to the universe that issued it.

use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create from a raw table index.
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw table index.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub(crate) const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_handle!(
    /// A type: definition, generic instance, array, by-ref, pointer, or
    /// generic parameter.
    TypeHandle,
    "Type"
);
define_handle!(
    /// A method or constructor definition, or a generic method instance.
    MethodHandle,
    "Method"
);
define_handle!(
    /// A field definition.
    FieldHandle,
    "Field"
);
define_handle!(
    /// A property definition.
    PropertyHandle,
    "Property"
);
define_handle!(
    /// An event definition.
    EventHandle,
    "Event"
);

/// A method parameter, addressed by its owning method and zero-based
/// position.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ParamHandle {
    /// The method declaring the parameter.
    pub method: MethodHandle,
    /// Zero-based position in the parameter list.
    pub position: u16,
}

impl ParamHandle {
    /// Create a parameter handle.
    #[inline]
    pub const fn new(method: MethodHandle, position: u16) -> Self {
        Self { method, position }
    }
}

impl fmt::Debug for ParamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Param#{}.{}", self.method.raw(), self.position)
    }
}

/// Convert a table length into the next handle index.
///
/// # Panics
/// Panics if a table grows past `u32::MAX` entries.
#[inline]
pub(crate) fn next_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("metadata table exceeded u32::MAX entries"))
}
