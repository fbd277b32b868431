//! ECMA-335 metadata attribute bit sets.
//!
//! The bit values follow partition II §23.1 of the CLI standard so that a
//! universe loaded from real assembly metadata keeps its raw flags. Multi-bit
//! fields (member access, type visibility, variance) are exposed through the
//! `*_MASK` constants and decoded into small enums; single-bit properties
//! are ordinary flags.

use bitflags::bitflags;

bitflags! {
    /// `TypeDef` flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeAttributes: u32 {
        /// Visibility field (3 bits), see [`TypeVisibility`].
        const VISIBILITY_MASK = 0x0000_0007;
        /// The type is an interface.
        const INTERFACE = 0x0000_0020;
        /// The type is abstract.
        const ABSTRACT = 0x0000_0080;
        /// The type cannot be derived from.
        const SEALED = 0x0000_0100;
        /// The name is special; the runtime checks it.
        const SPECIAL_NAME = 0x0000_0400;
        /// Reserved for runtime use.
        const RT_SPECIAL_NAME = 0x0000_0800;
        /// The type is imported.
        const IMPORT = 0x0000_1000;
        /// The type is serializable.
        const SERIALIZABLE = 0x0000_2000;
        /// Static fields may be initialised lazily.
        const BEFORE_FIELD_INIT = 0x0010_0000;
    }
}

/// Decoded value of [`TypeAttributes::VISIBILITY_MASK`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeVisibility {
    NotPublic,
    Public,
    NestedPublic,
    NestedPrivate,
    NestedFamily,
    NestedAssembly,
    NestedFamilyAndAssembly,
    NestedFamilyOrAssembly,
}

impl TypeVisibility {
    /// Whether this visibility is only valid on nested types.
    pub const fn is_nested(self) -> bool {
        !matches!(self, TypeVisibility::NotPublic | TypeVisibility::Public)
    }

    const fn bits(self) -> u32 {
        match self {
            TypeVisibility::NotPublic => 0,
            TypeVisibility::Public => 1,
            TypeVisibility::NestedPublic => 2,
            TypeVisibility::NestedPrivate => 3,
            TypeVisibility::NestedFamily => 4,
            TypeVisibility::NestedAssembly => 5,
            TypeVisibility::NestedFamilyAndAssembly => 6,
            TypeVisibility::NestedFamilyOrAssembly => 7,
        }
    }
}

impl TypeAttributes {
    /// Decode the visibility field. All eight encodings are valid.
    pub const fn visibility(self) -> TypeVisibility {
        match self.bits() & Self::VISIBILITY_MASK.bits() {
            0 => TypeVisibility::NotPublic,
            1 => TypeVisibility::Public,
            2 => TypeVisibility::NestedPublic,
            3 => TypeVisibility::NestedPrivate,
            4 => TypeVisibility::NestedFamily,
            5 => TypeVisibility::NestedAssembly,
            6 => TypeVisibility::NestedFamilyAndAssembly,
            _ => TypeVisibility::NestedFamilyOrAssembly,
        }
    }

    /// Replace the visibility field.
    #[must_use]
    pub const fn with_visibility(self, visibility: TypeVisibility) -> Self {
        Self::from_bits_retain((self.bits() & !Self::VISIBILITY_MASK.bits()) | visibility.bits())
    }
}

/// Decoded member access field shared by methods and fields.
///
/// `None` from [`MemberAccess::from_bits`] means the reserved encoding 7.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberAccess {
    /// `PrivateScope`: the member cannot be referenced.
    CompilerControlled,
    Private,
    FamilyAndAssembly,
    Assembly,
    Family,
    FamilyOrAssembly,
    Public,
}

impl MemberAccess {
    /// Decode the low three access bits.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits & 0x7 {
            0 => Some(MemberAccess::CompilerControlled),
            1 => Some(MemberAccess::Private),
            2 => Some(MemberAccess::FamilyAndAssembly),
            3 => Some(MemberAccess::Assembly),
            4 => Some(MemberAccess::Family),
            5 => Some(MemberAccess::FamilyOrAssembly),
            6 => Some(MemberAccess::Public),
            _ => None,
        }
    }

    /// Encode as the low three access bits.
    pub const fn bits(self) -> u32 {
        match self {
            MemberAccess::CompilerControlled => 0,
            MemberAccess::Private => 1,
            MemberAccess::FamilyAndAssembly => 2,
            MemberAccess::Assembly => 3,
            MemberAccess::Family => 4,
            MemberAccess::FamilyOrAssembly => 5,
            MemberAccess::Public => 6,
        }
    }
}

bitflags! {
    /// `MethodDef` flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MethodAttributes: u32 {
        /// Member access field (3 bits), see [`MemberAccess`].
        const MEMBER_ACCESS_MASK = 0x0007;
        const STATIC = 0x0010;
        /// The method cannot be overridden.
        const FINAL = 0x0020;
        const VIRTUAL = 0x0040;
        const HIDE_BY_SIG = 0x0080;
        /// The method always gets a new vtable slot (otherwise it reuses
        /// the slot of the method it overrides).
        const NEW_SLOT = 0x0100;
        const STRICT = 0x0200;
        const ABSTRACT = 0x0400;
        const SPECIAL_NAME = 0x0800;
        const RT_SPECIAL_NAME = 0x1000;
        const PINVOKE_IMPL = 0x2000;
    }
}

impl MethodAttributes {
    /// Decode the member access field.
    pub const fn access(self) -> Option<MemberAccess> {
        MemberAccess::from_bits(self.bits())
    }

    /// Replace the member access field.
    #[must_use]
    pub const fn with_access(self, access: MemberAccess) -> Self {
        Self::from_bits_retain((self.bits() & !Self::MEMBER_ACCESS_MASK.bits()) | access.bits())
    }
}

bitflags! {
    /// `Field` flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FieldAttributes: u32 {
        /// Member access field (3 bits), see [`MemberAccess`].
        const FIELD_ACCESS_MASK = 0x0007;
        const STATIC = 0x0010;
        /// Assignable only during construction.
        const INIT_ONLY = 0x0020;
        /// Compile-time constant.
        const LITERAL = 0x0040;
        const NOT_SERIALIZED = 0x0080;
        const SPECIAL_NAME = 0x0200;
        const RT_SPECIAL_NAME = 0x0400;
        const HAS_DEFAULT = 0x8000;
    }
}

impl FieldAttributes {
    /// Decode the member access field.
    pub const fn access(self) -> Option<MemberAccess> {
        MemberAccess::from_bits(self.bits())
    }

    /// Replace the member access field.
    #[must_use]
    pub const fn with_access(self, access: MemberAccess) -> Self {
        Self::from_bits_retain((self.bits() & !Self::FIELD_ACCESS_MASK.bits()) | access.bits())
    }
}

bitflags! {
    /// `Param` flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ParamAttributes: u32 {
        const IN = 0x0001;
        const OUT = 0x0002;
        const OPTIONAL = 0x0010;
        const HAS_DEFAULT = 0x1000;
    }
}

bitflags! {
    /// `GenericParam` flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct GenericParamAttributes: u32 {
        /// Variance field (2 bits), see [`Variance`].
        const VARIANCE_MASK = 0x0003;
        const COVARIANT = 0x0001;
        const CONTRAVARIANT = 0x0002;
        /// Special constraint field (3 bits).
        const SPECIAL_CONSTRAINT_MASK = 0x001C;
        const REFERENCE_TYPE_CONSTRAINT = 0x0004;
        const NOT_NULLABLE_VALUE_TYPE_CONSTRAINT = 0x0008;
        const DEFAULT_CONSTRUCTOR_CONSTRAINT = 0x0010;
    }
}

/// Decoded variance of a generic parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Variance {
    Invariant,
    /// `out T`
    Covariant,
    /// `in T`
    Contravariant,
}

impl GenericParamAttributes {
    /// Decode the variance field; the reserved encoding 3 yields `None`.
    pub const fn variance(self) -> Option<Variance> {
        match self.bits() & Self::VARIANCE_MASK.bits() {
            0 => Some(Variance::Invariant),
            1 => Some(Variance::Covariant),
            2 => Some(Variance::Contravariant),
            _ => None,
        }
    }

    /// Whether any special constraint bit is set.
    pub const fn has_special_constraint(self) -> bool {
        self.intersects(Self::SPECIAL_CONSTRAINT_MASK)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
