//! Declared accessibility.

use std::fmt;

use mirror_meta::{MemberAccess, TypeVisibility};

/// C# access modifier, ordered from most to least restrictive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Access {
    Private,
    PrivateProtected,
    Protected,
    Internal,
    ProtectedInternal,
    Public,
}

impl Access {
    /// The modifier keyword(s).
    pub fn keyword(self) -> &'static str {
        match self {
            Access::Private => "private",
            Access::PrivateProtected => "private protected",
            Access::Protected => "protected",
            Access::Internal => "internal",
            Access::ProtectedInternal => "protected internal",
            Access::Public => "public",
        }
    }

    /// Decode a method or field access field. Compiler-controlled members
    /// have no modifier.
    pub fn from_member(access: MemberAccess) -> Option<Self> {
        match access {
            MemberAccess::CompilerControlled => None,
            MemberAccess::Private => Some(Access::Private),
            MemberAccess::FamilyAndAssembly => Some(Access::PrivateProtected),
            MemberAccess::Assembly => Some(Access::Internal),
            MemberAccess::Family => Some(Access::Protected),
            MemberAccess::FamilyOrAssembly => Some(Access::ProtectedInternal),
            MemberAccess::Public => Some(Access::Public),
        }
    }

    /// Decode a type visibility field; `nested` says whether the type has
    /// an enclosing type, which must agree with the encoding.
    pub fn from_visibility(visibility: TypeVisibility, nested: bool) -> Option<Self> {
        if visibility.is_nested() != nested {
            return None;
        }
        Some(match visibility {
            TypeVisibility::NotPublic | TypeVisibility::NestedAssembly => Access::Internal,
            TypeVisibility::Public | TypeVisibility::NestedPublic => Access::Public,
            TypeVisibility::NestedPrivate => Access::Private,
            TypeVisibility::NestedFamily => Access::Protected,
            TypeVisibility::NestedFamilyAndAssembly => Access::PrivateProtected,
            TypeVisibility::NestedFamilyOrAssembly => Access::ProtectedInternal,
        })
    }

    /// The least restrictive of several modifiers.
    pub fn least_restrictive(accesses: impl IntoIterator<Item = Access>) -> Option<Access> {
        accesses.into_iter().max()
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;

    #[test]
    fn least_restrictive_prefers_public() {
        assert_eq!(
            Access::least_restrictive([Access::Private, Access::Public]),
            Some(Access::Public)
        );
        assert_eq!(
            Access::least_restrictive([Access::Protected, Access::Internal]),
            Some(Access::Internal)
        );
        assert_eq!(
            Access::least_restrictive([Access::PrivateProtected, Access::Private]),
            Some(Access::PrivateProtected)
        );
        assert_eq!(Access::least_restrictive(std::iter::empty()), None);
    }

    #[test]
    fn visibility_must_match_nesting() {
        assert_eq!(
            Access::from_visibility(TypeVisibility::NestedFamily, true),
            Some(Access::Protected)
        );
        assert_eq!(Access::from_visibility(TypeVisibility::NestedFamily, false), None);
        assert_eq!(Access::from_visibility(TypeVisibility::Public, true), None);
        assert_eq!(
            Access::from_visibility(TypeVisibility::NotPublic, false),
            Some(Access::Internal)
        );
    }
}
