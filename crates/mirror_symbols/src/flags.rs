//! Kind flags of a symbol descriptor.

use bitflags::bitflags;

bitflags! {
    /// Derived modifier and shape flags.
    ///
    /// Meanings vary slightly per kind: `FINAL` is `sealed` on types,
    /// `sealed override` on methods, and immutable after construction on
    /// fields, where it always comes with `READONLY`.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct SymbolFlags: u32 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        const VIRTUAL = 1 << 2;
        const FINAL = 1 << 3;
        const OVERRIDE = 1 << 4;
        /// A generic definition or an instantiation.
        const GENERIC = 1 << 5;
        /// Declares its own generic parameters.
        const GENERIC_DEFINITION = 1 << 6;
        /// `readonly` field, struct, or struct member; get-only property.
        const READONLY = 1 << 7;
        /// `const` field.
        const CONSTANT = 1 << 8;
        /// By-reference type, field, return, or parameter.
        const BY_REF = 1 << 9;
        /// Property with index parameters.
        const INDEXER = 1 << 10;
        /// Property whose setter is `init`.
        const INIT_ONLY = 1 << 11;
        /// Method compiled as an async state machine.
        const ASYNC = 1 << 12;
        /// Accessor, operator, or runtime-special member.
        const SPECIAL_NAME = 1 << 13;
        /// `ref struct`.
        const REF_LIKE = 1 << 14;
        const IN = 1 << 15;
        const OUT = 1 << 16;
        const OPTIONAL = 1 << 17;
        /// `params` array parameter.
        const PARAMS = 1 << 18;
        /// `this` parameter of an extension method.
        const RECEIVER = 1 << 19;
    }
}
