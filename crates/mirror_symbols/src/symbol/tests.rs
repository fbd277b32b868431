use mirror_meta::{
    Constant, CustomAttribute, FieldAttributes, MemberAccess, MethodAttributes, ParamAttributes,
    TypeAttributes, TypeHandle, TypeVisibility, UniverseBuilder,
};
use pretty_assertions::assert_eq;

use super::*;

fn public_method() -> MethodAttributes {
    MethodAttributes::empty().with_access(MemberAccess::Public)
}

fn public_class(builder: &mut UniverseBuilder, name: &str) -> TypeHandle {
    let object = builder.core().object;
    let ty = builder
        .define_type(
            "Acme",
            name,
            TypeAttributes::empty().with_visibility(TypeVisibility::Public),
        )
        .expect("define type");
    builder.set_base(ty, object).expect("set base");
    ty
}

fn invariant_reason(result: SymbolResult<impl std::fmt::Debug>) -> &'static str {
    match result {
        Err(SymbolError::InvariantViolation { reason, .. }) => reason,
        other => panic!("expected an invariant violation, got {other:?}"),
    }
}

#[test]
fn abstract_method_must_be_virtual() {
    let mut builder = UniverseBuilder::new();
    let void = builder.core().void;
    let ty = public_class(&mut builder, "Broken");
    let method = builder
        .define_method(ty, "Run", public_method() | MethodAttributes::ABSTRACT, void)
        .expect("define method");
    let cache = SymbolCache::new(builder.finish());

    let symbol = cache.resolve_method(method).expect("resolve");
    assert_eq!(
        invariant_reason(symbol.flags(&cache)),
        "abstract method is not virtual"
    );

    // The failure is memoized with the attribute.
    let derivations = cache.stats().derivations;
    assert!(symbol.flags(&cache).is_err());
    assert_eq!(cache.stats().derivations, derivations);
}

#[test]
fn literal_field_needs_a_constant() {
    let mut builder = UniverseBuilder::new();
    let int32 = builder.core().int32;
    let ty = public_class(&mut builder, "Limits");
    let literal = FieldAttributes::empty().with_access(MemberAccess::Public)
        | FieldAttributes::STATIC
        | FieldAttributes::LITERAL;
    let broken = builder
        .define_field(ty, "Broken", literal, int32)
        .expect("define field");
    let fine = builder
        .define_field(ty, "Fine", literal, int32)
        .expect("define field");
    builder.set_field_constant(fine, Constant::Int(3)).expect("valid handle");
    let cache = SymbolCache::new(builder.finish());

    let broken = cache.resolve_field(broken).expect("resolve");
    assert_eq!(
        invariant_reason(broken.flags(&cache)),
        "literal field has no constant value"
    );
    let fine = cache.resolve_field(fine).expect("resolve");
    assert_eq!(
        fine.flags(&cache),
        Ok(SymbolFlags::STATIC | SymbolFlags::CONSTANT)
    );
}

#[test]
fn property_without_accessors_cannot_be_classified() {
    let mut builder = UniverseBuilder::new();
    let int32 = builder.core().int32;
    let ty = public_class(&mut builder, "Hollow");
    let property = builder
        .define_property(ty, "Ghost", int32, None, None)
        .expect("define property");
    let cache = SymbolCache::new(builder.finish());

    let symbol = cache.resolve_property(property).expect("resolve");
    assert_eq!(
        invariant_reason(symbol.flags(&cache)),
        "property has no accessors"
    );
    assert_eq!(
        invariant_reason(symbol.access(&cache)),
        "property has no accessors"
    );
}

#[test]
fn compiler_controlled_and_reserved_access() {
    let mut builder = UniverseBuilder::new();
    let (void, int32) = (builder.core().void, builder.core().int32);
    let ty = public_class(&mut builder, "Odd");
    let hidden = builder
        .define_method(ty, "Hidden", MethodAttributes::empty(), void)
        .expect("define method");
    let reserved = builder
        .define_field(ty, "reserved", FieldAttributes::from_bits_retain(0x0007), int32)
        .expect("define field");
    let cache = SymbolCache::new(builder.finish());

    let hidden = cache.resolve_method(hidden).expect("resolve");
    assert_eq!(
        invariant_reason(hidden.access(&cache)),
        "compiler-controlled or reserved member access"
    );
    let reserved = cache.resolve_field(reserved).expect("resolve");
    assert!(matches!(
        reserved.access(&cache),
        Err(SymbolError::InvariantViolation { .. })
    ));
}

#[test]
fn top_level_type_with_nested_visibility() {
    let mut builder = UniverseBuilder::new();
    let ty = builder
        .define_type(
            "Acme",
            "Misplaced",
            TypeAttributes::empty().with_visibility(TypeVisibility::NestedPublic),
        )
        .expect("define type");
    let cache = SymbolCache::new(builder.finish());

    let symbol = cache.resolve_type(ty).expect("resolve");
    assert_eq!(
        invariant_reason(symbol.access(&cache)),
        "type visibility does not match its nesting"
    );
}

#[test]
fn constructed_types_borrow_access_from_their_element() {
    let mut builder = UniverseBuilder::new();
    let object = builder.core().object;
    let hidden = builder
        .define_type("Acme", "Hidden", TypeAttributes::empty())
        .expect("define type");
    builder.set_base(hidden, object).expect("set base");
    let array = builder.array(hidden, 2).expect("valid handle");
    let by_ref = builder.by_ref(hidden).expect("valid handle");
    let cache = SymbolCache::new(builder.finish());

    let array = cache.resolve_type(array).expect("resolve");
    assert_eq!(array.access(&cache), Ok(Access::Internal));
    assert_eq!(array.as_type().expect("type").array_rank(&cache), Some(2));
    assert_eq!(array.flags(&cache), Ok(SymbolFlags::empty()));

    let by_ref = cache.resolve_type(by_ref).expect("resolve");
    assert_eq!(by_ref.flags(&cache), Ok(SymbolFlags::BY_REF));
    let element = by_ref
        .as_type()
        .expect("type")
        .element_type(&cache)
        .expect("element")
        .expect("by-ref has an element");
    assert!(Arc::ptr_eq(
        &element,
        &cache.resolve_type(hidden).expect("resolve")
    ));
}

#[test]
fn ref_returns_and_parameters() {
    let mut builder = UniverseBuilder::new();
    let int32 = builder.core().int32;
    let ty = public_class(&mut builder, "Slots");
    let int_ref = builder.by_ref(int32).expect("valid handle");
    let method = builder
        .define_method(ty, "At", public_method(), int_ref)
        .expect("define method");
    builder.add_param(method, "index", int32, ParamAttributes::empty()).expect("valid handle");
    builder.add_param(method, "slot", int_ref, ParamAttributes::empty()).expect("valid handle");
    let cache = SymbolCache::new(builder.finish());

    let symbol = cache.resolve_method(method).expect("resolve");
    assert_eq!(symbol.flags(&cache), Ok(SymbolFlags::BY_REF));

    let params = symbol.parameters(&cache).expect("parameters");
    assert_eq!(params[0].flags(&cache), Ok(SymbolFlags::empty()));
    assert_eq!(params[1].flags(&cache), Ok(SymbolFlags::BY_REF));
    assert_eq!(params[1].as_parameter().expect("parameter").position(), 1);
}

#[test]
fn flags_are_derived_lazily() {
    let mut builder = UniverseBuilder::new();
    let ty = public_class(&mut builder, "Lazy");
    let cache = SymbolCache::new(builder.finish());

    let symbol = cache.resolve_type(ty).expect("resolve");
    assert!(!symbol.is_flags_derived());
    assert_eq!(symbol.flags(&cache), Ok(SymbolFlags::empty()));
    assert!(symbol.is_flags_derived());
}

#[test]
fn symbol_names_and_attributes() {
    let mut builder = UniverseBuilder::new();
    let (obsolete, int32) = (builder.core().obsolete_attribute, builder.core().int32);
    let ty = public_class(&mut builder, "Named");
    let ctor = builder
        .define_constructor(ty, public_method(), false)
        .expect("define constructor");
    let field = builder
        .define_field(
            ty,
            "old",
            FieldAttributes::empty().with_access(MemberAccess::Private),
            int32,
        )
        .expect("define field");
    builder.add_field_attribute(field, CustomAttribute::marker(obsolete)).expect("valid handle");
    let cache = SymbolCache::new(builder.finish());

    let ctor = cache.resolve_method(ctor).expect("resolve");
    assert_eq!(ctor.name(&cache), ".ctor");
    assert_eq!(ctor.kind_name(), "constructor");
    assert!(!ctor
        .as_constructor()
        .expect("constructor")
        .is_type_initializer(&cache));
    assert_eq!(ctor.parameters(&cache).map(|p| p.len()), Ok(0));

    let field = cache.resolve_field(field).expect("resolve");
    assert_eq!(field.custom_attributes(&cache).len(), 1);
    assert_eq!(field.custom_attributes(&cache)[0].ty, obsolete);
    assert_eq!(field.access(&cache), Ok(Access::Private));
}

#[test]
fn non_delegate_types_have_no_parameter_list() {
    let mut builder = UniverseBuilder::new();
    let ty = public_class(&mut builder, "Plain");
    let cache = SymbolCache::new(builder.finish());

    let symbol = cache.resolve_type(ty).expect("resolve");
    assert!(matches!(
        symbol.parameters(&cache),
        Err(SymbolError::UnsupportedSymbolKind { .. })
    ));
    assert!(matches!(
        symbol.as_field(),
        Err(SymbolError::UnsupportedSymbolKind { kind: "type", .. })
    ));
}
