use mirror_meta::{
    CustomAttribute, GenericParamAttributes, MemberAccess, MethodAttributes, ParamAttributes,
    TypeAttributes, TypeVisibility, UniverseBuilder,
};
use pretty_assertions::assert_eq;

use super::*;

fn public() -> TypeAttributes {
    TypeAttributes::empty().with_visibility(TypeVisibility::Public)
}

fn public_method() -> MethodAttributes {
    MethodAttributes::empty().with_access(MemberAccess::Public)
}

/// `Acme.Box<T>` with `T Get()`, `U Map<U>(T value)`, and `Map<string>`.
struct Boxes {
    cache: SymbolCache,
    box_ty: TypeHandle,
    t: TypeHandle,
    map: MethodHandle,
    u: TypeHandle,
    map_string: MethodHandle,
    box_int: TypeHandle,
}

fn boxes() -> Boxes {
    let mut builder = UniverseBuilder::new();
    let core = builder.core().clone();
    let box_ty = builder.define_type("Acme", "Box`1", public()).expect("define");
    builder.set_base(box_ty, core.object).expect("set base");
    let t = builder
        .add_type_generic_param(box_ty, "T", GenericParamAttributes::empty())
        .expect("generic param");
    builder
        .define_method(box_ty, "Get", public_method(), t)
        .expect("define method");
    let map = builder
        .define_method(box_ty, "Map", public_method(), core.void)
        .expect("define method");
    let u = builder
        .add_method_generic_param(map, "U", GenericParamAttributes::empty())
        .expect("valid handle");
    builder.set_return_type(map, u).expect("valid handle");
    builder.add_param(map, "value", t, ParamAttributes::empty()).expect("valid handle");
    let map_string = builder
        .instantiate_method(map, &[core.string])
        .expect("instantiate method");
    let box_int = builder.instantiate(box_ty, &[core.int32]).expect("instantiate");
    Boxes {
        cache: SymbolCache::new(builder.finish()),
        box_ty,
        t,
        map,
        u,
        map_string,
        box_int,
    }
}

#[test]
fn new_cache_is_empty() {
    let Boxes { cache, .. } = boxes();
    assert!(cache.is_empty());
    assert_eq!(cache.stats(), CacheStats::default());
    assert_eq!(cache.extension_scope(), &ExtensionScope::AllLoadedTypes);
}

#[test]
fn resolving_fills_exactly_one_entry() {
    let Boxes { cache, box_ty, .. } = boxes();
    let first = cache.resolve_type(box_ty).expect("resolve");
    let second = cache.resolve_type(box_ty).expect("resolve");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
    let stats = cache.stats();
    assert_eq!((stats.misses, stats.hits, stats.symbols), (1, 1, 1));
}

#[test]
fn generic_parameter_identity_names_its_owner() {
    let Boxes {
        cache,
        box_ty,
        t,
        u,
        ..
    } = boxes();
    assert_eq!(
        cache.identity_of(NativeHandle::Type(t)).expect("identity").declaring(),
        Some(box_ty)
    );
    // A method's parameter belongs to the method's declaring type.
    assert_eq!(
        cache.identity_of(NativeHandle::Type(u)).expect("identity").declaring(),
        Some(box_ty)
    );
}

#[test]
fn instance_identity_carries_arguments() {
    let Boxes {
        cache, box_int, ..
    } = boxes();
    let int32 = cache.universe().core().int32;
    let key = cache.identity_of(NativeHandle::Type(box_int)).expect("identity");
    assert_eq!(key.args(), &[int32]);
    assert_eq!(key.declaring(), None);
}

#[test]
fn method_instantiation_identity() {
    let Boxes {
        cache,
        t,
        map,
        map_string,
        ..
    } = boxes();
    let string = cache.universe().core().string;

    let definition = cache.identity_of(NativeHandle::Method(map)).expect("identity");
    assert_eq!(definition.args(), &[t]);

    // Parameter types after substitution, then the type arguments.
    let instance = cache
        .identity_of(NativeHandle::Method(map_string))
        .expect("identity");
    assert_eq!(instance.args(), &[t, string]);
    assert_ne!(definition, instance);

    let instance = cache.resolve_method(map_string).expect("resolve");
    let back = cache.generic_definition(&instance).expect("definition");
    assert!(Arc::ptr_eq(&back, &cache.resolve_method(map).expect("resolve")));
    assert!(Arc::ptr_eq(
        &instance
            .as_method()
            .expect("method")
            .generic_definition(&cache)
            .expect("definition"),
        &back
    ));

    let args = instance
        .as_method()
        .expect("method")
        .generic_arguments(&cache)
        .expect("arguments");
    assert_eq!(args.len(), 1);
    assert_eq!(args[0].name(&cache), "String");
}

#[test]
fn parameter_identity_is_keyed_by_type() {
    let Boxes { cache, t, map, .. } = boxes();
    let param = mirror_meta::ParamHandle::new(map, 0);
    let key = cache
        .identity_of(NativeHandle::Parameter(param))
        .expect("identity");
    assert_eq!(key.args(), &[t]);

    let missing = mirror_meta::ParamHandle::new(map, 5);
    assert!(matches!(
        cache.resolve_parameter(missing),
        Err(SymbolError::SymbolNotFound { .. })
    ));
}

#[test]
fn instances_list_their_definition_members() {
    let Boxes {
        cache, box_int, ..
    } = boxes();
    let instance = cache.resolve_type(box_int).expect("resolve");
    let names: Vec<String> = cache
        .members(&instance)
        .expect("members")
        .iter()
        .map(|m| m.name(&cache).to_owned())
        .collect();
    assert_eq!(names, vec!["Get".to_owned(), "Map".to_owned()]);
}

#[test]
fn members_reject_non_types() {
    let Boxes { cache, map, .. } = boxes();
    let method = cache.resolve_method(map).expect("resolve");
    assert!(matches!(
        cache.members(&method),
        Err(SymbolError::UnsupportedSymbolKind { .. })
    ));
}

#[test]
fn extension_index_dedups_containers() {
    let mut builder = UniverseBuilder::new();
    let core = builder.core().clone();
    let marker = CustomAttribute::marker(core.extension_attribute);
    let static_class = public() | TypeAttributes::ABSTRACT | TypeAttributes::SEALED;
    let awaiters = builder
        .define_type("Acme", "Awaiters", static_class)
        .expect("define");
    builder
        .add_type_attribute(awaiters, marker.clone())
        .expect("attribute");
    let get_awaiter = builder
        .define_method(
            awaiters,
            "GetAwaiter",
            public_method() | MethodAttributes::STATIC,
            core.object,
        )
        .expect("define method");
    builder
        .add_param(get_awaiter, "value", core.string, ParamAttributes::empty())
        .expect("valid handle");
    builder.add_method_attribute(get_awaiter, marker).expect("valid handle");
    let universe = builder.finish();

    let cache = SymbolCache::with_extension_scope(
        universe,
        ExtensionScope::Containers(vec![awaiters, awaiters]),
    );
    assert_eq!(cache.awaiter_extension_count(), 1);
    let string = cache.resolve_type(core.string).expect("resolve");
    assert_eq!(string.is_awaitable(&cache), Ok(true));
    let int32 = cache.resolve_type(core.int32).expect("resolve");
    assert_eq!(int32.is_awaitable(&cache), Ok(false));
    let void = cache.resolve_type(core.void).expect("resolve");
    assert_eq!(void.is_awaitable(&cache), Ok(false));
}
