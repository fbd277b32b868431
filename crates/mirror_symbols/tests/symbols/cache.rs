//! Identity, sharing, and lookup failures.

use std::sync::Arc;

use mirror_symbols::{ArgSignature, NativeHandle, SymbolError, SymbolKey};
use pretty_assertions::assert_eq;

use crate::common::{acme, member, overload, sig, ty};

#[test]
fn same_identity_yields_same_descriptor() {
    let cache = acme();
    let first = member(&cache, "Acme.Collections.Bag`1", "Capacity");
    let second = member(&cache, "Acme.Collections.Bag`1", "Capacity");
    assert!(Arc::ptr_eq(&first, &second));

    let by_key = cache.resolve(first.key()).expect("resolve by key");
    assert!(Arc::ptr_eq(&first, &by_key));

    let by_handle = cache.resolve_handle(first.handle()).expect("resolve by handle");
    assert!(Arc::ptr_eq(&first, &by_handle));
}

#[test]
fn related_symbols_are_shared() {
    let cache = acme();
    let add = overload(&cache, "Acme.Collections.Bag`1", "Add", 1);
    let item = &add.parameters(&cache).expect("parameters")[0];
    let item_again = &add.parameters(&cache).expect("parameters")[0];
    assert!(Arc::ptr_eq(item, item_again));

    let declaring = item
        .as_parameter()
        .expect("parameter")
        .declaring_method(&cache)
        .expect("declaring method");
    assert!(Arc::ptr_eq(&declaring, &add));

    let bag = ty(&cache, "Acme.Collections.Bag`1");
    let owner = add
        .declaring_type(&cache)
        .expect("declaring type")
        .expect("members have a declaring type");
    assert!(Arc::ptr_eq(&owner, &bag));
}

#[test]
fn concurrent_resolution_agrees_on_one_descriptor() {
    let cache = acme();
    let bag = ty(&cache, "Acme.Collections.Bag`1");

    let resolved: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let symbol = cache.member(&bag, "Count").expect("Count");
                    let text = sig(&cache, &symbol);
                    (symbol, text)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect()
    });

    let (first, first_text) = &resolved[0];
    for (symbol, text) in &resolved {
        assert!(Arc::ptr_eq(first, symbol));
        assert_eq!(first_text, text);
    }
}

#[test]
fn derived_attributes_are_computed_once() {
    let cache = acme();
    let capacity = member(&cache, "Acme.Collections.Bag`1", "Capacity");
    assert!(!capacity.is_flags_derived());

    let options = mirror_symbols::SignatureOptions::default();
    let first = mirror_symbols::signature(&cache, &capacity, options).expect("signature");
    assert!(capacity.is_flags_derived());
    let after_first = cache.stats();

    let second = mirror_symbols::signature(&cache, &capacity, options).expect("signature");
    let after_second = cache.stats();

    assert_eq!(after_first.derivations, after_second.derivations);
    assert_eq!(after_first.symbols, after_second.symbols);
    assert!(std::ptr::eq(first, second));
}

#[test]
fn stats_count_hits_and_misses() {
    let cache = acme();
    assert!(cache.is_empty());

    let bag = ty(&cache, "Acme.Collections.Bag`1");
    let before = cache.stats();
    let again = ty(&cache, "Acme.Collections.Bag`1");
    let after = cache.stats();

    assert!(Arc::ptr_eq(&bag, &again));
    assert_eq!(after.hits, before.hits + 1);
    assert_eq!(after.misses, before.misses);
    assert_eq!(after.symbols, cache.len());
}

#[test]
fn unknown_member_is_not_found() {
    let cache = acme();
    let bag = ty(&cache, "Acme.Collections.Bag`1");

    let err = cache.member(&bag, "Missing").expect_err("no such member");
    assert_eq!(
        err,
        SymbolError::SymbolNotFound {
            what: "member `Missing` of `Acme.Collections.Bag`1`".to_owned()
        }
    );

    let err = cache
        .methods_named(&bag, "Capacity")
        .expect_err("Capacity is a field");
    assert!(matches!(err, SymbolError::SymbolNotFound { .. }));

    let err = cache.find_type("Acme.Nowhere").expect_err("no such type");
    assert!(matches!(err, SymbolError::SymbolNotFound { .. }));
}

#[test]
fn mismatched_key_is_not_found() {
    let cache = acme();
    let capacity = member(&cache, "Acme.Collections.Bag`1", "Capacity");
    let max = member(&cache, "Acme.Collections.Bag`1", "Max");
    let before = cache.len();

    let forged = SymbolKey::new(
        max.key().name(),
        capacity.key().declaring(),
        capacity.handle(),
        ArgSignature::new(),
    );
    let err = cache.resolve(&forged).expect_err("name disagrees with handle");
    assert!(matches!(err, SymbolError::SymbolNotFound { .. }));

    let wrong_args = SymbolKey::new(
        capacity.key().name(),
        capacity.key().declaring(),
        capacity.handle(),
        ArgSignature::from_slice(&[cache.universe().core().int32]),
    );
    assert!(matches!(
        cache.resolve(&wrong_args),
        Err(SymbolError::SymbolNotFound { .. })
    ));
    assert_eq!(cache.len(), before);
}

#[test]
fn constructor_handles_resolve_to_constructors() {
    let cache = acme();
    let ctor = member(&cache, "Acme.Collections.Bag`1", ".ctor");
    let NativeHandle::Constructor(handle) = ctor.handle() else {
        panic!("expected a constructor handle, got {:?}", ctor.handle());
    };

    let via_method = cache.resolve_method(handle).expect("resolve as method");
    assert!(Arc::ptr_eq(&ctor, &via_method));
    assert_eq!(via_method.kind_name(), "constructor");

    let add = overload(&cache, "Acme.Collections.Bag`1", "Add", 1);
    let method = add.as_method().expect("method").handle();
    assert!(matches!(
        cache.resolve_handle(NativeHandle::Constructor(method)),
        Err(SymbolError::SymbolNotFound { .. })
    ));
}

#[test]
fn members_come_in_declaration_groups() {
    let cache = acme();
    let bag = ty(&cache, "Acme.Collections.Bag`1");
    let names: Vec<(&str, String)> = cache
        .members(&bag)
        .expect("members")
        .iter()
        .map(|m| (m.kind_name(), m.name(&cache).to_owned()))
        .collect();

    let expected: Vec<(&str, String)> = [
        ("type", "Node"),
        ("field", "Capacity"),
        ("field", "Max"),
        ("field", "items"),
        ("constructor", ".ctor"),
        ("constructor", ".cctor"),
        ("property", "Item"),
        ("property", "Count"),
        ("property", "Label"),
        ("event", "Changed"),
        ("method", "Add"),
        ("method", "Add"),
        ("method", "TryTake"),
        ("method", "Convert"),
        ("method", "FlushAsync"),
        ("method", "op_Addition"),
        ("method", "op_Implicit"),
    ]
    .into_iter()
    .map(|(kind, name)| (kind, name.to_owned()))
    .collect();
    assert_eq!(names, expected);
}

#[test]
fn enum_members_skip_the_value_field() {
    let cache = acme();
    let color = ty(&cache, "Acme.Drawing.Color");
    let names: Vec<String> = cache
        .members(&color)
        .expect("members")
        .iter()
        .map(|m| m.name(&cache).to_owned())
        .collect();
    assert_eq!(names, vec!["Red".to_owned(), "Green".to_owned()]);
}

#[test]
fn instances_lead_back_to_their_definition() {
    let cache = acme();
    let circle = ty(&cache, "Acme.Drawing.Circle");
    let interfaces = circle
        .as_type()
        .expect("type")
        .interfaces(&cache)
        .expect("interfaces");
    assert_eq!(interfaces.len(), 1);

    let mapper = ty(&cache, "Acme.Collections.IMapper`2");
    let definition = cache
        .generic_definition(&interfaces[0])
        .expect("definition");
    assert!(Arc::ptr_eq(&definition, &mapper));
    assert!(Arc::ptr_eq(
        &cache.generic_definition(&mapper).expect("definition"),
        &mapper
    ));

    let args = interfaces[0]
        .as_type()
        .expect("type")
        .generic_arguments(&cache)
        .expect("arguments");
    assert_eq!(args.len(), 2);
    assert!(Arc::ptr_eq(&args[1], &ty(&cache, "Acme.Drawing.Shape")));
}

#[test]
fn nested_types_match_by_simple_name() {
    let cache = acme();
    let node = member(&cache, "Acme.Collections.Bag`1", "Node");
    let direct = ty(&cache, "Acme.Collections.Bag`1+Node");
    assert!(Arc::ptr_eq(&node, &direct));
}
