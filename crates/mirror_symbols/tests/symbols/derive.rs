//! Flags, access, extension methods, and awaitability.

use mirror_symbols::{Access, SymbolError, SymbolFlags, TypeCategory};
use pretty_assertions::assert_eq;

use crate::common::{acme, acme_scoped, member, overload, ty};

const BAG: &str = "Acme.Collections.Bag`1";

fn flags_of(cache: &mirror_symbols::SymbolCache, type_name: &str, name: &str) -> SymbolFlags {
    member(cache, type_name, name)
        .flags(cache)
        .expect("flags derive")
}

#[test]
fn type_flags() {
    let cache = acme();
    let flags = |name| ty(&cache, name).flags(&cache).expect("flags");

    assert_eq!(
        flags(BAG),
        SymbolFlags::GENERIC | SymbolFlags::GENERIC_DEFINITION
    );
    assert_eq!(flags("Acme.Collections.BagExtensions"), SymbolFlags::STATIC);
    assert_eq!(flags("Acme.Drawing.Shape"), SymbolFlags::ABSTRACT);
    assert_eq!(flags("Acme.Drawing.Circle"), SymbolFlags::FINAL);
    assert!(flags("Acme.Drawing.Point").contains(SymbolFlags::READONLY));
    assert!(!flags("Acme.Collections.IMapper`2").contains(SymbolFlags::ABSTRACT));
}

#[test]
fn instance_flags_drop_generic_definition() {
    let cache = acme();
    let circle = ty(&cache, "Acme.Drawing.Circle");
    let mapper = &circle
        .as_type()
        .expect("type")
        .interfaces(&cache)
        .expect("interfaces")[0];

    let flags = mapper.flags(&cache).expect("flags");
    assert!(flags.contains(SymbolFlags::GENERIC));
    assert!(!flags.contains(SymbolFlags::GENERIC_DEFINITION));
    assert_eq!(mapper.access(&cache), Ok(Access::Public));
}

#[test]
fn type_categories() {
    let cache = acme();
    let category = |name| {
        ty(&cache, name)
            .as_type()
            .expect("type")
            .category(&cache)
            .expect("category")
    };
    assert_eq!(category(BAG), TypeCategory::Class);
    assert_eq!(category("Acme.Collections.IMapper`2"), TypeCategory::Interface);
    assert_eq!(category("Acme.Drawing.Point"), TypeCategory::Struct);
    assert_eq!(category("Acme.Drawing.Color"), TypeCategory::Enum);
    assert_eq!(category("Acme.Drawing.Renderer`1"), TypeCategory::Delegate);
}

#[test]
fn field_flags() {
    let cache = acme();
    assert_eq!(
        flags_of(&cache, BAG, "Capacity"),
        SymbolFlags::STATIC | SymbolFlags::READONLY | SymbolFlags::FINAL
    );
    assert_eq!(
        flags_of(&cache, BAG, "Max"),
        SymbolFlags::STATIC | SymbolFlags::CONSTANT
    );
    assert_eq!(
        flags_of(&cache, BAG, "items"),
        SymbolFlags::READONLY | SymbolFlags::FINAL
    );
}

#[test]
fn readonly_fields_are_final() {
    let cache = acme();
    let x = flags_of(&cache, "Acme.Drawing.Point", "X");
    assert!(x.contains(SymbolFlags::FINAL));
    assert!(x.contains(SymbolFlags::READONLY));
    // Constants are not init-only.
    assert!(!flags_of(&cache, BAG, "Max").contains(SymbolFlags::FINAL));

    // The flag never leaks into the rendered modifiers.
    let x = crate::common::member(&cache, "Acme.Drawing.Point", "X");
    assert_eq!(crate::common::sig(&cache, &x), "public readonly int X;");
}

#[test]
fn method_inheritance_flags() {
    let cache = acme();
    assert_eq!(
        flags_of(&cache, "Acme.Drawing.Shape", "Draw"),
        SymbolFlags::ABSTRACT
    );
    assert_eq!(
        flags_of(&cache, "Acme.Drawing.Circle", "Draw"),
        SymbolFlags::OVERRIDE | SymbolFlags::FINAL
    );
    assert_eq!(flags_of(&cache, BAG, "TryTake"), SymbolFlags::VIRTUAL);
    assert!(flags_of(&cache, BAG, "op_Addition")
        .contains(SymbolFlags::STATIC | SymbolFlags::SPECIAL_NAME));
    assert!(flags_of(&cache, BAG, "FlushAsync").contains(SymbolFlags::ASYNC));
    assert!(flags_of(&cache, BAG, "Convert")
        .contains(SymbolFlags::GENERIC | SymbolFlags::GENERIC_DEFINITION));
}

#[test]
fn property_flags() {
    let cache = acme();
    assert!(flags_of(&cache, BAG, "Item").contains(SymbolFlags::INDEXER));
    assert!(!flags_of(&cache, BAG, "Count").contains(SymbolFlags::READONLY));
    assert!(flags_of(&cache, BAG, "Label").contains(SymbolFlags::INIT_ONLY));
    assert_eq!(
        flags_of(&cache, "Acme.Drawing.Shape", "Area"),
        SymbolFlags::ABSTRACT | SymbolFlags::READONLY
    );
    assert_eq!(
        flags_of(&cache, "Acme.Drawing.Circle", "Area"),
        SymbolFlags::OVERRIDE | SymbolFlags::READONLY
    );
}

#[test]
fn parameter_flags() {
    let cache = acme();
    let params = |type_name, name| {
        member(&cache, type_name, name)
            .parameters(&cache)
            .expect("parameters")
            .iter()
            .map(|p| p.flags(&cache).expect("flags"))
            .collect::<Vec<_>>()
    };

    assert_eq!(
        params("Acme.Drawing.Shape", "Paint"),
        vec![
            SymbolFlags::OPTIONAL,
            SymbolFlags::BY_REF | SymbolFlags::IN | SymbolFlags::READONLY,
        ]
    );
    assert_eq!(
        params(BAG, "TryTake"),
        vec![SymbolFlags::BY_REF | SymbolFlags::OUT]
    );
    assert_eq!(params(BAG, "Convert"), vec![SymbolFlags::PARAMS]);
}

#[test]
fn member_access() {
    let cache = acme();
    let access = |type_name, name| member(&cache, type_name, name).access(&cache);

    assert_eq!(access(BAG, "Capacity"), Ok(Access::Public));
    assert_eq!(access(BAG, "items"), Ok(Access::Private));
    assert_eq!(access("Acme.Drawing.Shape", "Draw"), Ok(Access::Protected));
    assert_eq!(access(BAG, ".cctor"), Ok(Access::Private));
    assert_eq!(access("Acme.Collections.IMapper`2", "Map"), Ok(Access::Public));
}

#[test]
fn property_access_is_least_restrictive_accessor() {
    let cache = acme();
    let count = member(&cache, BAG, "Count");
    assert_eq!(count.access(&cache), Ok(Access::Public));

    let property = count.as_property().expect("property");
    let setter = property
        .setter(&cache)
        .expect("setter resolves")
        .expect("Count has a setter");
    assert_eq!(setter.access(&cache), Ok(Access::Private));
}

#[test]
fn parameters_and_generic_parameters_have_no_access() {
    let cache = acme();
    let add = overload(&cache, BAG, "Add", 1);
    let item = &add.parameters(&cache).expect("parameters")[0];
    assert_eq!(
        item.access(&cache),
        Err(SymbolError::UnsupportedSymbolKind {
            kind: "parameter",
            attribute: "access modifier",
        })
    );

    let bag = ty(&cache, BAG);
    let t = &bag
        .as_type()
        .expect("type")
        .generic_parameters(&cache)
        .expect("generic parameters")[0];
    assert!(matches!(
        t.access(&cache),
        Err(SymbolError::UnsupportedSymbolKind { .. })
    ));
}

#[test]
fn extension_method_rule() {
    let cache = acme();
    let count_all = member(&cache, "Acme.Collections.BagExtensions", "CountAll");
    assert_eq!(
        count_all.as_method().expect("method").is_extension_method(&cache),
        Ok(true)
    );
    let receiver = &count_all.parameters(&cache).expect("parameters")[0];
    assert!(receiver
        .flags(&cache)
        .expect("flags")
        .contains(SymbolFlags::RECEIVER));

    // Declared with `this` but not in a static class.
    let twice = member(&cache, "Acme.Collections.Helpers", "Twice");
    assert_eq!(
        twice.as_method().expect("method").is_extension_method(&cache),
        Ok(false)
    );
    let value = &twice.parameters(&cache).expect("parameters")[0];
    assert!(!value
        .flags(&cache)
        .expect("flags")
        .contains(SymbolFlags::RECEIVER));

    let add = overload(&cache, BAG, "Add", 1);
    assert_eq!(
        add.as_method().expect("method").is_extension_method(&cache),
        Ok(false)
    );
}

#[test]
fn method_awaitability() {
    let cache = acme();
    let awaitable = |name| {
        member(&cache, "Acme.Async.Worker", name)
            .is_awaitable(&cache)
            .expect("awaitability")
    };

    // Awaiter comes from an extension.
    assert!(awaitable("Run"));
    // Derives from Task.
    assert!(awaitable("Start"));
    assert!(!awaitable("Stop"));
    assert!(awaitable("Fetch"));
    // Generic parameter constrained to Task.
    assert!(awaitable("Wait"));
    assert_eq!(cache.awaiter_extension_count(), 1);
}

#[test]
fn extension_scope_limits_awaiter_lookup() {
    let cache = acme_scoped(&["Acme.Collections.Helpers"]);
    let run = member(&cache, "Acme.Async.Worker", "Run");
    let start = member(&cache, "Acme.Async.Worker", "Start");

    assert_eq!(run.is_awaitable(&cache), Ok(false));
    assert_eq!(start.is_awaitable(&cache), Ok(true));
    assert_eq!(cache.awaiter_extension_count(), 0);

    let cache = acme_scoped(&["Acme.Collections.BagExtensions"]);
    let run = member(&cache, "Acme.Async.Worker", "Run");
    assert_eq!(run.is_awaitable(&cache), Ok(true));
}

#[test]
fn type_awaitability() {
    let cache = acme();
    let awaitable = |name| {
        ty(&cache, name)
            .is_awaitable(&cache)
            .expect("awaitability")
    };
    assert!(awaitable("Acme.Async.Job"));
    assert!(awaitable("Acme.Async.Pending"));
    assert!(!awaitable("Acme.Drawing.Point"));

    let capacity = member(&cache, BAG, "Capacity");
    assert!(matches!(
        capacity.is_awaitable(&cache),
        Err(SymbolError::UnsupportedSymbolKind { .. })
    ));
}

#[test]
fn kind_mismatch_is_unsupported() {
    let cache = acme();
    let capacity = member(&cache, BAG, "Capacity");
    assert!(matches!(
        capacity.as_method(),
        Err(SymbolError::UnsupportedSymbolKind { kind: "field", .. })
    ));
    assert!(matches!(
        capacity.parameters(&cache),
        Err(SymbolError::UnsupportedSymbolKind { .. })
    ));
}

#[test]
fn delegate_parameters_come_from_invoke() {
    let cache = acme();
    let renderer = ty(&cache, "Acme.Drawing.Renderer`1");
    let names: Vec<String> = renderer
        .parameters(&cache)
        .expect("delegate parameters")
        .iter()
        .map(|p| p.name(&cache).to_owned())
        .collect();
    assert_eq!(names, vec!["shape".to_owned(), "scale".to_owned()]);
}

#[test]
fn event_accessors() {
    let cache = acme();
    let changed = member(&cache, BAG, "Changed");
    let event = changed.as_event().expect("event");

    let handler = event.handler_type(&cache).expect("handler type");
    assert_eq!(handler.name(&cache), "EventHandler");

    let add = event.add_method(&cache).expect("add").expect("declared");
    let remove = event.remove_method(&cache).expect("remove").expect("declared");
    assert_eq!(add.name(&cache), "add_Changed");
    assert_eq!(remove.name(&cache), "remove_Changed");
    assert!(remove.flags(&cache).expect("flags").contains(SymbolFlags::SPECIAL_NAME));
    assert_eq!(remove.access(&cache), Ok(Access::Public));
}
