//! Display names and qualification.

use mirror_symbols::DisplayOptions;
use pretty_assertions::assert_eq;

use crate::common::{acme, member, name, name_with, ty};

const BAG: &str = "Acme.Collections.Bag`1";

const QUALIFIED: DisplayOptions = DisplayOptions {
    fully_qualified: true,
    include_generic_arguments: true,
};

const BARE: DisplayOptions = DisplayOptions {
    fully_qualified: false,
    include_generic_arguments: false,
};

#[test]
fn generic_definition_names() {
    let cache = acme();
    let bag = ty(&cache, BAG);
    assert_eq!(name(&cache, &bag), "Bag<T>");
    assert_eq!(name_with(&cache, &bag, QUALIFIED), "Acme.Collections.Bag<T>");
    assert_eq!(name_with(&cache, &bag, BARE), "Bag");
}

#[test]
fn instance_names() {
    let cache = acme();
    let circle = ty(&cache, "Acme.Drawing.Circle");
    let mapper = &circle
        .as_type()
        .expect("type")
        .interfaces(&cache)
        .expect("interfaces")[0];
    assert_eq!(name(&cache, mapper), "IMapper<double, Shape>");
    assert_eq!(
        name_with(&cache, mapper, QUALIFIED),
        "Acme.Collections.IMapper<double, Acme.Drawing.Shape>"
    );
    assert_eq!(name_with(&cache, mapper, BARE), "IMapper");
}

#[test]
fn nested_type_names() {
    let cache = acme();
    let node = member(&cache, BAG, "Node");
    assert_eq!(name(&cache, &node), "Node");
    assert_eq!(
        name_with(&cache, &node, QUALIFIED),
        "Acme.Collections.Bag<T>.Node"
    );
}

#[test]
fn constructed_type_names() {
    let cache = acme();
    let field_type = |field| {
        let field = member(&cache, BAG, field);
        let ty = field
            .as_field()
            .expect("field")
            .field_type(&cache)
            .expect("field type");
        name(&cache, &ty)
    };
    assert_eq!(field_type("items"), "T[]");
    assert_eq!(field_type("Capacity"), "int");

    let convert = member(&cache, BAG, "Convert");
    let returns = convert
        .as_method()
        .expect("method")
        .return_type(&cache)
        .expect("return type");
    assert_eq!(name(&cache, &returns), "TResult?");

    let try_take = member(&cache, BAG, "TryTake");
    let item = &try_take.parameters(&cache).expect("parameters")[0];
    let item_type = item
        .as_parameter()
        .expect("parameter")
        .parameter_type(&cache)
        .expect("parameter type");
    assert_eq!(name(&cache, &item_type), "ref T");
}

#[test]
fn member_names() {
    let cache = acme();
    let show = |member_name| name(&cache, &member(&cache, BAG, member_name));
    assert_eq!(show("Capacity"), "Capacity");
    assert_eq!(show(".ctor"), "Bag");
    assert_eq!(show(".cctor"), "Bag");
    assert_eq!(show("Item"), "this[]");
    assert_eq!(show("Changed"), "Changed");
    assert_eq!(show("Convert"), "Convert<TResult>");
    assert_eq!(show("op_Addition"), "operator +");
    assert_eq!(show("op_Implicit"), "implicit operator T[]");
}

#[test]
fn qualified_member_names() {
    let cache = acme();
    let show = |member_name| name_with(&cache, &member(&cache, BAG, member_name), QUALIFIED);
    assert_eq!(show("Capacity"), "Acme.Collections.Bag<T>.Capacity");
    assert_eq!(show("Item"), "Acme.Collections.Bag<T>.this[]");
    assert_eq!(show(".ctor"), "Acme.Collections.Bag<T>.Bag");

    let convert = member(&cache, BAG, "Convert");
    assert_eq!(name_with(&cache, &convert, BARE), "Convert");
}

#[test]
fn parameter_names_are_never_qualified() {
    let cache = acme();
    let paint = member(&cache, "Acme.Drawing.Shape", "Paint");
    let at = &paint.parameters(&cache).expect("parameters")[1];
    assert_eq!(name(&cache, at), "at");
    assert_eq!(name_with(&cache, at, QUALIFIED), "at");
}

#[test]
fn display_names_are_memoized() {
    let cache = acme();
    let bag = ty(&cache, BAG);
    let first = mirror_symbols::display_name(&cache, &bag, QUALIFIED).expect("name");
    let derivations = cache.stats().derivations;
    let second = mirror_symbols::display_name(&cache, &bag, QUALIFIED).expect("name");
    assert!(std::ptr::eq(first, second));
    assert_eq!(cache.stats().derivations, derivations);
}
