use pretty_assertions::assert_eq;

use super::*;
use crate::flags::{MemberAccess, TypeVisibility};

fn public() -> TypeAttributes {
    TypeAttributes::empty().with_visibility(TypeVisibility::Public)
}

fn public_method() -> MethodAttributes {
    MethodAttributes::empty().with_access(MemberAccess::Public)
}

#[test]
fn new_builder_bootstraps_core_library() {
    let builder = UniverseBuilder::new();
    let core = builder.core();

    assert_eq!(builder.find_type("System.Object"), Some(core.object));
    assert_eq!(builder.find_type("System.String"), Some(core.string));
    assert_eq!(
        builder.find_type("System.Threading.Tasks.Task`1"),
        Some(core.task_of_t)
    );
    assert_eq!(
        builder.find_type("System.Runtime.CompilerServices.ExtensionAttribute"),
        Some(core.extension_attribute)
    );
    assert_eq!(core.value_tuples.len(), 6);
}

#[test]
fn duplicate_top_level_type_is_rejected() {
    let mut builder = UniverseBuilder::new();
    builder
        .define_type("Acme", "Widget", public())
        .expect("first definition succeeds");
    let err = builder
        .define_type("Acme", "Widget", public())
        .expect_err("second definition must fail");

    assert_eq!(
        err,
        MetadataError::DuplicateType {
            full_name: "Acme.Widget".to_owned()
        }
    );
}

#[test]
fn nested_type_uses_plus_separated_full_name() {
    let mut builder = UniverseBuilder::new();
    let outer = builder
        .define_type("Acme", "Outer", public())
        .expect("define outer");
    let inner = builder
        .define_nested_type(
            outer,
            "Inner",
            TypeAttributes::empty().with_visibility(TypeVisibility::NestedPublic),
        )
        .expect("define inner");

    assert_eq!(builder.find_type("Acme.Outer+Inner"), Some(inner));
    let universe = builder.finish();
    let outer_def = universe.definition(outer).expect("outer is a definition");
    assert_eq!(outer_def.nested_types, vec![inner]);
    assert_eq!(
        universe.definition(inner).and_then(|d| d.declaring_type),
        Some(outer)
    );
}

#[test]
fn constructed_types_are_deduplicated() {
    let mut builder = UniverseBuilder::new();
    let int32 = builder.core().int32;
    let task_of_t = builder.core().task_of_t;

    let a = builder.array(int32, 1).expect("valid handle");
    let b = builder.array(int32, 1).expect("valid handle");
    let matrix = builder.array(int32, 2).expect("valid handle");
    assert_eq!(a, b);
    assert_ne!(a, matrix);
    assert_eq!(builder.type_name(matrix).expect("known row"), "Int32[,]");

    let task_int = builder.instantiate(task_of_t, &[int32]).expect("arity 1");
    let again = builder.instantiate(task_of_t, &[int32]).expect("arity 1");
    assert_eq!(task_int, again);
    assert_eq!(builder.type_name(task_int).expect("known row"), "Task`1");

    let by_ref = builder.by_ref(int32).expect("valid handle");
    assert_eq!(builder.by_ref(int32).expect("valid handle"), by_ref);
    assert_eq!(builder.type_name(by_ref).expect("known row"), "Int32&");
    let pointer = builder.pointer(int32).expect("valid handle");
    assert_eq!(builder.type_name(pointer).expect("known row"), "Int32*");
}

#[test]
fn instantiate_checks_arity() {
    let mut builder = UniverseBuilder::new();
    let int32 = builder.core().int32;
    let task_of_t = builder.core().task_of_t;

    let err = builder
        .instantiate(task_of_t, &[int32, int32])
        .expect_err("Task`1 takes one argument");
    assert_eq!(
        err,
        MetadataError::ArityMismatch {
            ty: task_of_t,
            expected: 1,
            found: 2
        }
    );
}

#[test]
fn members_cannot_be_added_to_constructed_types() {
    let mut builder = UniverseBuilder::new();
    let int32 = builder.core().int32;
    let array = builder.array(int32, 1).expect("valid handle");

    let err = builder
        .define_method(array, "Frob", public_method(), int32)
        .expect_err("arrays are not definitions");
    assert_eq!(err, MetadataError::NotADefinition { ty: array });
}

#[test]
fn constraints_require_a_generic_parameter() {
    let mut builder = UniverseBuilder::new();
    let object = builder.core().object;
    let int32 = builder.core().int32;

    let err = builder
        .add_constraint(int32, object)
        .expect_err("Int32 is not a generic parameter");
    assert_eq!(err, MetadataError::NotAGenericParameter { ty: int32 });
}

#[test]
fn constructor_gets_special_name_bits() {
    let mut builder = UniverseBuilder::new();
    let ty = builder
        .define_type("Acme", "Widget", public())
        .expect("define type");
    let ctor = builder
        .define_constructor(ty, public_method(), false)
        .expect("define ctor");
    let cctor = builder
        .define_constructor(ty, MethodAttributes::empty(), true)
        .expect("define cctor");

    let universe = builder.finish();
    assert!(universe.is_constructor(ctor));
    assert!(universe.is_constructor(cctor));
    let cctor_def = universe.method(cctor).expect("cctor row");
    assert_eq!(universe.str(cctor_def.name), ".cctor");
    assert!(cctor_def.attributes.contains(MethodAttributes::STATIC));
    assert_eq!(cctor_def.return_type, universe.core().void);
}

#[test]
fn generic_method_instantiation_substitutes_signature() {
    let mut builder = UniverseBuilder::new();
    let int32 = builder.core().int32;
    let void = builder.core().void;
    let ty = builder
        .define_type("Acme", "Util", public())
        .expect("define type");
    let method = builder
        .define_method(ty, "Fill", public_method(), void)
        .expect("define method");
    let t = builder
        .add_method_generic_param(method, "T", GenericParamAttributes::empty())
        .expect("valid handle");
    let t_array = builder.array(t, 1).expect("valid handle");
    builder.add_param(method, "items", t_array, ParamAttributes::empty()).expect("valid handle");
    builder.add_param(method, "value", t, ParamAttributes::empty()).expect("valid handle");

    let closed = builder
        .instantiate_method(method, &[int32])
        .expect("one type argument");
    assert_eq!(builder.instantiate_method(method, &[int32]), Ok(closed));

    let int_array = builder.array(int32, 1).expect("valid handle");
    let row = builder.method(closed).expect("known row");
    assert_eq!(row.params[0].ty, int_array);
    assert_eq!(row.params[1].ty, int32);
    assert!(row.generic_params.is_empty());
    assert_eq!(
        row.instantiation,
        Some(MethodInstance {
            definition: method,
            args: vec![int32]
        })
    );
}

#[test]
fn non_generic_method_cannot_be_instantiated() {
    let mut builder = UniverseBuilder::new();
    let void = builder.core().void;
    let int32 = builder.core().int32;
    let ty = builder
        .define_type("Acme", "Util", public())
        .expect("define type");
    let method = builder
        .define_method(ty, "Run", public_method(), void)
        .expect("define method");

    assert_eq!(
        builder.instantiate_method(method, &[int32]),
        Err(MetadataError::MethodArityMismatch {
            method,
            expected: 0,
            found: 1
        })
    );
}

#[test]
fn parameter_default_marks_optional() {
    let mut builder = UniverseBuilder::new();
    let void = builder.core().void;
    let int32 = builder.core().int32;
    let ty = builder
        .define_type("Acme", "Util", public())
        .expect("define type");
    let method = builder
        .define_method(ty, "Run", public_method(), void)
        .expect("define method");
    let param = builder
        .add_param(method, "count", int32, ParamAttributes::empty())
        .expect("valid handle");
    builder.set_param_default(param, Constant::Int(3)).expect("valid handle");

    let universe = builder.finish();
    let def = universe.param(param).expect("param row");
    assert!(def
        .attributes
        .contains(ParamAttributes::OPTIONAL | ParamAttributes::HAS_DEFAULT));
    assert_eq!(def.default, Some(Constant::Int(3)));
}

#[test]
fn handles_from_another_builder_are_errors() {
    let mut other = UniverseBuilder::new();
    let void = other.core().void;
    let int32 = other.core().int32;
    let ty = other
        .define_type("Acme", "Elsewhere", public())
        .expect("define type");
    let method = other
        .define_method(ty, "Run", public_method(), void)
        .expect("define method");
    let param = other
        .add_param(method, "count", int32, ParamAttributes::empty())
        .expect("valid handle");
    let field = other
        .define_field(ty, "count", FieldAttributes::empty(), int32)
        .expect("define field");

    let mut builder = UniverseBuilder::new();
    let unknown_method = MetadataError::UnknownHandle {
        kind: "method",
        index: method.index(),
    };
    let unknown_type = MetadataError::UnknownHandle {
        kind: "type",
        index: ty.index(),
    };

    assert_eq!(
        builder.add_param(method, "x", int32, ParamAttributes::empty()),
        Err(unknown_method.clone())
    );
    assert_eq!(builder.set_return_type(method, int32), Err(unknown_method.clone()));
    assert_eq!(
        builder.set_param_default(param, Constant::Int(1)),
        Err(unknown_method.clone())
    );
    assert_eq!(
        builder.instantiate_method(method, &[int32]),
        Err(unknown_method)
    );
    assert_eq!(
        builder.set_field_constant(field, Constant::Int(1)),
        Err(MetadataError::UnknownHandle {
            kind: "field",
            index: field.index(),
        })
    );
    assert_eq!(builder.array(ty, 1), Err(unknown_type.clone()));
    assert_eq!(
        builder.define_method(ty, "Run", public_method(), void),
        Err(unknown_type)
    );
    assert!(builder.ty(ty).is_none());
    assert!(builder.method(method).is_none());
}
