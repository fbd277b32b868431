//! Core-library bootstrap.
//!
//! Every universe starts with the slice of `System.Private.CoreLib` that the
//! descriptor rules and renderers depend on: the root types, the primitive
//! value types (rendered as keywords), the asynchronous result types
//! (awaitability), the delegate and event plumbing, and the compiler marker
//! attributes that encode language features in metadata.

use crate::flags::{
    GenericParamAttributes, MethodAttributes, ParamAttributes, TypeAttributes, TypeVisibility,
};
use crate::{MemberAccess, MetadataError, MethodHandle, Name, TypeHandle, UniverseBuilder};

/// Handles of well-known core-library types.
#[derive(Clone, Debug)]
pub struct CoreTypes {
    // Roots
    pub object: TypeHandle,
    pub value_type: TypeHandle,
    pub enum_: TypeHandle,
    pub delegate: TypeHandle,
    pub multicast_delegate: TypeHandle,
    pub void: TypeHandle,

    // Primitives
    pub boolean: TypeHandle,
    pub char: TypeHandle,
    pub sbyte: TypeHandle,
    pub byte: TypeHandle,
    pub int16: TypeHandle,
    pub uint16: TypeHandle,
    pub int32: TypeHandle,
    pub uint32: TypeHandle,
    pub int64: TypeHandle,
    pub uint64: TypeHandle,
    pub intptr: TypeHandle,
    pub uintptr: TypeHandle,
    pub single: TypeHandle,
    pub double: TypeHandle,
    pub decimal: TypeHandle,
    pub string: TypeHandle,

    // Generic value wrappers
    pub nullable: TypeHandle,
    /// `ValueTuple`2` through `ValueTuple`7`.
    pub value_tuples: Vec<TypeHandle>,

    // Asynchronous results
    pub task: TypeHandle,
    pub task_of_t: TypeHandle,
    pub value_task: TypeHandle,
    pub value_task_of_t: TypeHandle,

    // Events
    pub event_args: TypeHandle,
    pub event_handler: TypeHandle,
    pub event_handler_of_t: TypeHandle,

    // Attributes shown in signatures
    pub attribute: TypeHandle,
    pub obsolete_attribute: TypeHandle,
    pub flags_attribute: TypeHandle,

    // Compiler markers, never shown in signatures
    pub extension_attribute: TypeHandle,
    pub is_read_only_attribute: TypeHandle,
    pub is_by_ref_like_attribute: TypeHandle,
    pub async_state_machine_attribute: TypeHandle,
    pub param_array_attribute: TypeHandle,
    pub is_external_init: TypeHandle,
    pub compiler_generated_attribute: TypeHandle,
    pub default_member_attribute: TypeHandle,
}

impl CoreTypes {
    /// C# keyword for a built-in type, if `ty` is one.
    pub fn keyword(&self, ty: TypeHandle) -> Option<&'static str> {
        let table = [
            (self.object, "object"),
            (self.void, "void"),
            (self.boolean, "bool"),
            (self.char, "char"),
            (self.sbyte, "sbyte"),
            (self.byte, "byte"),
            (self.int16, "short"),
            (self.uint16, "ushort"),
            (self.int32, "int"),
            (self.uint32, "uint"),
            (self.int64, "long"),
            (self.uint64, "ulong"),
            (self.intptr, "nint"),
            (self.uintptr, "nuint"),
            (self.single, "float"),
            (self.double, "double"),
            (self.decimal, "decimal"),
            (self.string, "string"),
        ];
        table
            .into_iter()
            .find_map(|(handle, keyword)| (handle == ty).then_some(keyword))
    }

    /// Whether `ty` is a compiler marker attribute that signatures express
    /// as syntax (or not at all) rather than as an attribute list entry.
    pub fn is_compiler_marker(&self, ty: TypeHandle) -> bool {
        [
            self.extension_attribute,
            self.is_read_only_attribute,
            self.is_by_ref_like_attribute,
            self.async_state_machine_attribute,
            self.param_array_attribute,
            self.compiler_generated_attribute,
            self.default_member_attribute,
        ]
        .contains(&ty)
    }

    /// Whether `definition` is one of the `ValueTuple` arities.
    pub fn is_value_tuple(&self, definition: TypeHandle) -> bool {
        self.value_tuples.contains(&definition)
    }
}

const PUBLIC: TypeAttributes = TypeAttributes::empty().with_visibility(TypeVisibility::Public);
const PUBLIC_SEALED: TypeAttributes = PUBLIC.union(TypeAttributes::SEALED);
const PUBLIC_ABSTRACT: TypeAttributes = PUBLIC.union(TypeAttributes::ABSTRACT);

/// Define the core library into an empty builder.
pub(crate) fn bootstrap(builder: &mut UniverseBuilder) -> CoreTypes {
    let mut cx = Bootstrap { builder };

    let object = cx.class("System", "Object", PUBLIC, None);
    let value_type = cx.class("System", "ValueType", PUBLIC_ABSTRACT, Some(object));
    let enum_ = cx.class("System", "Enum", PUBLIC_ABSTRACT, Some(value_type));
    let delegate = cx.class("System", "Delegate", PUBLIC_ABSTRACT, Some(object));
    let multicast_delegate =
        cx.class("System", "MulticastDelegate", PUBLIC_ABSTRACT, Some(delegate));

    let primitive = |cx: &mut Bootstrap<'_>, name: &str| {
        cx.class("System", name, PUBLIC_SEALED, Some(value_type))
    };
    let void = primitive(&mut cx, "Void");
    let boolean = primitive(&mut cx, "Boolean");
    let char = primitive(&mut cx, "Char");
    let sbyte = primitive(&mut cx, "SByte");
    let byte = primitive(&mut cx, "Byte");
    let int16 = primitive(&mut cx, "Int16");
    let uint16 = primitive(&mut cx, "UInt16");
    let int32 = primitive(&mut cx, "Int32");
    let uint32 = primitive(&mut cx, "UInt32");
    let int64 = primitive(&mut cx, "Int64");
    let uint64 = primitive(&mut cx, "UInt64");
    let intptr = primitive(&mut cx, "IntPtr");
    let uintptr = primitive(&mut cx, "UIntPtr");
    let single = primitive(&mut cx, "Single");
    let double = primitive(&mut cx, "Double");
    let decimal = primitive(&mut cx, "Decimal");
    let string = cx.class("System", "String", PUBLIC_SEALED, Some(object));

    let nullable = cx.class("System", "Nullable`1", PUBLIC_SEALED, Some(value_type));
    cx.generic_param(
        nullable,
        "T",
        GenericParamAttributes::NOT_NULLABLE_VALUE_TYPE_CONSTRAINT
            | GenericParamAttributes::DEFAULT_CONSTRUCTOR_CONSTRAINT,
    );

    let mut value_tuples = Vec::with_capacity(6);
    for arity in 2..=7 {
        let tuple = cx.class(
            "System",
            &format!("ValueTuple`{arity}"),
            PUBLIC,
            Some(value_type),
        );
        for position in 1..=arity {
            cx.generic_param(tuple, &format!("T{position}"), GenericParamAttributes::empty());
        }
        value_tuples.push(tuple);
    }

    let tasks = "System.Threading.Tasks";
    let task = cx.class(tasks, "Task", PUBLIC, Some(object));
    let task_of_t = cx.class(tasks, "Task`1", PUBLIC, Some(task));
    cx.generic_param(task_of_t, "TResult", GenericParamAttributes::empty());
    let value_task = cx.class(tasks, "ValueTask", PUBLIC, Some(value_type));
    let value_task_of_t = cx.class(tasks, "ValueTask`1", PUBLIC, Some(value_type));
    cx.generic_param(value_task_of_t, "TResult", GenericParamAttributes::empty());

    let event_args = cx.class("System", "EventArgs", PUBLIC, Some(object));
    let event_handler = cx.class("System", "EventHandler", PUBLIC_SEALED, Some(multicast_delegate));
    cx.invoke(event_handler, void, &[("sender", object), ("e", event_args)]);
    let event_handler_of_t = cx.class(
        "System",
        "EventHandler`1",
        PUBLIC_SEALED,
        Some(multicast_delegate),
    );
    let event_args_param =
        cx.generic_param(event_handler_of_t, "TEventArgs", GenericParamAttributes::CONTRAVARIANT);
    cx.invoke(
        event_handler_of_t,
        void,
        &[("sender", object), ("e", event_args_param)],
    );

    let attribute = cx.class("System", "Attribute", PUBLIC_ABSTRACT, Some(object));
    let obsolete_attribute = cx.class("System", "ObsoleteAttribute", PUBLIC_SEALED, Some(attribute));
    let flags_attribute = cx.class("System", "FlagsAttribute", PUBLIC, Some(attribute));
    let param_array_attribute =
        cx.class("System", "ParamArrayAttribute", PUBLIC_SEALED, Some(attribute));

    let services = "System.Runtime.CompilerServices";
    let marker = |cx: &mut Bootstrap<'_>, name: &str| {
        cx.class(services, name, PUBLIC_SEALED, Some(attribute))
    };
    let extension_attribute = marker(&mut cx, "ExtensionAttribute");
    let is_read_only_attribute = marker(&mut cx, "IsReadOnlyAttribute");
    let is_by_ref_like_attribute = marker(&mut cx, "IsByRefLikeAttribute");
    let async_state_machine_attribute = marker(&mut cx, "AsyncStateMachineAttribute");
    let compiler_generated_attribute = marker(&mut cx, "CompilerGeneratedAttribute");
    let is_external_init = cx.class(
        services,
        "IsExternalInit",
        PUBLIC_ABSTRACT.union(TypeAttributes::SEALED),
        Some(object),
    );
    let default_member_attribute = cx.class(
        "System.Reflection",
        "DefaultMemberAttribute",
        PUBLIC_SEALED,
        Some(attribute),
    );

    CoreTypes {
        object,
        value_type,
        enum_,
        delegate,
        multicast_delegate,
        void,
        boolean,
        char,
        sbyte,
        byte,
        int16,
        uint16,
        int32,
        uint32,
        int64,
        uint64,
        intptr,
        uintptr,
        single,
        double,
        decimal,
        string,
        nullable,
        value_tuples,
        task,
        task_of_t,
        value_task,
        value_task_of_t,
        event_args,
        event_handler,
        event_handler_of_t,
        attribute,
        obsolete_attribute,
        flags_attribute,
        extension_attribute,
        is_read_only_attribute,
        is_by_ref_like_attribute,
        async_state_machine_attribute,
        param_array_attribute,
        is_external_init,
        compiler_generated_attribute,
        default_member_attribute,
    }
}

/// Infallible wrappers over the builder, valid only while the tables hold
/// nothing but the core library.
struct Bootstrap<'b> {
    builder: &'b mut UniverseBuilder,
}

impl Bootstrap<'_> {
    fn class(
        &mut self,
        namespace: &str,
        name: &str,
        attributes: TypeAttributes,
        base: Option<TypeHandle>,
    ) -> TypeHandle {
        let full_name = format!("{namespace}.{name}");
        let namespace: Name = self.builder.intern(namespace);
        let name: Name = self.builder.intern(name);
        self.builder
            .insert_definition(full_name, namespace, name, attributes, None, base)
    }

    fn generic_param(
        &mut self,
        owner: TypeHandle,
        name: &str,
        attributes: GenericParamAttributes,
    ) -> TypeHandle {
        match self.builder.add_type_generic_param(owner, name, attributes) {
            Ok(param) => param,
            Err(err) => panic!("core library bootstrap: {err}"),
        }
    }

    fn invoke(
        &mut self,
        delegate: TypeHandle,
        return_type: TypeHandle,
        params: &[(&str, TypeHandle)],
    ) -> MethodHandle {
        let attributes = MethodAttributes::VIRTUAL
            | MethodAttributes::NEW_SLOT
            | MethodAttributes::HIDE_BY_SIG
            | MethodAttributes::empty().with_access(MemberAccess::Public);
        let define = |builder: &mut UniverseBuilder| {
            let method = builder.define_method(delegate, "Invoke", attributes, return_type)?;
            for &(name, ty) in params {
                builder.add_param(method, name, ty, ParamAttributes::empty())?;
            }
            Ok::<_, MetadataError>(method)
        };
        match define(&mut *self.builder) {
            Ok(method) => method,
            Err(err) => panic!("core library bootstrap: {err}"),
        }
    }
}
