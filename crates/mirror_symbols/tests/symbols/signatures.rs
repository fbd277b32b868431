//! Declaration rendering per symbol kind.

use mirror_symbols::SignatureOptions;
use pretty_assertions::assert_eq;

use crate::common::{acme, member, overload, sig, sig_with, ty, COMPACT, QUALIFIED};

const BAG: &str = "Acme.Collections.Bag`1";

fn member_sig(type_name: &str, name: &str) -> String {
    let cache = acme();
    let symbol = member(&cache, type_name, name);
    sig(&cache, &symbol)
}

// === Types ===

#[test]
fn class_with_attribute() {
    let cache = acme();
    let bag = ty(&cache, BAG);
    assert_eq!(
        sig(&cache, &bag),
        "[Obsolete(\"use Crate\")]\npublic class Bag<T>"
    );
    assert_eq!(sig_with(&cache, &bag, COMPACT), "public class Bag<T>");
    assert_eq!(
        sig_with(&cache, &bag, QUALIFIED),
        "[System.Obsolete(\"use Crate\")]\npublic class Acme.Collections.Bag<T>"
    );
}

#[test]
fn interface_with_variance_and_constraints() {
    let cache = acme();
    let mapper = ty(&cache, "Acme.Collections.IMapper`2");
    assert_eq!(
        sig(&cache, &mapper),
        "public interface IMapper<T1, out T2> where T2 : class, new()"
    );
}

#[test]
fn class_modifiers_and_bases() {
    let cache = acme();
    assert_eq!(
        sig(&cache, &ty(&cache, "Acme.Drawing.Circle")),
        "public sealed class Circle : Shape, IMapper<double, Shape>"
    );
    assert_eq!(
        sig_with(&cache, &ty(&cache, "Acme.Drawing.Circle"), QUALIFIED),
        "public sealed class Acme.Drawing.Circle : Acme.Drawing.Shape, \
         Acme.Collections.IMapper<double, Acme.Drawing.Shape>"
    );
    assert_eq!(
        sig(&cache, &ty(&cache, "Acme.Drawing.Shape")),
        "public abstract class Shape"
    );
    assert_eq!(
        sig(&cache, &ty(&cache, "Acme.Collections.BagExtensions")),
        "public static class BagExtensions"
    );
}

#[test]
fn struct_and_enum() {
    let cache = acme();
    assert_eq!(
        sig(&cache, &ty(&cache, "Acme.Drawing.Point")),
        "public readonly struct Point"
    );
    assert_eq!(
        sig(&cache, &ty(&cache, "Acme.Drawing.Color")),
        "public enum Color : byte"
    );
    assert_eq!(member_sig("Acme.Drawing.Color", "Red"), "Red = 1");
}

#[test]
fn delegate_declaration() {
    let cache = acme();
    assert_eq!(
        sig(&cache, &ty(&cache, "Acme.Drawing.Renderer`1")),
        "public delegate bool Renderer<in TShape>(TShape shape, double scale = 1.5) \
         where TShape : Shape;"
    );
}

#[test]
fn nested_type_qualifies_through_its_outer_type() {
    let cache = acme();
    let node = member(&cache, BAG, "Node");
    assert_eq!(sig(&cache, &node), "public class Node");
    assert_eq!(
        sig_with(&cache, &node, QUALIFIED),
        "public class Acme.Collections.Bag<T>.Node"
    );
}

#[test]
fn instance_renders_its_definition() {
    let cache = acme();
    let circle = ty(&cache, "Acme.Drawing.Circle");
    let mapper = &circle
        .as_type()
        .expect("type")
        .interfaces(&cache)
        .expect("interfaces")[0];
    assert_eq!(
        sig(&cache, mapper),
        "public interface IMapper<T1, out T2> where T2 : class, new()"
    );
}

// === Fields ===

#[test]
fn fields() {
    assert_eq!(
        member_sig(BAG, "Capacity"),
        "public static readonly int Capacity;"
    );
    assert_eq!(member_sig(BAG, "Max"), "public const int Max = 10;");
    assert_eq!(member_sig(BAG, "items"), "private readonly T[] items;");
    assert_eq!(
        member_sig("Acme.Drawing.Point", "X"),
        "public readonly int X;"
    );
}

// === Constructors ===

#[test]
fn constructors() {
    assert_eq!(member_sig(BAG, ".ctor"), "public Bag(int capacity = 16);");
    assert_eq!(member_sig(BAG, ".cctor"), "static Bag();");
}

// === Properties and events ===

#[test]
fn indexer() {
    assert_eq!(
        member_sig(BAG, "Item"),
        "public T this[int index] { get; set; }"
    );
}

#[test]
fn accessor_with_narrower_access() {
    assert_eq!(
        member_sig(BAG, "Count"),
        "public int Count { get; private set; }"
    );
}

#[test]
fn init_only_setter() {
    assert_eq!(
        member_sig(BAG, "Label"),
        "public string Label { get; init; }"
    );
}

#[test]
fn inherited_properties() {
    assert_eq!(
        member_sig("Acme.Drawing.Shape", "Area"),
        "public abstract double Area { get; }"
    );
    assert_eq!(
        member_sig("Acme.Drawing.Circle", "Area"),
        "public override double Area { get; }"
    );
    assert_eq!(
        member_sig("Acme.Collections.IMapper`2", "Count"),
        "public int Count { get; }"
    );
}

#[test]
fn event() {
    assert_eq!(
        member_sig(BAG, "Changed"),
        "public event EventHandler Changed;"
    );
}

// === Methods ===

#[test]
fn overloads() {
    let cache = acme();
    let one = overload(&cache, BAG, "Add", 1);
    let two = overload(&cache, BAG, "Add", 2);
    assert_eq!(sig(&cache, &one), "public void Add(T item);");
    assert_eq!(sig(&cache, &two), "public void Add(T item, int copies);");
}

#[test]
fn inheritance_modifiers() {
    assert_eq!(
        member_sig(BAG, "TryTake"),
        "public virtual bool TryTake(out T item);"
    );
    assert_eq!(
        member_sig("Acme.Drawing.Shape", "Draw"),
        "protected abstract void Draw();"
    );
    assert_eq!(
        member_sig("Acme.Drawing.Circle", "Draw"),
        "protected sealed override void Draw();"
    );
    assert_eq!(
        member_sig("Acme.Collections.IMapper`2", "Map"),
        "public T2 Map(T1 source);"
    );
}

#[test]
fn generic_method_with_struct_constraint() {
    assert_eq!(
        member_sig(BAG, "Convert"),
        "public TResult? Convert<TResult>(params T[] values) where TResult : struct;"
    );
    assert_eq!(
        member_sig("Acme.Async.Worker", "Wait"),
        "public TJob Wait<TJob>() where TJob : Task;"
    );
}

#[test]
fn async_methods() {
    assert_eq!(
        member_sig(BAG, "FlushAsync"),
        "public async Task FlushAsync();"
    );
    assert_eq!(
        member_sig("Acme.Async.Worker", "Fetch"),
        "public async ValueTask<int> Fetch();"
    );
}

#[test]
fn operators() {
    assert_eq!(
        member_sig(BAG, "op_Addition"),
        "public static Bag<T> operator +(Bag<T> left, Bag<T> right);"
    );
    assert_eq!(
        member_sig(BAG, "op_Implicit"),
        "public static implicit operator T[](Bag<T> bag);"
    );
}

#[test]
fn extension_methods() {
    assert_eq!(
        member_sig("Acme.Collections.BagExtensions", "CountAll"),
        "public static int CountAll<T>(this Bag<T> bag);"
    );
    // `this` only renders for a valid extension method.
    assert_eq!(
        member_sig("Acme.Collections.Helpers", "Twice"),
        "public static int Twice(int value);"
    );
}

#[test]
fn parameter_modifiers_and_enum_defaults() {
    let cache = acme();
    let paint = member(&cache, "Acme.Drawing.Shape", "Paint");
    assert_eq!(
        sig(&cache, &paint),
        "public void Paint(Color color = Color.Green, in Point at);"
    );
    assert_eq!(
        sig_with(&cache, &paint, QUALIFIED),
        "public void Paint(Acme.Drawing.Color color = Acme.Drawing.Color.Green, \
         in Acme.Drawing.Point at);"
    );

    let at = &paint.parameters(&cache).expect("parameters")[1];
    assert_eq!(sig(&cache, at), "in Point at");
}

#[test]
fn options_are_memoized_separately() {
    let cache = acme();
    let bag = ty(&cache, BAG);
    let full = mirror_symbols::signature(&cache, &bag, SignatureOptions::default())
        .expect("signature");
    let compact = mirror_symbols::signature(&cache, &bag, COMPACT).expect("signature");
    assert!(full.starts_with("[Obsolete"));
    assert!(!compact.starts_with('['));
}
