use super::*;
use pretty_assertions::assert_eq;
use reclass_ir::{MethodSignature, Scope, TypeDesc};

const OWNER: &str = "com.acme.Cart";

fn method(name: &str, descriptor: &str) -> MethodDescriptor {
    MethodDescriptor::new(name, MethodSignature::parse(descriptor).unwrap(), OWNER)
}

fn names(methods: &[Arc<MethodDescriptor>]) -> Vec<String> {
    let mut out: Vec<String> = methods.iter().map(ToString::to_string).collect();
    out.sort();
    out
}

#[test]
fn shape_builder_collects_members() {
    let scope = Scope::root("app");
    let shape = ParsedShape::new(OWNER, ScopeRef::new(&scope))
        .with_superclass("java.lang.Object")
        .with_method(method("total", "()J"))
        .with_field(FieldDescriptor::new("items", TypeDesc::INT, OWNER));

    assert_eq!(shape.internal_name(), "com/acme/Cart");
    assert_eq!(shape.superclass.as_deref(), Some("java.lang.Object"));
    assert_eq!(shape.methods.len(), 1);
    assert_eq!(shape.fields.len(), 1);
}

#[test]
fn empty_diff() {
    assert!(StructuralDiff::new().is_empty());
    assert!(!StructuralDiff::new().add_method(method("x", "()V")).is_empty());
}

#[test]
fn between_reports_added_and_removed_members() {
    let scope = Scope::root("app");
    let base = TypeSnapshot::build_from_parse(
        ParsedShape::new(OWNER, ScopeRef::new(&scope))
            .with_method(method("total", "()J"))
            .with_method(method("clear", "()V"))
            .with_field(FieldDescriptor::new("items", TypeDesc::INT, OWNER)),
    );

    let reparsed = ParsedShape::new(OWNER, ScopeRef::new(&scope))
        .with_method(method("total", "()J"))
        .with_method(method("add", "(Ljava/lang/Object;)Z"))
        .with_field(FieldDescriptor::new("items", TypeDesc::INT, OWNER))
        .with_field(FieldDescriptor::new("owner", TypeDesc::class("java.lang.String"), OWNER));

    let diff = StructuralDiff::between(&base, &reparsed);
    assert_eq!(
        names(diff.added_methods()),
        vec!["com.acme.Cart.add(Ljava/lang/Object;)Z"]
    );
    assert_eq!(names(diff.removed_methods()), vec!["com.acme.Cart.clear()V"]);
    assert_eq!(diff.added_fields().len(), 1);
    assert_eq!(diff.added_fields()[0].name(), "owner");
    assert!(diff.removed_fields().is_empty());
}

#[test]
fn between_treats_retyped_field_as_remove_plus_add() {
    let scope = Scope::root("app");
    let base = TypeSnapshot::build_from_parse(
        ParsedShape::new(OWNER, ScopeRef::new(&scope))
            .with_field(FieldDescriptor::new("items", TypeDesc::INT, OWNER)),
    );
    let reparsed = ParsedShape::new(OWNER, ScopeRef::new(&scope)).with_field(FieldDescriptor::new(
        "items",
        TypeDesc::class("java.util.List"),
        OWNER,
    ));

    let diff = StructuralDiff::between(&base, &reparsed);
    assert_eq!(diff.added_fields().len(), 1);
    assert_eq!(diff.removed_fields().len(), 1);

    let next = TypeSnapshot::build_from_diff(&base, &diff);
    assert_eq!(
        next.get_field_descriptor("items").map(|f| f.field_type().clone()),
        Some(TypeDesc::class("java.util.List"))
    );
}

#[test]
fn identical_reparse_is_empty_diff() {
    let scope = Scope::root("app");
    let shape = ParsedShape::new(OWNER, ScopeRef::new(&scope))
        .with_method(method("total", "()J"))
        .with_field(FieldDescriptor::new("items", TypeDesc::INT, OWNER));
    let base = TypeSnapshot::build_from_parse(shape.clone());
    assert!(StructuralDiff::between(&base, &shape).is_empty());
}
