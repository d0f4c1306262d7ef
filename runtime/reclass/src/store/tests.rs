use super::*;
use pretty_assertions::assert_eq;
use reclass_ir::{FieldDescriptor, MethodSignature, Modifiers, Scope, ScopeRef, TypeDesc};

fn method(owner: &str, name: &str) -> MethodDescriptor {
    MethodDescriptor::new(name, MethodSignature::parse("()V").unwrap(), owner)
}

fn handle(scope: &Arc<Scope>, owner: &str, name: &str) -> MemberHandle {
    MemberHandle::new(scope.id(), owner, name, MethodSignature::parse("()V").unwrap())
}

fn job_shape(scope: &Arc<Scope>) -> ParsedShape {
    ParsedShape::new("com.acme.Job", ScopeRef::new(scope))
        .with_method(method("com.acme.Job", "run"))
        .with_field(FieldDescriptor::new("id", TypeDesc::INT, "com.acme.Job"))
}

#[test]
fn observed_type_is_parsed_only() {
    let store = MetadataStore::new();
    let scope = Scope::root("app");
    let observed = store.observe(job_shape(&scope));

    assert_eq!(observed.revision(), 0);
    assert!(!observed.is_structurally_modified());
    let current = store.snapshot(scope.id(), "com.acme.Job").unwrap();
    assert!(Arc::ptr_eq(&current, &observed));
    assert!(store.registry().get(scope.id(), "com.acme.Job").is_none());
    assert!(store.resolve_handle(&handle(&scope, "com.acme.Job", "run")).is_none());
}

#[test]
fn redefine_publishes_merged_snapshot() {
    let store = MetadataStore::new();
    let scope = Scope::root("app");
    store.observe(job_shape(&scope));

    let diff = StructuralDiff::new().add_method(method("com.acme.Job", "stop"));
    let next = store.redefine(scope.id(), "com.acme.Job", &diff).unwrap();

    assert_eq!(next.revision(), 1);
    assert!(next.is_structurally_modified());
    assert!(next.lookup("run", "()V").is_some());
    assert!(next.lookup("stop", "()V").is_some());
    assert!(next.get_field_descriptor("id").is_some());
    let current = store.snapshot(scope.id(), "com.acme.Job").unwrap();
    assert!(Arc::ptr_eq(&current, &next));
}

#[test]
fn redefine_unknown_type_fails() {
    let store = MetadataStore::new();
    let scope = Scope::root("app");
    let err = store
        .redefine(scope.id(), "com.acme.Missing", &StructuralDiff::new())
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::UnknownType {
            scope: scope.id(),
            name: "com.acme.Missing".to_owned(),
        }
    );
}

#[test]
fn redefine_shape_computes_the_diff() {
    let store = MetadataStore::new();
    let scope = Scope::root("app");
    store.observe(job_shape(&scope));

    let reshaped = ParsedShape::new("com.acme.Job", ScopeRef::new(&scope))
        .with_method(method("com.acme.Job", "stop"))
        .with_field(FieldDescriptor::new("id", TypeDesc::INT, "com.acme.Job"));
    let next = store.redefine_shape(&reshaped).unwrap();

    assert!(next.lookup("stop", "()V").is_some());
    // Removed members are retained for callers holding old references.
    assert!(next.lookup("run", "()V").is_some());
    assert_eq!(next.field_count(), 1);
}

#[test]
fn redefine_shape_of_unobserved_type_fails() {
    let store = MetadataStore::new();
    let scope = Scope::root("app");
    assert!(matches!(
        store.redefine_shape(&job_shape(&scope)),
        Err(StoreError::UnknownType { .. })
    ));
}

#[test]
fn redefinition_evicts_cached_absence() {
    let store = MetadataStore::new();
    let scope = Scope::root("app");
    store.observe(job_shape(&scope));
    store
        .redefine(scope.id(), "com.acme.Job", &StructuralDiff::new())
        .unwrap();

    let stop = handle(&scope, "com.acme.Job", "stop");
    assert!(store.resolve_handle(&stop).is_none());

    let diff = StructuralDiff::new().add_method(method("com.acme.Job", "stop"));
    store.redefine(scope.id(), "com.acme.Job", &diff).unwrap();
    assert_eq!(store.resolve_handle(&stop).unwrap().name(), "stop");
}

#[test]
fn cached_absence_is_final_without_eviction() {
    let store = MetadataStore::with_config(StoreConfig::default().with_evict_on_redefine(false));
    let scope = Scope::root("app");
    store.observe(job_shape(&scope));
    store
        .redefine(scope.id(), "com.acme.Job", &StructuralDiff::new())
        .unwrap();

    let stop = handle(&scope, "com.acme.Job", "stop");
    assert!(store.resolve_handle(&stop).is_none());
    let diff = StructuralDiff::new().add_method(method("com.acme.Job", "stop"));
    store.redefine(scope.id(), "com.acme.Job", &diff).unwrap();
    assert!(store.resolve_handle(&stop).is_none());
}

#[test]
fn replace_member_updates_published_snapshot() {
    let store = MetadataStore::new();
    let scope = Scope::root("app");
    store.observe(job_shape(&scope));
    let published = store
        .redefine(scope.id(), "com.acme.Job", &StructuralDiff::new())
        .unwrap();
    let run = handle(&scope, "com.acme.Job", "run");
    assert!(store.resolve_handle(&run).unwrap().modifiers().is_empty());

    let replacement = method("com.acme.Job", "run").with_modifiers(Modifiers::SYNCHRONIZED);
    let next = store
        .replace_member(scope.id(), "com.acme.Job", replacement)
        .unwrap();

    assert_eq!(next.revision(), published.revision());
    assert!(published.lookup("run", "()V").unwrap().modifiers().is_empty());
    assert_eq!(
        store.resolve_handle(&run).unwrap().modifiers(),
        Modifiers::SYNCHRONIZED
    );
}

#[test]
fn replace_member_on_parsed_type_is_absent() {
    let store = MetadataStore::new();
    let scope = Scope::root("app");
    store.observe(job_shape(&scope));
    assert!(store
        .replace_member(scope.id(), "com.acme.Job", method("com.acme.Job", "run"))
        .is_none());
}

#[test]
fn superclass_resolves_through_store() {
    let store = MetadataStore::new();
    let boot = Scope::root("boot");
    let app = Scope::child(&boot, "app");

    store.observe(ParsedShape::new("com.acme.Base", ScopeRef::new(&boot)));
    let base = store
        .redefine(boot.id(), "com.acme.Base", &StructuralDiff::new())
        .unwrap();
    let job = store.observe(job_shape(&app).with_superclass("com.acme.Base"));

    let found = store.resolve_superclass(&job).unwrap();
    assert!(Arc::ptr_eq(&found, &base));
    assert_eq!(store.resolver().superclass_chain(&job).len(), 1);
}

#[test]
fn purge_drops_torn_down_scope() {
    let store = MetadataStore::new();
    let boot = Scope::root("boot");
    let plugin = Scope::child(&boot, "plugin");
    store.observe(job_shape(&plugin));
    store
        .redefine(plugin.id(), "com.acme.Job", &StructuralDiff::new())
        .unwrap();
    assert!(store
        .resolve_handle(&handle(&plugin, "com.acme.Job", "run"))
        .is_some());

    let plugin_id = plugin.id();
    drop(plugin);
    assert_eq!(store.purge_unreachable_scopes(), 2);
    assert!(store.snapshot(plugin_id, "com.acme.Job").is_none());
    assert!(store.handle_cache().is_empty());
}

#[test]
fn config_capacity_reaches_the_cache() {
    let store = MetadataStore::with_config(StoreConfig::default().with_handle_cache_capacity(8));
    assert_eq!(store.handle_cache().capacity(), 8);
    assert_eq!(store.config().handle_cache_capacity, 8);
}
