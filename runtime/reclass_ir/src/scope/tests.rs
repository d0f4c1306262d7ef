use super::*;

#[test]
fn fresh_ids_are_unique() {
    let a = ScopeId::fresh();
    let b = ScopeId::fresh();
    assert_ne!(a, b);
    assert_ne!(a.raw(), 0);
}

#[test]
fn linked_scopes_walk_to_root() {
    let root = Scope::root("boot");
    let app = Scope::child(&root, "app");
    let module = Scope::child(&app, "module");

    let hierarchy = LinkedScopes;
    let start = ScopeRef::new(&module);
    let parent = hierarchy.parent(&start).unwrap();
    assert_eq!(parent.id(), app.id());
    let grandparent = hierarchy.parent(&parent).unwrap();
    assert_eq!(grandparent.id(), root.id());
    assert!(hierarchy.parent(&grandparent).is_none());
}

#[test]
fn torn_down_scope_is_not_live() {
    let root = Scope::root("boot");
    let child = Scope::child(&root, "plugin");
    let weak = ScopeRef::new(&child);
    assert!(weak.is_live());

    drop(child);
    assert!(!weak.is_live());
    assert!(weak.upgrade().is_none());
    assert!(LinkedScopes.parent(&weak).is_none());
}

#[test]
fn child_keeps_parent_alive() {
    let root = Scope::root("boot");
    let parent = Scope::child(&root, "app");
    let child = Scope::child(&parent, "module");
    let parent_ref = ScopeRef::new(&parent);

    drop(parent);
    assert!(parent_ref.is_live());
    assert_eq!(child.parent().map(|p| p.label()), Some("app"));
}

#[test]
fn detached_reference_keeps_id() {
    let id = ScopeId::from_raw(9_000);
    let detached = ScopeRef::detached(id);
    assert_eq!(detached.id(), id);
    assert!(!detached.is_live());
    assert_eq!(detached, ScopeRef::detached(id));
}
