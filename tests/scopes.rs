//! Scope lifecycle through the container extension: creation, reuse,
//! disposal, isolation, and scoped resolution semantics.

use std::sync::Arc;

use gantry::{
    ContainerExtension, ContainerProvider, ContainerRegistry, Reconciler, ScopeErrorKind,
};

#[derive(Default, Debug)]
struct View;

#[derive(Default)]
struct ViewModel;

#[test]
fn named_scope_is_reused_until_disposed() {
    let extension = ContainerExtension::new();

    let first = extension.create_scope_named("nav").unwrap();
    let second = extension.create_scope_named("nav").unwrap();
    assert!(Arc::ptr_eq(first.table(), second.table()));

    // Disposing releases the child table; the next creation gets a new one.
    second.dispose();
    let third = extension.create_scope_named("nav").unwrap();
    assert!(!Arc::ptr_eq(first.table(), third.table()));
}

#[test]
fn anonymous_scope_is_a_noop_when_slot_taken() {
    let extension = ContainerExtension::new();

    let first = extension.create_scope().unwrap().unwrap();
    let second = extension.create_scope().unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn current_scope_follows_creation() {
    let extension = ContainerExtension::new();
    assert!(extension.current_scope().is_none());

    let nav = extension.create_scope_named("nav").unwrap();
    let current = extension.current_scope().unwrap();
    assert!(Arc::ptr_eq(&nav, &current));
}

#[test]
fn scoped_resolution_never_auto_registers() {
    let extension = ContainerExtension::new();
    let scope = extension.create_scope_named("nav").unwrap();

    let err = scope.resolve_named::<View>("view").unwrap_err();
    assert!(matches!(err, ScopeErrorKind::NotFound { .. }));
    // The failed lookup registered nothing.
    assert!(!extension.is_registered::<View>());
}

#[test]
fn scope_resolves_components_declared_to_the_parent() {
    let extension = ContainerExtension::new();
    extension.register_instance_named(View, "view").unwrap();

    let scope = extension.create_scope_named("nav").unwrap();
    scope.resolve_named::<View>("view").unwrap();
    scope.resolve::<View>().unwrap();
}

#[test]
fn scopes_are_isolated_from_parent_and_siblings() {
    let extension = ContainerExtension::new();
    let nav = extension.create_scope_named("nav").unwrap();

    // Register directly into the scope's own table.
    let scoped_registry = Reconciler::new(nav.table().clone());
    scoped_registry.register_instance(ViewModel, Some("vm")).unwrap();
    nav.resolve_named::<ViewModel>("vm").unwrap();

    // Invisible to the parent extension...
    assert!(!extension.is_registered_named::<ViewModel>("vm"));
    assert!(extension.try_resolve::<ViewModel>(Some("vm")).is_none());

    // ...and to a sibling scope.
    let dialogs = extension.create_scope_named("dialogs").unwrap();
    assert!(matches!(
        dialogs.resolve_named::<ViewModel>("vm"),
        Err(ScopeErrorKind::NotFound { .. })
    ));
}

#[test]
fn disposed_scope_reports_translated_failures() {
    let extension = ContainerExtension::new();
    extension.register_instance_named(View, "view").unwrap();

    let scope = extension.create_scope_named("nav").unwrap();
    scope.dispose();
    assert!(scope.is_disposed());

    // The child table is gone; an unqualified resolve fails through the
    // translated error carrying the requested type.
    let err = scope.resolve::<View>().unwrap_err();
    match err {
        ScopeErrorKind::ResolutionFailed(failure) => {
            assert!(failure.type_requested.ends_with("::View"));
            assert!(failure.name_requested.is_none());
        }
        other => panic!("expected translated failure, got {other}"),
    }
}

#[test]
fn disposing_a_scope_leaves_the_parent_working() {
    let extension = ContainerExtension::new();
    extension.register_instance_named(View, "view").unwrap();

    let scope = extension.create_scope_named("nav").unwrap();
    scope.dispose();
    scope.dispose(); // second dispose is a no-op

    extension.resolve_named::<View>("view").unwrap();
    assert!(extension.is_registered_named::<View>("view"));
}
