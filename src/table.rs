use std::{any::TypeId, sync::Arc};

use crate::{
    any::{Component, TypeInfo},
    arguments::Arguments,
    errors::{RegistryErrorKind, ResolveErrorKind},
    registration::Registration,
};

/// The component table: a store indexing components by type identity and by
/// string identity independently.
///
/// The two key spaces are deliberately separate operations — the
/// reconciliation algorithm queries them independently and synthesizes
/// whichever key is missing. Presence checks and resolution fall through to
/// the parent table for child tables.
pub trait ComponentTable: Send + Sync {
    fn has_by_type(&self, type_id: TypeId) -> bool;

    fn has_by_name(&self, name: &str) -> bool;

    /// # Errors
    /// Fails when the table is disposed, the name is already taken, the name
    /// is empty, or the lifestyle has no store instruction.
    fn register(&self, registration: Registration) -> Result<(), RegistryErrorKind>;

    /// Resolves the default entry for a service type.
    ///
    /// # Errors
    /// Fails when no entry exists in this table or any parent, or when the
    /// entry cannot produce an instance.
    fn resolve_by_type(&self, service: TypeInfo, arguments: &Arguments) -> Result<Component, ResolveErrorKind>;

    /// Resolves the entry registered under `name`; `service` is carried for
    /// diagnostics.
    ///
    /// # Errors
    /// Fails when the name is empty, unknown to this table and its parents,
    /// or the entry cannot produce an instance.
    fn resolve_by_name_and_type(&self, name: &str, service: TypeInfo, arguments: &Arguments)
        -> Result<Component, ResolveErrorKind>;

    /// Resolves every entry registered for a service type, this table first,
    /// then parents. An empty result is not an error.
    ///
    /// # Errors
    /// Fails when the table is disposed or an entry cannot produce an
    /// instance.
    fn resolve_all_by_type(&self, service: TypeInfo, arguments: &Arguments) -> Result<Vec<Component>, ResolveErrorKind>;

    /// Creates a child table with its own lifetime; the child sees this
    /// table's registrations, not the other way around.
    ///
    /// # Errors
    /// Fails when the table is disposed, the name is empty, or a live child
    /// with that name already exists.
    fn create_child(self: Arc<Self>, name: &str) -> Result<Arc<dyn ComponentTable>, RegistryErrorKind>;

    /// Returns the live child registered under `name`; disposed children are
    /// pruned and reported as absent.
    fn get_child(&self, name: &str) -> Option<Arc<dyn ComponentTable>>;

    /// Releases everything the table owns, cascading into its children.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

/// Resolution context handed to factories: the table performing the
/// resolution plus the caller's override values.
pub struct Resolver<'a> {
    pub(crate) table: &'a dyn ComponentTable,
    pub(crate) arguments: &'a Arguments,
}

impl Resolver<'_> {
    /// Resolves a constructor dependency, preferring an override supplied by
    /// the caller over the table.
    ///
    /// # Errors
    /// Fails when the dependency is neither overridden nor resolvable from
    /// the table.
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        let info = TypeInfo::of::<T>();
        if let Some(component) = self.arguments.get(&info.id) {
            return downcast::<T>(component);
        }
        self.table.resolve_by_type(info, self.arguments).and_then(downcast::<T>)
    }

    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &Arguments {
        self.arguments
    }
}

/// Recovers a typed handle from an erased component.
pub(crate) fn downcast<T: Send + Sync + 'static>(component: Component) -> Result<Arc<T>, ResolveErrorKind> {
    let actual = component.as_ref().type_id();
    component.downcast::<T>().map_err(|_| ResolveErrorKind::IncorrectType {
        expected: TypeInfo::of::<T>(),
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::downcast;
    use crate::any::Component;
    use std::sync::Arc;

    #[test]
    fn test_downcast_hits() {
        let component: Component = Arc::new(7u32);
        assert_eq!(*downcast::<u32>(component).unwrap(), 7);
    }

    #[test]
    fn test_downcast_reports_actual_type() {
        let component: Component = Arc::new(7u32);
        let err = downcast::<String>(component).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Incorrect component type"));
    }
}
