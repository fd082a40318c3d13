use std::sync::Arc;

use crate::{
    any::TypeInfo,
    arguments::Arguments,
    errors::ResolveErrorKind,
    reconciler::Reconciler,
    registration::Construct,
    table::{downcast, ComponentTable},
};

/// Locator-shaped facade over a component table, for hosts that consume a
/// service locator rather than the full container contract. Single-instance
/// lookups go through the reconciler and share its lazy-registration
/// behavior.
pub struct ServiceLocator {
    reconciler: Reconciler,
}

impl ServiceLocator {
    #[inline]
    #[must_use]
    pub fn new(table: Arc<dyn ComponentTable>) -> Self {
        Self {
            reconciler: Reconciler::new(table),
        }
    }

    /// # Errors
    /// Fails when the store cannot produce an instance.
    pub fn get_instance<T: Construct>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.reconciler.resolve::<T>()
    }

    /// # Errors
    /// Fails on an empty key or when the store cannot produce an instance.
    pub fn get_instance_named<T: Construct>(&self, key: &str) -> Result<Arc<T>, ResolveErrorKind> {
        self.reconciler.resolve_named::<T>(key)
    }

    /// Every instance registered for the service type, resolving table first,
    /// then its parents. An empty result is not an error.
    ///
    /// # Errors
    /// Fails when any matching entry cannot produce an instance.
    pub fn get_all_instances<T: Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>, ResolveErrorKind> {
        self.reconciler
            .table()
            .resolve_all_by_type(TypeInfo::of::<T>(), &Arguments::new())?
            .into_iter()
            .map(downcast::<T>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceLocator;
    use crate::{kernel::Kernel, reconciler::Reconciler};

    #[derive(Default)]
    struct Formatter;

    #[test]
    fn test_get_instance_falls_back_to_self_registration() {
        let locator = ServiceLocator::new(Kernel::new());
        locator.get_instance::<Formatter>().unwrap();
        locator.get_instance_named::<Formatter>("formatter").unwrap();
    }

    #[test]
    fn test_get_all_instances() {
        let kernel = Kernel::new();
        let reconciler = Reconciler::new(kernel.clone());
        reconciler.register_factory::<Formatter, _>(|_| Ok(Formatter)).unwrap();
        reconciler.register_factory::<Formatter, _>(|_| Ok(Formatter)).unwrap();

        let locator = ServiceLocator::new(kernel);
        assert_eq!(locator.get_all_instances::<Formatter>().unwrap().len(), 2);
        assert!(locator.get_all_instances::<String>().unwrap().is_empty());
    }
}
