use std::{any::TypeId, collections::BTreeMap, sync::Arc};

use crate::any::Component;

/// Explicit override values supplied to a resolve call.
///
/// Overrides are keyed by the type they stand in for and are consulted by
/// factories before the table itself, so a caller can substitute a
/// constructor dependency for one resolution without touching the
/// registrations. The table passes them through verbatim; it never validates
/// them against what a factory actually asks for.
#[derive(Clone, Default)]
pub struct Arguments {
    map: BTreeMap<TypeId, Component>,
}

impl Arguments {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    #[inline]
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    #[inline]
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<Arc<T>> {
        self.map
            .insert(TypeId::of::<T>(), Arc::new(value))
            .and_then(|previous| previous.downcast().ok())
    }

    #[inline]
    pub fn insert_component(&mut self, type_id: TypeId, component: Component) -> Option<Component> {
        self.map.insert(type_id, component)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, type_id: &TypeId) -> Option<Component> {
        self.map.get(type_id).cloned()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Arguments;
    use std::any::TypeId;

    #[test]
    fn test_insert_replaces_by_type() {
        let mut args = Arguments::new();
        assert!(args.insert(1i32).is_none());
        let previous = args.insert(2i32).unwrap();
        assert_eq!(*previous, 1);
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_get_by_type_id() {
        let args = Arguments::new().with("override".to_string());
        let component = args.get(&TypeId::of::<String>()).unwrap();
        assert_eq!(*component.downcast::<String>().unwrap(), "override");
        assert!(args.get(&TypeId::of::<i32>()).is_none());
    }
}
