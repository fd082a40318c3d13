use std::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    sync::Arc,
};

/// Type-erased component instance handed out by a table.
pub type Component = Arc<dyn Any + Send + Sync>;

/// Type identity of a service or implementation.
///
/// `name` is the fully qualified type path and doubles as the *full-name key*:
/// the string identity a registration falls back to when no explicit name is
/// supplied.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::TypeInfo;

    struct Marker;

    #[test]
    fn test_full_name_key_is_qualified() {
        let info = TypeInfo::of::<Marker>();
        assert!(info.name.ends_with("::Marker"));
        assert_eq!(info.short_name(), "Marker");
    }

    #[test]
    fn test_identity_ignores_name() {
        let a = TypeInfo::of::<Marker>();
        let b = TypeInfo {
            name: "renamed",
            id: a.id,
        };
        assert_eq!(a, b);
    }
}
